use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles carried in access tokens. The set is fixed; tokens naming anything
/// else fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    SuperAdmin,
    Admin,
    Sales,
    Visitor,
}

/// Roles allowed to run administrative order and catalog operations.
pub const STAFF: &[Role] = &[Role::Admin, Role::SuperAdmin];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::Admin => "Admin",
            Role::Sales => "Sales",
            Role::Visitor => "Visitor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True iff at least one required role is held. An empty requirement is
/// never satisfied.
pub fn has_any_role(user_roles: &[Role], required_roles: &[Role]) -> bool {
    required_roles
        .iter()
        .any(|required| user_roles.contains(required))
}

/// Who is asking, as far as the services need to know.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl Actor {
    /// SuperAdmin counts as staff even without the Admin role.
    pub fn is_staff(&self) -> bool {
        has_any_role(&self.roles, STAFF)
    }
}
