use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::errors::DomainError;

/// Failed confirmations tolerated before a code is locked.
pub const MAX_ATTEMPTS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Channel::Email),
            "phone" => Ok(Channel::Phone),
            other => Err(DomainError::InvalidInput(format!(
                "unknown verification channel '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel: Channel,
    pub target: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl VerificationCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn matches(&self, code: &str) -> bool {
        hash_code(code.trim()) == self.code_hash
    }
}

#[derive(Debug, Clone)]
pub struct NewVerificationCode {
    pub user_id: Uuid,
    pub channel: Channel,
    pub target: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// A channel target the user proved control of.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedChannel {
    pub user_id: Uuid,
    pub channel: Channel,
    pub target: String,
    pub verified_at: DateTime<Utc>,
}

/// Six decimal digits, leading zeros kept.
pub fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}
