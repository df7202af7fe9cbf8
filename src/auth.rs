//! Bearer-token identity.
//!
//! Tokens are HS256 JWTs carrying typed claims. They are validated once, when
//! the [`AuthUser`] extractor runs; handlers only ever see the decoded user.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::roles::{has_any_role, Actor, Role};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub roles: Vec<Role>,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue(
        &self,
        user_id: Uuid,
        username: &str,
        roles: &[Role],
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            roles: roles.to_vec(),
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {}", e)))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))
    }
}

/// The caller of an authenticated endpoint.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    /// SuperAdmin passes every role check.
    pub fn require_any_role(&self, required: &[Role]) -> Result<(), AppError> {
        if self.roles.contains(&Role::SuperAdmin) || has_any_role(&self.roles, required) {
            Ok(())
        } else {
            log::warn!(
                "User {} with roles {:?} denied; requires one of {:?}",
                self.user_id,
                self.roles,
                required
            );
            Err(AppError::Forbidden)
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            roles: self.roles.clone(),
        }
    }

    /// Same rule as [`AuthUser::require_any_role`], without logging a denial.
    pub fn is_any_of(&self, roles: &[Role]) -> bool {
        self.roles.contains(&Role::SuperAdmin) || has_any_role(&self.roles, roles)
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed Authorization header".to_string()))?
        .trim();
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .unwrap_or(header);
    if token.is_empty() {
        return Err(AppError::Unauthorized("empty token".to_string()));
    }
    Ok(token)
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let keys = req
        .app_data::<web::Data<JwtKeys>>()
        .ok_or_else(|| AppError::Internal("JWT keys are not configured".to_string()))?;
    let claims = keys.decode(bearer_token(req)?)?;
    if claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized(
            "refresh tokens cannot be used for API access".to_string(),
        ));
    }
    Ok(AuthUser {
        user_id: claims.sub,
        username: claims.username,
        roles: claims.roles,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}
