use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{CodeSender, VerificationRepository};
use crate::domain::verification::{
    generate_code, hash_code, Channel, NewVerificationCode, VerifiedChannel, MAX_ATTEMPTS,
};

/// Issues and checks one-time codes for email and phone verification.
/// Codes live in the database with an expiry, so any instance can confirm a
/// code another instance issued.
pub struct VerificationService<R, N> {
    repo: R,
    sender: N,
    ttl: Duration,
}

impl<R: VerificationRepository, N: CodeSender> VerificationService<R, N> {
    pub fn new(repo: R, sender: N, ttl: Duration) -> Self {
        Self { repo, sender, ttl }
    }

    /// Stores a fresh code for `(user_id, channel)`, replacing any earlier
    /// one, and hands it to the sender. Returns when it expires.
    pub fn issue(
        &self,
        user_id: Uuid,
        channel: Channel,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, DomainError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(DomainError::InvalidInput("target is required".to_string()));
        }
        if target.chars().count() > 255 {
            return Err(DomainError::InvalidInput(
                "target must be at most 255 characters".to_string(),
            ));
        }
        if channel == Channel::Email && !target.contains('@') {
            return Err(DomainError::InvalidInput(
                "target is not a valid email address".to_string(),
            ));
        }

        let code = generate_code();
        let stored = self.repo.upsert(NewVerificationCode {
            user_id,
            channel,
            target: target.to_string(),
            code_hash: hash_code(&code),
            expires_at: now + self.ttl,
        })?;
        self.sender.send(channel, target, &code)?;
        Ok(stored.expires_at)
    }

    /// Checks `code` against the pending one. Every try, right or wrong,
    /// spends one of the code's attempts before the comparison, so parallel
    /// confirmations cannot exceed the limit.
    pub fn confirm(
        &self,
        user_id: Uuid,
        channel: Channel,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedChannel, DomainError> {
        let record = self
            .repo
            .find_pending(user_id, channel)?
            .ok_or(DomainError::NotFound("Verification code"))?;

        if record.attempts >= MAX_ATTEMPTS {
            return Err(DomainError::TooManyAttempts);
        }
        if record.is_expired(now) {
            return Err(DomainError::VerificationExpired);
        }
        let attempt = self
            .repo
            .claim_attempt(record.id, MAX_ATTEMPTS)?
            .ok_or(DomainError::TooManyAttempts)?;

        if !record.matches(code) {
            log::warn!(
                "Wrong {} verification code for user {} (attempt {})",
                channel,
                user_id,
                attempt
            );
            return Err(DomainError::VerificationMismatch);
        }

        if !self.repo.consume(&record, now)? {
            return Err(DomainError::NotFound("Verification code"));
        }
        log::info!("User {} verified {} {}", user_id, channel, record.target);
        Ok(VerifiedChannel {
            user_id,
            channel,
            target: record.target,
            verified_at: now,
        })
    }

    pub fn status(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerifiedChannel>, DomainError> {
        self.repo.verified(user_id, channel)
    }
}
