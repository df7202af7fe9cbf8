use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::VerificationRepository;
use crate::domain::verification::{Channel, NewVerificationCode, VerificationCode, VerifiedChannel};
use crate::schema::{user_verifications, verification_codes};

use super::models::{NewVerificationCodeRow, UserVerificationRow, VerificationCodeRow};

#[derive(Clone)]
pub struct DieselVerificationRepository {
    pool: DbPool,
}

impl DieselVerificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl VerificationRepository for DieselVerificationRepository {
    fn upsert(&self, code: NewVerificationCode) -> Result<VerificationCode, DomainError> {
        let mut conn = self.pool.get()?;
        // A fresh code resets the attempt counter and any earlier consumption.
        let row = diesel::insert_into(verification_codes::table)
            .values(&NewVerificationCodeRow {
                id: Uuid::new_v4(),
                user_id: code.user_id,
                channel: code.channel.as_str().to_string(),
                target: code.target,
                code_hash: code.code_hash,
                attempts: 0,
                expires_at: code.expires_at,
            })
            .on_conflict((verification_codes::user_id, verification_codes::channel))
            .do_update()
            .set((
                verification_codes::id.eq(excluded(verification_codes::id)),
                verification_codes::target.eq(excluded(verification_codes::target)),
                verification_codes::code_hash.eq(excluded(verification_codes::code_hash)),
                verification_codes::attempts.eq(0),
                verification_codes::expires_at.eq(excluded(verification_codes::expires_at)),
                verification_codes::consumed_at.eq(None::<DateTime<Utc>>),
                verification_codes::created_at.eq(Utc::now()),
            ))
            .returning(VerificationCodeRow::as_returning())
            .get_result(&mut conn)?;
        row.try_into()
    }

    fn find_pending(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let mut conn = self.pool.get()?;
        verification_codes::table
            .filter(verification_codes::user_id.eq(user_id))
            .filter(verification_codes::channel.eq(channel.as_str()))
            .filter(verification_codes::consumed_at.is_null())
            .select(VerificationCodeRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(VerificationCode::try_from)
            .transpose()
    }

    fn claim_attempt(&self, id: Uuid, max_attempts: i32) -> Result<Option<i32>, DomainError> {
        let mut conn = self.pool.get()?;
        // The guard lives in the UPDATE so concurrent tries serialise on the row.
        diesel::update(
            verification_codes::table
                .find(id)
                .filter(verification_codes::attempts.lt(max_attempts)),
        )
        .set(verification_codes::attempts.eq(verification_codes::attempts + 1))
        .returning(verification_codes::attempts)
        .get_result(&mut conn)
        .optional()
        .map_err(DomainError::from)
    }

    fn consume(&self, code: &VerificationCode, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let consumed = diesel::update(
                verification_codes::table
                    .find(code.id)
                    .filter(verification_codes::consumed_at.is_null()),
            )
            .set(verification_codes::consumed_at.eq(Some(at)))
            .execute(conn)?;
            if consumed == 0 {
                return Ok(false);
            }

            diesel::insert_into(user_verifications::table)
                .values(&UserVerificationRow {
                    user_id: code.user_id,
                    channel: code.channel.as_str().to_string(),
                    target: code.target.clone(),
                    verified_at: at,
                })
                .on_conflict((user_verifications::user_id, user_verifications::channel))
                .do_update()
                .set((
                    user_verifications::target.eq(excluded(user_verifications::target)),
                    user_verifications::verified_at.eq(excluded(user_verifications::verified_at)),
                ))
                .execute(conn)?;
            Ok(true)
        })
    }

    fn verified(
        &self,
        user_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerifiedChannel>, DomainError> {
        let mut conn = self.pool.get()?;
        user_verifications::table
            .find((user_id, channel.as_str()))
            .select(UserVerificationRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(VerifiedChannel::try_from)
            .transpose()
    }
}
