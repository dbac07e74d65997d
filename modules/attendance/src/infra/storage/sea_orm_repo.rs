//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction. Dedup relies on the unique index on
//! (fingerprint, date_key); a violation surfaces as `RepoError::Duplicate`.

use anyhow::Context;
use chrono::NaiveDate;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::contract::model::{Registration, RegistrationAttempt};
use crate::domain::repo::{RegistrationsRepository, RepoError};
use crate::infra::storage::entity::{attempt, registration};

/// SeaORM repository impl.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmRegistrationsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRegistrationsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait::async_trait]
impl<C> RegistrationsRepository for SeaOrmRegistrationsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert(&self, r: Registration) -> Result<(), RepoError> {
        let m = registration::ActiveModel {
            id: Set(r.id),
            municipality: Set(r.municipality),
            party_size: Set(r.party_size),
            fingerprint: Set(r.fingerprint),
            date_key: Set(r.date_key),
            created_at: Set(r.created_at),
        };
        match m.insert(&self.conn).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(RepoError::Duplicate),
            Err(e) => Err(anyhow::Error::new(e).context("insert registration failed").into()),
        }
    }

    async fn find_for_day(
        &self,
        fingerprint: &str,
        date_key: NaiveDate,
    ) -> Result<Option<Registration>, RepoError> {
        let found = registration::Entity::find()
            .filter(registration::Column::Fingerprint.eq(fingerprint))
            .filter(registration::Column::DateKey.eq(date_key))
            .one(&self.conn)
            .await
            .context("find_for_day failed")?;
        Ok(found.map(Into::into))
    }

    async fn record_attempt(&self, a: RegistrationAttempt) -> Result<(), RepoError> {
        let errors = serde_json::to_string(&a.errors).context("encode attempt errors")?;
        let m = attempt::ActiveModel {
            id: Set(a.id),
            municipality: Set(a.municipality),
            party_size: Set(a.party_size),
            fingerprint: Set(a.fingerprint),
            date_key: Set(a.date_key),
            created_at: Set(a.created_at),
            reason: Set(a.reason.as_str().to_string()),
            errors: Set(errors),
            duplicate_of: Set(a.duplicate_of),
            client_ip: Set(a.client_ip),
            user_agent: Set(a.user_agent),
        };
        m.insert(&self.conn)
            .await
            .context("record_attempt failed")?;
        Ok(())
    }

    async fn day_total(&self, date_key: NaiveDate) -> Result<i64, RepoError> {
        let total: Option<Option<i64>> = registration::Entity::find()
            .select_only()
            .column_as(Expr::col(registration::Column::PartySize).sum(), "total")
            .filter(registration::Column::DateKey.eq(date_key))
            .into_tuple()
            .one(&self.conn)
            .await
            .context("day_total failed")?;
        Ok(total.flatten().unwrap_or(0))
    }

    async fn list_registrations(&self) -> Result<Vec<Registration>, RepoError> {
        let rows = registration::Entity::find()
            .order_by_asc(registration::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_registrations failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_attempts(&self) -> Result<Vec<RegistrationAttempt>, RepoError> {
        let rows = attempt::Entity::find()
            .order_by_asc(attempt::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_attempts failed")?;
        let attempts = rows
            .into_iter()
            .map(RegistrationAttempt::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(attempts)
    }

    async fn delete_day(&self, date_key: NaiveDate) -> Result<u64, RepoError> {
        let txn = self.conn.begin().await.context("delete_day: begin failed")?;
        attempt::Entity::delete_many()
            .filter(attempt::Column::DateKey.eq(date_key))
            .exec(&txn)
            .await
            .context("delete_day: attempts failed")?;
        let res = registration::Entity::delete_many()
            .filter(registration::Column::DateKey.eq(date_key))
            .exec(&txn)
            .await
            .context("delete_day: registrations failed")?;
        txn.commit().await.context("delete_day: commit failed")?;
        Ok(res.rows_affected)
    }
}
