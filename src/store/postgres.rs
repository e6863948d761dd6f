use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{AccountStore, Connect, SharedStore, StoreError};
use crate::config::DatabaseSettings;
use crate::models::{self, Company, NewCompany, NewProfile, NewUser, UserAccount};

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations into domain errors; everything else stays a DB error.
fn classify(e: sqlx::Error, company_id: i64) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let constraint = db.constraint().unwrap_or("unique").to_string();
            return StoreError::Conflict(constraint);
        }
        if db.is_foreign_key_violation() {
            return StoreError::UnknownCompany(company_id);
        }
    }
    StoreError::Db(e)
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_company(&self, new: &NewCompany) -> Result<Company, StoreError> {
        models::company::create(&self.pool, new)
            .await
            .map_err(|e| classify(e, 0))
    }

    async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, StoreError> {
        Ok(models::company::find_by_name(&self.pool, name).await?)
    }

    async fn company_count(&self) -> Result<i64, StoreError> {
        Ok(models::company::count(&self.pool).await?)
    }

    async fn first_company(&self) -> Result<Option<Company>, StoreError> {
        Ok(models::company::first(&self.pool).await?)
    }

    async fn create_user_with_profile(
        &self,
        new: &NewUser,
        profile: &NewProfile,
    ) -> Result<UserAccount, StoreError> {
        let user_id = models::user::create_with_profile(&self.pool, new, profile)
            .await
            .map_err(|e| classify(e, new.company_id))?;
        self.find_account_by_id(user_id)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn find_account_by_id(&self, user_id: i64) -> Result<Option<UserAccount>, StoreError> {
        match models::user::find_by_id(&self.pool, user_id).await? {
            Some(u) => Ok(Some(models::user::load_account(&self.pool, u).await?)),
            None => Ok(None),
        }
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        match models::user::find_by_username(&self.pool, username).await? {
            Some(u) => Ok(Some(models::user::load_account(&self.pool, u).await?)),
            None => Ok(None),
        }
    }

    async fn record_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(models::user::update_last_login(&self.pool, user_id, at).await?)
    }

    async fn set_user_active(&self, user_id: i64, active: bool) -> Result<(), StoreError> {
        Ok(models::user::set_active(&self.pool, user_id, active).await?)
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        Ok(models::user::delete(&self.pool, user_id).await?)
    }

    async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>, StoreError> {
        Ok(models::company::find_for_user(&self.pool, user_id).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Each connect opens a dedicated single-connection pool.
#[async_trait]
impl Connect for DatabaseSettings {
    async fn connect(&self) -> Result<SharedStore, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(self.connect_options())
            .await?;
        Ok(Arc::new(PgStore::new(pool)))
    }
}
