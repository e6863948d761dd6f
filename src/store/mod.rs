//! Persistence seam for companies, users and profiles.
//!
//! Handlers and the blocking façade talk to an [`AccountStore`] instead of a
//! pool directly. [`PgStore`] is the production implementation on top of the
//! sqlx query functions in `crate::models`; [`MemoryStore`] keeps everything in
//! process and backs the test suite and database-less demos.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Company, NewCompany, NewProfile, NewUser, UserAccount};

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn AccountStore>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value violates a unique constraint: {0}")]
    Conflict(String),
    #[error("company {0} does not exist")]
    UnknownCompany(i64),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a company and return the refreshed row.
    async fn create_company(&self, new: &NewCompany) -> Result<Company, StoreError>;

    async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, StoreError>;

    async fn company_count(&self) -> Result<i64, StoreError>;

    /// The company with the lowest id.
    async fn first_company(&self) -> Result<Option<Company>, StoreError>;

    /// Insert a user and its profile atomically and return the refreshed account.
    async fn create_user_with_profile(
        &self,
        new: &NewUser,
        profile: &NewProfile,
    ) -> Result<UserAccount, StoreError>;

    async fn find_account_by_id(&self, user_id: i64) -> Result<Option<UserAccount>, StoreError>;

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError>;

    async fn record_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn set_user_active(&self, user_id: i64, active: bool) -> Result<(), StoreError>;

    /// Remove a user together with its profile.
    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError>;

    async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>, StoreError>;

    /// Cheap liveness probe for `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release connections. Only meaningful for stores opened per call.
    async fn close(&self) {}
}

/// Opens a store. The blocking façade calls this once per operation.
#[async_trait]
pub trait Connect: Send + Sync {
    async fn connect(&self) -> Result<SharedStore, StoreError>;
}
