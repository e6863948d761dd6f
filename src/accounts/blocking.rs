//! Synchronous façade over the account operations.
//!
//! Each method opens a fresh store connection inside a fresh runtime (see
//! [`crate::bridge`]), runs one operation, closes the connection and returns.
//! Failures are logged and reported as `None`, `false` or an empty list.
//! Must not be called from inside an async runtime.

use std::future::Future;

use super::{LoginPayload, RegisterRequest};
use crate::auth::token::TokenSigner;
use crate::bridge::{self, BridgeError};
use crate::models::{Company, CompanySummary, NewCompany, UserAccount};
use crate::store::{Connect, SharedStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum BlockingError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct BlockingAccounts<'a> {
    connector: &'a dyn Connect,
    signer: TokenSigner,
}

impl<'a> BlockingAccounts<'a> {
    pub fn new(connector: &'a dyn Connect, signer: TokenSigner) -> Self {
        Self { connector, signer }
    }

    fn with_store<T, F, Fut>(&self, op: F) -> Result<T, BlockingError>
    where
        F: FnOnce(SharedStore) -> Fut,
        Fut: Future<Output = T>,
    {
        bridge::run_blocking(async {
            let store = self.connector.connect().await?;
            let output = op(store.clone()).await;
            store.close().await;
            Ok::<T, BlockingError>(output)
        })?
    }

    pub fn load_user(&self, user_id: i64) -> Option<UserAccount> {
        self.with_store(|store| async move { super::load_user(store.as_ref(), user_id).await })
            .unwrap_or_else(|e| {
                log::error!("Error loading user {user_id}: {e}");
                None
            })
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<UserAccount> {
        self.with_store(|store| async move {
            super::get_user_by_username(store.as_ref(), username).await
        })
        .unwrap_or_else(|e| {
            log::error!("Error getting user by username: {e}");
            None
        })
    }

    pub fn create_company(&self, new: &NewCompany) -> Option<Company> {
        let result = self.with_store(|store| async move {
            super::create_company(store.as_ref(), new).await
        });
        match result {
            Ok(Ok(company)) => Some(company),
            Ok(Err(e)) => {
                log::warn!("Error creating company '{}': {e}", new.name);
                None
            }
            Err(e) => {
                log::error!("Error in create_company: {e}");
                None
            }
        }
    }

    pub fn find_company_by_name(&self, name: &str) -> Option<Company> {
        match self.with_store(|store| async move { store.find_company_by_name(name).await }) {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                log::error!("Error finding company '{name}': {e}");
                None
            }
            Err(e) => {
                log::error!("Error in find_company_by_name: {e}");
                None
            }
        }
    }

    /// True when the user and its profile were stored.
    pub fn create_user(&self, req: &RegisterRequest) -> bool {
        let result = self.with_store(|store| async move {
            super::create_user(store.as_ref(), req).await
        });
        match result {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                log::warn!("Error creating user '{}': {e}", req.username);
                false
            }
            Err(e) => {
                log::error!("Error in create_user: {e}");
                false
            }
        }
    }

    pub fn authenticate_user(&self, username: &str, password: &str) -> Option<LoginPayload> {
        let signer = &self.signer;
        self.with_store(|store| async move {
            super::authenticate_user(store.as_ref(), signer, username, password).await
        })
        .unwrap_or_else(|e| {
            log::error!("Error in authenticate_user: {e}");
            None
        })
    }

    pub fn get_user_companies(&self, user_id: i64) -> Vec<CompanySummary> {
        self.with_store(|store| async move {
            super::get_user_companies(store.as_ref(), user_id).await
        })
        .unwrap_or_else(|e| {
            log::error!("Error getting user companies: {e}");
            vec![]
        })
    }
}
