use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{AccountStore, Connect, SharedStore, StoreError};
use crate::models::{Company, NewCompany, NewProfile, NewUser, User, UserAccount, UserProfile};

/// In-process store with the same constraints as the Postgres schema:
/// unique company names, unique usernames and emails, and a company
/// foreign key on users. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    companies: BTreeMap<i64, Company>,
    users: BTreeMap<i64, User>,
    profiles: BTreeMap<i64, UserProfile>, // keyed by user_id
    next_company_id: i64,
    next_user_id: i64,
    next_profile_id: i64,
}

impl Inner {
    fn account(&self, user: &User) -> UserAccount {
        UserAccount {
            user: user.clone(),
            profile: self.profiles.get(&user.id).cloned(),
            company: self.companies.get(&user.company_id).cloned(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_company(&self, new: &NewCompany) -> Result<Company, StoreError> {
        let mut inner = self.lock();
        let name = new.name.trim().to_string();
        if inner.companies.values().any(|c| c.name == name) {
            return Err(StoreError::Conflict("companies_name_key".to_string()));
        }
        inner.next_company_id += 1;
        let now = Utc::now();
        let company = Company {
            id: inner.next_company_id,
            name,
            description: new.description.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            address: new.address.clone(),
            website: new.website.clone(),
            created_at: now,
            updated_at: now,
            is_active: true,
        };
        inner.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_company_by_name(&self, name: &str) -> Result<Option<Company>, StoreError> {
        Ok(self.lock().companies.values().find(|c| c.name == name).cloned())
    }

    async fn company_count(&self) -> Result<i64, StoreError> {
        Ok(self.lock().companies.len() as i64)
    }

    async fn first_company(&self) -> Result<Option<Company>, StoreError> {
        Ok(self.lock().companies.values().next().cloned())
    }

    async fn create_user_with_profile(
        &self,
        new: &NewUser,
        profile: &NewProfile,
    ) -> Result<UserAccount, StoreError> {
        let mut inner = self.lock();
        if !inner.companies.contains_key(&new.company_id) {
            return Err(StoreError::UnknownCompany(new.company_id));
        }
        if inner.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict("users_username_key".to_string()));
        }
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        inner.next_user_id += 1;
        inner.next_profile_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            is_active: true,
            is_admin: new.is_admin,
            created_at: now,
            updated_at: now,
            last_login: None,
            company_id: new.company_id,
        };
        let stored_profile = UserProfile {
            id: inner.next_profile_id,
            user_id: user.id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            avatar_url: None,
            bio: None,
            position: profile.position.clone(),
            department: profile.department.clone(),
            birth_date: None,
            hire_date: None,
            created_at: now,
            updated_at: now,
        };
        inner.profiles.insert(user.id, stored_profile);
        inner.users.insert(user.id, user.clone());
        Ok(inner.account(&user))
    }

    async fn find_account_by_id(&self, user_id: i64) -> Result<Option<UserAccount>, StoreError> {
        let inner = self.lock();
        Ok(inner.users.get(&user_id).map(|u| inner.account(u)))
    }

    async fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .map(|u| inner.account(u)))
    }

    async fn record_login(&self, user_id: i64, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let user = inner.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }

    async fn set_user_active(&self, user_id: i64, active: bool) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let user = inner.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        user.is_active = active;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.users.remove(&user_id);
        inner.profiles.remove(&user_id);
        Ok(())
    }

    async fn companies_for_user(&self, user_id: i64) -> Result<Vec<Company>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .users
            .get(&user_id)
            .and_then(|u| inner.companies.get(&u.company_id))
            .cloned()
            .into_iter()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl Connect for MemoryStore {
    async fn connect(&self) -> Result<SharedStore, StoreError> {
        Ok(Arc::new(self.clone()))
    }
}
