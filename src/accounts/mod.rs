//! Account operations shared by the HTTP handlers and the blocking façade.
//!
//! Lookups swallow store errors: they are logged and reported as "no user",
//! "not authenticated" or "no companies".

pub mod blocking;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::auth::token::TokenSigner;
use crate::auth::validate;
use crate::models::{
    Company, CompanySummary, NewCompany, NewProfile, NewUser, UserAccount,
};
use crate::store::{AccountStore, StoreError};

/// Everything needed to create a user with its profile.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub company_id: i64,
    pub is_admin: bool,
}

/// Successful API login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    pub user_id: i64,
    pub company_id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub full_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Invalid(String),
    #[error("Username or email already exists")]
    Duplicate,
    #[error("Company {0} does not exist")]
    UnknownCompany(i64),
    #[error("Password hash error: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => AccountError::Duplicate,
            StoreError::UnknownCompany(id) => AccountError::UnknownCompany(id),
            other => AccountError::Store(other),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn validate_request(req: &RegisterRequest) -> Vec<String> {
    let mut errors = vec![];
    errors.extend(validate::validate_username(&req.username));
    errors.extend(validate::validate_email(&req.email));
    errors.extend(validate::validate_password(&req.password));
    errors.extend(validate::validate_required(&req.first_name, "First name", 50));
    errors.extend(validate::validate_required(&req.last_name, "Last name", 50));
    errors.extend(validate::validate_optional(req.phone.as_deref().unwrap_or(""), "Phone", 20));
    errors.extend(validate::validate_optional(req.position.as_deref().unwrap_or(""), "Position", 100));
    errors.extend(validate::validate_optional(req.department.as_deref().unwrap_or(""), "Department", 100));
    errors
}

/// Validate, hash the password and persist the user with its profile.
pub async fn create_user(
    store: &dyn AccountStore,
    req: &RegisterRequest,
) -> Result<UserAccount, AccountError> {
    let errors = validate_request(req);
    if !errors.is_empty() {
        return Err(AccountError::Invalid(errors.join("; ")));
    }

    let password_hash = password::hash_password(&req.password).map_err(AccountError::Hash)?;

    let new = NewUser {
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        password_hash,
        company_id: req.company_id,
        is_admin: req.is_admin,
    };
    let profile = NewProfile {
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: non_empty(&req.phone),
        position: non_empty(&req.position),
        department: non_empty(&req.department),
    };

    let account = store.create_user_with_profile(&new, &profile).await?;
    log::info!(
        "Created user '{}' (id {}) in company {}",
        account.user.username,
        account.user.id,
        account.user.company_id
    );
    Ok(account)
}

pub async fn create_company(
    store: &dyn AccountStore,
    new: &NewCompany,
) -> Result<Company, AccountError> {
    if let Some(e) = validate::validate_required(&new.name, "Company name", 200) {
        return Err(AccountError::Invalid(e));
    }
    let company = store.create_company(new).await?;
    log::info!("Created company '{}' (id {})", company.name, company.id);
    Ok(company)
}

/// The user loader: account by id, or None on any failure.
pub async fn load_user(store: &dyn AccountStore, user_id: i64) -> Option<UserAccount> {
    match store.find_account_by_id(user_id).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("Error loading user {user_id}: {e}");
            None
        }
    }
}

pub async fn get_user_by_username(store: &dyn AccountStore, username: &str) -> Option<UserAccount> {
    match store.find_account_by_username(username).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("Error getting user by username: {e}");
            None
        }
    }
}

/// Check credentials for an active user and stamp `last_login`.
pub async fn verify_credentials(
    store: &dyn AccountStore,
    username: &str,
    password: &str,
) -> Option<UserAccount> {
    let mut account = get_user_by_username(store, username).await?;

    if !password::check_password(password, &account.user.password_hash) {
        log::info!("Failed login for '{username}': bad password");
        return None;
    }
    if !account.user.is_active {
        log::info!("Failed login for '{username}': account inactive");
        return None;
    }

    let now = Utc::now();
    if let Err(e) = store.record_login(account.user.id, now).await {
        log::error!("Error recording login for '{username}': {e}");
        return None;
    }
    account.user.last_login = Some(now);
    Some(account)
}

/// Verify credentials and issue a bearer token.
pub async fn authenticate_user(
    store: &dyn AccountStore,
    signer: &TokenSigner,
    username: &str,
    password: &str,
) -> Option<LoginPayload> {
    let account = verify_credentials(store, username, password).await?;
    let user = &account.user;
    Some(LoginPayload {
        token: signer.create_token(user.id, &user.username, user.company_id),
        user_id: user.id,
        company_id: user.company_id,
        username: user.username.clone(),
        email: user.email.clone(),
        is_admin: user.is_admin,
        full_name: account.full_name(),
    })
}

pub async fn get_user_companies(store: &dyn AccountStore, user_id: i64) -> Vec<CompanySummary> {
    match store.companies_for_user(user_id).await {
        Ok(companies) => companies.iter().map(CompanySummary::from).collect(),
        Err(e) => {
            log::error!("Error getting companies for user {user_id}: {e}");
            vec![]
        }
    }
}

/// Company for registrations that omit `company_id`: the one named by branding,
/// else the oldest company. None when there is none or the store fails.
pub async fn default_company_id(store: &dyn AccountStore, preferred_name: &str) -> Option<i64> {
    let found = match store.find_company_by_name(preferred_name).await {
        Ok(Some(company)) => Ok(Some(company)),
        Ok(None) => store.first_company().await,
        Err(e) => Err(e),
    };
    match found {
        Ok(company) => company.map(|c| c.id),
        Err(e) => {
            log::error!("Error resolving default company: {e}");
            None
        }
    }
}

/// Create the default tenant from branding when the database has no companies.
pub async fn ensure_default_company(
    store: &dyn AccountStore,
    name: &str,
) -> Result<Option<Company>, AccountError> {
    if store.company_count().await? > 0 {
        log::info!("Companies already present, skipping default company seed");
        return Ok(None);
    }
    let company = create_company(
        store,
        &NewCompany { name: name.to_string(), ..Default::default() },
    )
    .await?;
    Ok(Some(company))
}
