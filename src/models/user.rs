use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::company::Company;
use super::profile::{NewProfile, UserProfile};

/// Internal user row — includes the password hash, never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub company_id: i64,
}

/// A user loaded together with its profile and company.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user: User,
    pub profile: Option<UserProfile>,
    pub company: Option<Company>,
}

impl UserAccount {
    /// Profile name, or the username when no profile exists.
    pub fn full_name(&self) -> String {
        match &self.profile {
            Some(p) => p.full_name(),
            None => self.user.username.clone(),
        }
    }
}

/// Safe view of a user for templates and JSON.
#[derive(Debug, Clone, Serialize)]
pub struct UserDisplay {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub company_id: i64,
    pub is_admin: bool,
}

impl From<&UserAccount> for UserDisplay {
    fn from(a: &UserAccount) -> Self {
        UserDisplay {
            id: a.user.id,
            username: a.user.username.clone(),
            email: a.user.email.clone(),
            full_name: a.full_name(),
            position: a.profile.as_ref().and_then(|p| p.position.clone()),
            department: a.profile.as_ref().and_then(|p| p.department.clone()),
            company_id: a.user.company_id,
            is_admin: a.user.is_admin,
        }
    }
}

/// New user data for creation. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub company_id: i64,
    pub is_admin: bool,
}

const SELECT_USER: &str = "\
    SELECT id, username, email, password_hash, is_active, is_admin, \
           created_at, updated_at, last_login, company_id \
    FROM users";

/// Insert a user and its profile in one transaction. Returns the new user id.
pub async fn create_with_profile(
    pool: &PgPool,
    new: &NewUser,
    profile: &NewProfile,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, company_id, is_admin) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(&new.username)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(new.company_id)
    .bind(new.is_admin)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO user_profiles (user_id, first_name, last_name, phone, position, department) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(&profile.phone)
    .bind(&profile.position)
    .bind(&profile.department)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(user_id)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find user by username for authentication. Returns internal User with password hash.
pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Attach profile and company to a user row.
pub async fn load_account(pool: &PgPool, user: User) -> Result<UserAccount, sqlx::Error> {
    let profile = super::profile::find_by_user_id(pool, user.id).await?;
    let company = super::company::find_by_id(pool, user.company_id).await?;
    Ok(UserAccount { user, profile, company })
}

/// Stamp a successful login.
pub async fn update_last_login(
    pool: &PgPool,
    id: i64,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
        .bind(at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_active(pool: &PgPool, id: i64, active: bool) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET is_active = $1, updated_at = NOW() WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a user (the profile cascades via FK).
pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
