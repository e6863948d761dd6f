use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A tenant. Owns users and the dashboards they see.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

/// Company data for creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
}

/// Public shape returned by `GET /companies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
}

impl From<&Company> for CompanySummary {
    fn from(c: &Company) -> Self {
        CompanySummary {
            id: c.id,
            name: c.name.clone(),
            description: c.description.clone(),
            email: c.email.clone(),
            website: c.website.clone(),
        }
    }
}

const SELECT_COMPANY: &str = "\
    SELECT id, name, description, email, phone, address, website, \
           created_at, updated_at, is_active \
    FROM companies";

/// Insert a company and return the stored row.
pub async fn create(pool: &PgPool, new: &NewCompany) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "INSERT INTO companies (name, description, email, phone, address, website) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, name, description, email, phone, address, website, \
                   created_at, updated_at, is_active",
    )
    .bind(new.name.trim())
    .bind(&new.description)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.address)
    .bind(&new.website)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!("{SELECT_COMPANY} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!("{SELECT_COMPANY} WHERE name = $1"))
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn first(pool: &PgPool) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(&format!("{SELECT_COMPANY} ORDER BY id LIMIT 1"))
        .fetch_optional(pool)
        .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM companies")
        .fetch_one(pool)
        .await
}

/// Companies a user is associated with. A user belongs to exactly one company,
/// so this yields zero or one rows.
pub async fn find_for_user(pool: &PgPool, user_id: i64) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT c.id, c.name, c.description, c.email, c.phone, c.address, c.website, \
                c.created_at, c.updated_at, c.is_active \
         FROM companies c \
         JOIN users u ON u.company_id = c.id \
         WHERE u.id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
