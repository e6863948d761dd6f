//! Stateless JSON API: registration, token login and company listing.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::accounts::{self, AccountError, RegisterRequest};
use crate::auth::middleware::ApiUser;
use crate::auth::rate_limit::RateLimiter;
use crate::auth::token::TokenSigner;
use crate::config::Branding;
use crate::errors::{AppError, message};
use crate::store::AccountStore;

use super::client_ip;

/// Raw `/register` body. Presence of the required keys is checked before
/// anything else so the caller gets one fixed message.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub company_id: Option<i64>,
    pub is_admin: Option<bool>,
}

impl RegisterBody {
    fn has_required(&self) -> bool {
        self.username.is_some()
            && self.password.is_some()
            && self.first_name.is_some()
            && self.last_name.is_some()
            && self.email.is_some()
    }

    fn into_request(self, default_company_id: i64) -> Option<RegisterRequest> {
        let (Some(username), Some(password), Some(first_name), Some(last_name), Some(email)) = (
            self.username,
            self.password,
            self.first_name,
            self.last_name,
            self.email,
        ) else {
            return None;
        };
        Some(RegisterRequest {
            username,
            password,
            first_name,
            last_name,
            email,
            phone: self.phone,
            position: self.position,
            department: self.department,
            company_id: self.company_id.unwrap_or(default_company_id),
            is_admin: self.is_admin.unwrap_or(false),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /register
pub async fn register(
    store: web::Data<dyn AccountStore>,
    branding: web::Data<Branding>,
    body: web::Json<RegisterBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    if !body.has_required() {
        return Ok(HttpResponse::BadRequest().json(message("Missing required fields")));
    }

    let company_id = match body.company_id {
        Some(id) => id,
        None => match accounts::default_company_id(store.get_ref(), &branding.name).await {
            Some(id) => id,
            None => {
                return Ok(HttpResponse::BadRequest()
                    .json(message("No company available for registration")));
            }
        },
    };
    let Some(req) = body.into_request(company_id) else {
        return Ok(HttpResponse::BadRequest().json(message("Missing required fields")));
    };

    match accounts::create_user(store.get_ref(), &req).await {
        Ok(_) => Ok(HttpResponse::Created().json(message("User created successfully"))),
        Err(e @ (AccountError::Invalid(_) | AccountError::Duplicate | AccountError::UnknownCompany(_))) => {
            log::info!("Registration of '{}' rejected: {e}", req.username);
            Ok(HttpResponse::BadRequest().json(message(e.to_string())))
        }
        Err(e) => {
            log::error!("Error creating user '{}': {e}", req.username);
            Ok(HttpResponse::BadRequest().json(message("Error creating user")))
        }
    }
}

/// POST /login
pub async fn login(
    req: HttpRequest,
    store: web::Data<dyn AccountStore>,
    signer: web::Data<TokenSigner>,
    limiter: web::Data<RateLimiter>,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse, AppError> {
    let LoginBody { username: Some(username), password: Some(password) } = body.into_inner() else {
        return Ok(HttpResponse::BadRequest().json(message("Missing username or password")));
    };

    // Rate-limit check BEFORE any database access
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        log::warn!("Login throttled for {ip}");
        return Ok(HttpResponse::TooManyRequests().json(message(
            "Too many failed login attempts. Please try again later.",
        )));
    }

    match accounts::authenticate_user(store.get_ref(), &signer, &username, &password).await {
        Some(payload) => {
            limiter.clear(ip);
            Ok(HttpResponse::Ok().json(payload))
        }
        None => {
            limiter.record_failure(ip);
            Ok(HttpResponse::Unauthorized().json(message("Invalid credentials")))
        }
    }
}

/// GET /companies (behind the bearer-token middleware)
pub async fn companies(
    store: web::Data<dyn AccountStore>,
    user: ApiUser,
) -> Result<HttpResponse, AppError> {
    let ApiUser(claims) = user;
    let companies = accounts::get_user_companies(store.get_ref(), claims.user_id).await;
    Ok(HttpResponse::Ok().json(companies))
}
