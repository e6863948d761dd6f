//! Shared test infrastructure for the HTTP and façade tests.
//!
//! Everything runs against a seeded [`MemoryStore`]; no database is needed.
//!
//! # Seed
//! - company 1: `Tech Solutions Inc.`, company 2: `DataCorp Analytics`
//! - `admin_user` (company 1, admin) and `data_analyst` (company 2)

#![allow(dead_code)]

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use bi_dashboard::accounts::{self, RegisterRequest};
use bi_dashboard::auth::rate_limit::RateLimiter;
use bi_dashboard::auth::token::TokenSigner;
use bi_dashboard::config::Branding;
use bi_dashboard::handlers;
use bi_dashboard::models::NewCompany;
use bi_dashboard::store::{AccountStore, MemoryStore};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin_user";
pub const ADMIN_PASS: &str = "admin1234";
pub const ANALYST_USER: &str = "data_analyst";
pub const ANALYST_PASS: &str = "analyst123";
pub const TOKEN_SECRET: &str = "test-token-secret";

// ============================================================================
// STORE SETUP
// ============================================================================

pub struct TestContext {
    pub store: MemoryStore,
    pub signer: TokenSigner,
    pub limiter: RateLimiter,
    pub branding: Branding,
}

pub fn register_request(
    username: &str,
    password: &str,
    email: &str,
    company_id: i64,
) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: password.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        phone: None,
        position: None,
        department: None,
        company_id,
        is_admin: false,
    }
}

/// Two companies and two users; see the module docs.
pub async fn setup() -> TestContext {
    let store = MemoryStore::new();
    for name in ["Tech Solutions Inc.", "DataCorp Analytics"] {
        accounts::create_company(
            &store,
            &NewCompany {
                name: name.to_string(),
                email: Some(format!("info@{}.com", name.split(' ').next().unwrap_or("x").to_lowercase())),
                ..Default::default()
            },
        )
        .await
        .expect("create company");
    }

    let mut admin = register_request(ADMIN_USER, ADMIN_PASS, "admin@techsolutions.com", 1);
    admin.first_name = "Juan".to_string();
    admin.last_name = "Pérez".to_string();
    admin.is_admin = true;
    accounts::create_user(&store, &admin).await.expect("create admin");

    let analyst = register_request(ANALYST_USER, ANALYST_PASS, "analyst@datacorp.com", 2);
    accounts::create_user(&store, &analyst).await.expect("create analyst");

    TestContext {
        store,
        signer: TokenSigner::new(TOKEN_SECRET),
        limiter: RateLimiter::new(),
        branding: Branding {
            name: "Tech Solutions Inc.".to_string(),
            name_user: "Juan".to_string(),
            rubro: "COMERCIAL".to_string(),
            logo: "logo.png".to_string(),
        },
    }
}

// ============================================================================
// APP SETUP
// ============================================================================

/// The full application over the context's store, with a fresh session key.
pub fn app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let store: Arc<dyn AccountStore> = Arc::new(ctx.store.clone());
    let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .build();

    App::new()
        .wrap(session_mw)
        .app_data(web::Data::from(store))
        .app_data(web::Data::new(ctx.signer.clone()))
        .app_data(web::Data::new(ctx.limiter.clone()))
        .app_data(web::Data::new(ctx.branding.clone()))
        .configure(handlers::configure)
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

/// Pull the hidden CSRF field out of a rendered form.
pub fn csrf_from_html(html: &str) -> Option<String> {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
