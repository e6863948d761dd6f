//! JSON API tests: /register, /login, /companies and /health.

mod common;

use actix_web::{http::StatusCode, test};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};

use bi_dashboard::accounts;
use bi_dashboard::models::{Company, CompanySummary, NewCompany, NewProfile, NewUser, UserAccount};
use bi_dashboard::store::{AccountStore, StoreError};
use common::*;

fn register_body(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "password": "password123",
        "first_name": "Ana",
        "last_name": "Torres",
        "email": email,
    })
}

fn login_body(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

// ---------------------------------------------------------------------------
// /register
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_register_creates_user() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(register_body("ana_torres", "ana@techsolutions.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User created successfully");

    let account = accounts::get_user_by_username(&ctx.store, "ana_torres")
        .await
        .expect("user stored");
    assert_eq!(account.user.company_id, 1);
    assert!(!account.user.is_admin);
    assert_eq!(account.full_name(), "Ana Torres");
}

#[actix_web::test]
async fn test_register_duplicate_username_and_email() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    for body in [
        register_body(ADMIN_USER, "other@techsolutions.com"),
        register_body("someone_else", "admin@techsolutions.com"),
    ] {
        let req = test::TestRequest::post().uri("/register").set_json(body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Username or email already exists");
    }
}

#[actix_web::test]
async fn test_register_missing_fields() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "x_user", "password": "password123" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Missing required fields");
}

#[actix_web::test]
async fn test_register_accepts_short_password() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let mut body = register_body("developer", "dev@techsolutions.com");
    body["password"] = json!("dev789");
    let req = test::TestRequest::post().uri("/register").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(login_body("developer", "dev789"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_register_rejects_empty_password() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let mut body = register_body("no_pw", "nopw@techsolutions.com");
    body["password"] = json!("");
    let req = test::TestRequest::post().uri("/register").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Password is required");
}

#[actix_web::test]
async fn test_register_unknown_company() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let mut body = register_body("orphan", "orphan@nowhere.com");
    body["company_id"] = json!(42);
    let req = test::TestRequest::post().uri("/register").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_register_default_company_survives_id_gaps() {
    let mut ctx = setup().await;
    ctx.store = bi_dashboard::store::MemoryStore::new();
    let mut ids = vec![];
    for name in ["Legacy Holdings", "Tech Solutions Inc."] {
        let company = accounts::create_company(
            &ctx.store,
            &NewCompany { name: name.to_string(), ..Default::default() },
        )
        .await
        .expect("create company");
        ids.push(company.id);
    }
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(register_body("ana_torres", "ana@techsolutions.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let account = accounts::get_user_by_username(&ctx.store, "ana_torres")
        .await
        .expect("user stored");
    assert_eq!(account.user.company_id, ids[1]);
}

#[actix_web::test]
async fn test_register_without_any_company() {
    let mut ctx = setup().await;
    ctx.store = bi_dashboard::store::MemoryStore::new();
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(register_body("ana_torres", "ana@techsolutions.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "No company available for registration");
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["message"].is_string());
}

// ---------------------------------------------------------------------------
// /login
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_login_returns_token_and_updates_last_login() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(login_body(ADMIN_USER, ADMIN_PASS))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["username"], ADMIN_USER);
    assert_eq!(body["company_id"], 1);
    assert_eq!(body["is_admin"], true);
    assert_eq!(body["email"], "admin@techsolutions.com");
    assert_eq!(body["full_name"], "Juan Pérez");

    let token = body["token"].as_str().expect("token string");
    let claims = ctx.signer.verify_token(token).expect("token verifies");
    assert_eq!(claims.username, ADMIN_USER);
    assert_eq!(Some(claims.user_id), body["user_id"].as_i64());

    let account = accounts::get_user_by_username(&ctx.store, ADMIN_USER).await.unwrap();
    assert!(account.user.last_login.is_some());
}

#[actix_web::test]
async fn test_login_wrong_password() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(login_body(ADMIN_USER, "wrong-password"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body.get("token").is_none());

    let account = accounts::get_user_by_username(&ctx.store, ADMIN_USER).await.unwrap();
    assert!(account.user.last_login.is_none());
}

#[actix_web::test]
async fn test_login_unknown_user() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(login_body("ghost", "password123"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_missing_password() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": ADMIN_USER }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Missing username or password");
}

#[actix_web::test]
async fn test_inactive_user_cannot_login() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let admin = accounts::get_user_by_username(&ctx.store, ADMIN_USER).await.unwrap();
    ctx.store.set_user_active(admin.user.id, false).await.unwrap();

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(login_body(ADMIN_USER, ADMIN_PASS))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_is_throttled_after_repeated_failures() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    for _ in 0..5 {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(login_body(ADMIN_USER, "nope-nope"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    // Even correct credentials are refused while blocked
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(login_body(ADMIN_USER, ADMIN_PASS))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// /companies
// ---------------------------------------------------------------------------

async fn companies_with(
    ctx: &TestContext,
    authorization: Option<String>,
) -> (StatusCode, Value) {
    let app = test::init_service(app(ctx)).await;
    let mut req = test::TestRequest::get().uri("/companies");
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value));
    }
    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    (status, test::read_body_json(resp).await)
}

#[actix_web::test]
async fn test_companies_without_token() {
    let ctx = setup().await;
    let (status, body) = companies_with(&ctx, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is missing");
}

#[actix_web::test]
async fn test_companies_with_tampered_token() {
    let ctx = setup().await;
    let admin = accounts::get_user_by_username(&ctx.store, ADMIN_USER).await.unwrap();
    let token = ctx.signer.create_token(admin.user.id, ADMIN_USER, 2);
    // Claim another company while keeping the original signature
    let forged = token.replacen(":2:", ":1:", 1);
    assert_ne!(forged, token);

    let (status, body) = companies_with(&ctx, Some(format!("Bearer {forged}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[actix_web::test]
async fn test_companies_with_expired_token() {
    let ctx = setup().await;
    let admin = accounts::get_user_by_username(&ctx.store, ADMIN_USER).await.unwrap();
    let issued = Utc::now() - Duration::hours(2);
    let token = ctx.signer.create_token_at(admin.user.id, ADMIN_USER, 1, issued);

    let (status, body) = companies_with(&ctx, Some(format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[actix_web::test]
async fn test_companies_with_token_from_other_secret() {
    let ctx = setup().await;
    let other = bi_dashboard::auth::token::TokenSigner::new("some-other-secret");
    let token = other.create_token(1, ADMIN_USER, 1);

    let (status, _) = companies_with(&ctx, Some(format!("Bearer {token}"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_companies_lists_exactly_the_users_companies() {
    let ctx = setup().await;

    for (username, password, expected) in [
        (ADMIN_USER, ADMIN_PASS, "Tech Solutions Inc."),
        (ANALYST_USER, ANALYST_PASS, "DataCorp Analytics"),
    ] {
        let payload = accounts::authenticate_user(&ctx.store, &ctx.signer, username, password)
            .await
            .expect("login");
        let (status, body) = companies_with(&ctx, Some(format!("Bearer {}", payload.token))).await;
        assert_eq!(status, StatusCode::OK);

        let companies: Vec<CompanySummary> = serde_json::from_value(body).unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, expected);
        assert_eq!(companies[0].id, payload.company_id);
    }
}

// ---------------------------------------------------------------------------
// /health and static files
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_health_reports_running_services() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["services"]["dashboard"], "running");
    assert_eq!(body["services"]["database"], "connected");
    assert!(body["timestamp"].is_string());
}

/// A store whose database is unreachable.
struct UnreachableStore;

fn down() -> StoreError {
    StoreError::Db(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl AccountStore for UnreachableStore {
    async fn create_company(&self, _: &NewCompany) -> Result<Company, StoreError> {
        Err(down())
    }
    async fn find_company_by_name(&self, _: &str) -> Result<Option<Company>, StoreError> {
        Err(down())
    }
    async fn company_count(&self) -> Result<i64, StoreError> {
        Err(down())
    }
    async fn first_company(&self) -> Result<Option<Company>, StoreError> {
        Err(down())
    }
    async fn create_user_with_profile(
        &self,
        _: &NewUser,
        _: &NewProfile,
    ) -> Result<UserAccount, StoreError> {
        Err(down())
    }
    async fn find_account_by_id(&self, _: i64) -> Result<Option<UserAccount>, StoreError> {
        Err(down())
    }
    async fn find_account_by_username(&self, _: &str) -> Result<Option<UserAccount>, StoreError> {
        Err(down())
    }
    async fn record_login(&self, _: i64, _: DateTime<Utc>) -> Result<(), StoreError> {
        Err(down())
    }
    async fn set_user_active(&self, _: i64, _: bool) -> Result<(), StoreError> {
        Err(down())
    }
    async fn delete_user(&self, _: i64) -> Result<(), StoreError> {
        Err(down())
    }
    async fn companies_for_user(&self, _: i64) -> Result<Vec<Company>, StoreError> {
        Err(down())
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

#[actix_web::test]
async fn test_health_unhealthy_when_database_is_down() {
    use actix_web::{App, web};
    use std::sync::Arc;

    let store: Arc<dyn AccountStore> = Arc::new(UnreachableStore);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store))
            .route("/health", web::get().to(bi_dashboard::handlers::health::health)),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "unhealthy");
    assert!(body["error"].as_str().unwrap().contains("database"));
}

#[actix_web::test]
async fn test_register_store_failure_is_bad_request() {
    use actix_web::{App, web};
    use std::sync::Arc;

    let ctx = setup().await;
    let store: Arc<dyn AccountStore> = Arc::new(UnreachableStore);
    let app = test::init_service(
        App::new()
            .app_data(web::Data::from(store))
            .app_data(web::Data::new(ctx.branding.clone()))
            .route("/register", web::post().to(bi_dashboard::handlers::api::register)),
    )
    .await;

    let mut body = register_body("ana_torres", "ana@techsolutions.com");
    body["company_id"] = json!(1);
    let req = test::TestRequest::post().uri("/register").set_json(body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Error creating user");
}

#[actix_web::test]
async fn test_store_errors_turn_into_safe_defaults() {
    let store = UnreachableStore;
    assert!(accounts::load_user(&store, 1).await.is_none());
    assert!(accounts::get_user_companies(&store, 1).await.is_empty());
    let signer = bi_dashboard::auth::token::TokenSigner::new(TOKEN_SECRET);
    assert!(accounts::authenticate_user(&store, &signer, ADMIN_USER, ADMIN_PASS).await.is_none());
}

#[actix_web::test]
async fn test_favicon_is_served() {
    let ctx = setup().await;
    let app = test::init_service(app(&ctx)).await;

    let req = test::TestRequest::get().uri("/favicon.ico").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
