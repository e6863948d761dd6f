pub mod api;
pub mod auth_handlers;
pub mod health;
pub mod pages;
pub mod static_files;

use std::net::{IpAddr, Ipv4Addr};

use actix_web::{HttpRequest, HttpResponse, error::InternalError, middleware::from_fn, web};

use crate::auth::middleware::{require_auth, require_token};
use crate::errors::message;

/// Client address used for login throttling.
pub(crate) fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Malformed or non-JSON bodies answer 400 `{"message": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected JSON body: {err}");
        let response = HttpResponse::BadRequest().json(message(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// All application routes. Expects the account store, token signer, rate
/// limiter and branding as app data, and a session middleware around the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    // Static files
    cfg.route("/favicon.ico", web::get().to(static_files::favicon))
        .service(actix_files::Files::new("/resource", static_files::RESOURCE_DIR))
        .service(actix_files::Files::new("/assets", static_files::ASSETS_DIR));

    // JSON API
    cfg.route("/register", web::post().to(api::register))
        .route("/login", web::post().to(api::login))
        .service(
            web::resource("/companies")
                .wrap(from_fn(require_token))
                .route(web::get().to(api::companies)),
        )
        .route("/health", web::get().to(health::health));

    // Interactive login
    cfg.route("/login", web::get().to(auth_handlers::login_page))
        .route("/login/session", web::post().to(auth_handlers::login_submit))
        .route("/logout", web::post().to(auth_handlers::logout));

    // Protected pages (registered last: the empty scope matches everything)
    let protected = crate::pages::PAGES.iter().fold(
        web::scope("").wrap(from_fn(require_auth)),
        |scope, page| scope.route(page.path, web::get().to(pages::show)),
    );
    cfg.service(protected);
}
