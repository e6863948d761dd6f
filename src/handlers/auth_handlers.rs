use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::accounts;
use crate::auth::{csrf, rate_limit::RateLimiter, session};
use crate::config::Branding;
use crate::errors::{AppError, render};
use crate::store::AccountStore;
use crate::templates_structs::LoginTemplate;

use super::client_ip;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn login_form(session: &Session, branding: &Branding, error: Option<&str>) -> Result<HttpResponse, AppError> {
    render(LoginTemplate {
        error: error.map(String::from),
        app_name: branding.name.clone(),
        logo: branding.logo.clone(),
        csrf_token: csrf::get_or_create_token(session),
    })
}

pub async fn login_page(
    session: Session,
    branding: web::Data<Branding>,
) -> Result<HttpResponse, AppError> {
    // If already logged in, go home
    if session::get_user_id(&session).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/"))
            .finish());
    }
    login_form(&session, &branding, None)
}

pub async fn login_submit(
    req: HttpRequest,
    store: web::Data<dyn AccountStore>,
    session: Session,
    branding: web::Data<Branding>,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        return login_form(
            &session,
            &branding,
            Some("Too many failed login attempts. Please try again later."),
        );
    }

    match accounts::verify_credentials(store.get_ref(), &form.username, &form.password).await {
        Some(account) => {
            limiter.clear(ip);
            session::log_in(&session, &account);
            session::set_flash(&session, &format!("Bienvenido, {}", account.full_name()));
            log::info!("User '{}' logged in", account.user.username);
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/"))
                .finish())
        }
        None => {
            limiter.record_failure(ip);
            login_form(&session, &branding, Some("Invalid username or password"))
        }
    }
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session::log_out(&session);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}
