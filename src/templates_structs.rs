use actix_session::Session;
use askama::Template;

use crate::auth::csrf;
use crate::auth::session::take_flash;
use crate::config::Branding;
use crate::models::nav::{self, NavLink};
use crate::models::{UserAccount, UserDisplay};
use crate::pages::Page;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.navbar`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub user: UserDisplay,
    pub flash: Option<String>,
    pub navbar: Vec<NavLink>,
    pub company_name: String,
    pub logo: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(
        session: &Session,
        account: &UserAccount,
        branding: &Branding,
        current_path: &str,
    ) -> Self {
        let username = account.user.username.clone();
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        // The user's company name wins over the configured branding.
        let company_name = account
            .company
            .as_ref()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| branding.name.clone());
        Self {
            username,
            avatar_initial,
            user: UserDisplay::from(account),
            flash: take_flash(session),
            navbar: nav::build_navbar(&branding.rubro, current_path),
            company_name,
            logo: branding.logo.clone(),
            csrf_token: csrf::get_or_create_token(session),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub app_name: String,
    pub logo: String,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub page: &'static Page,
}
