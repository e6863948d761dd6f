use std::future::Future;
use std::pin::Pin;

use actix_session::SessionExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};

use crate::accounts;
use crate::errors::AppError;
use crate::models::UserAccount;
use crate::store::AccountStore;

/// The logged-in user, reloaded from the store on every request.
///
/// A session that points at a missing or deactivated user is purged and the
/// request is sent back to the login page.
#[derive(Debug, Clone)]
pub struct SessionUser(pub UserAccount);

impl SessionUser {
    pub fn account(&self) -> &UserAccount {
        &self.0
    }
}

impl FromRequest for SessionUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let session = req.get_session();
        let store = req.app_data::<web::Data<dyn AccountStore>>().cloned();

        Box::pin(async move {
            let store = store.ok_or(AppError::Internal("account store not configured".into()))?;
            let user_id = crate::auth::session::get_user_id(&session).ok_or(AppError::LoginRequired)?;

            match accounts::load_user(store.get_ref(), user_id).await {
                Some(account) if account.user.is_active => Ok(SessionUser(account)),
                _ => {
                    log::info!("Dropping stale session for user {user_id}");
                    crate::auth::session::log_out(&session);
                    Err(AppError::LoginRequired)
                }
            }
        })
    }
}
