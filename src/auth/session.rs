use actix_session::Session;

use crate::models::UserAccount;

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

/// Store the logged-in identity in the cookie session.
pub fn log_in(session: &Session, account: &UserAccount) {
    session.renew();
    let _ = session.insert("user_id", account.user.id);
    let _ = session.insert("username", &account.user.username);
    let _ = session.insert("company_id", account.user.company_id);
}

pub fn log_out(session: &Session) {
    session.purge();
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}
