pub mod csrf;
pub mod current_user;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;
pub mod validate;
