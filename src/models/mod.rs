pub mod company;
pub mod nav;
pub mod profile;
pub mod user;

pub use company::{Company, CompanySummary, NewCompany};
pub use profile::{NewProfile, UserProfile};
pub use user::{NewUser, User, UserAccount, UserDisplay};
