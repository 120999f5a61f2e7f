pub mod login_attempt;
pub mod usage;
pub mod user;

pub use login_attempt::{LockoutPolicy, LoginAttemptRecord};
pub use usage::UsageRecord;
pub use user::User;
