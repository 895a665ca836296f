pub mod message;
pub mod quota;
pub mod user;

pub use message::{HistoryEntry, Message};
pub use quota::DailyQuota;
pub use user::User;
