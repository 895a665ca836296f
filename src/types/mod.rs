mod admin;
mod auth;
mod chat;

pub use admin::*;
pub use auth::*;
pub use chat::*;
