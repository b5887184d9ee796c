pub mod db;
pub mod error;
pub mod models;
pub mod service;

pub use db::{ChatStore, SqliteStore};
pub use error::ChatError;
pub use models::*;
pub use service::{ChatService, SendMessageResult};
