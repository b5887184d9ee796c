pub mod assistant;
pub mod fallback;
pub mod intent;
pub mod prompt;
pub mod strategy;
pub mod title;

pub use assistant::{Assistant, AssistantResponse};
pub use strategy::{FallbackStrategy, GenerativeStrategy, Reply, ResponseStrategy, Turn};
