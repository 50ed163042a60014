pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use models::{Prompt, PromptRecord, PromptScope};
pub use services::PromptService;
pub use store::PromptStore;
