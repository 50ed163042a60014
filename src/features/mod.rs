pub mod auth;
pub mod prompt_transfer;
pub mod prompts;
