mod prompt;
mod scope;

pub use prompt::{Prompt, PromptRecord};
pub use scope::PromptScope;
