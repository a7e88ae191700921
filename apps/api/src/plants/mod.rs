pub mod generators;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod slug;
pub mod store;
pub mod synthesis;
pub mod validation;
