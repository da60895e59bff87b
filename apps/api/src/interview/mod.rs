pub mod evaluator;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod store;
