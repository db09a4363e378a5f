pub mod answerer;
pub mod client;
pub mod config;
pub mod tokenizer;

pub use answerer::{Answerer, ProgressObserver};
pub use client::HttpCompletionClient;
pub use config::{LLMConfig, RetryPolicy};
