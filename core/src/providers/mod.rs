pub mod openai;

pub use openai::{DEFAULT_TEMPERATURE, OpenAIProvider};
