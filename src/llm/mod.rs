//! LLM module - language model integrations
//!
//! Provides the model client boundary with an OpenAI-compatible implementation.

pub mod openai;
pub mod traits;

pub use openai::OpenAiClient;
pub use traits::ModelClient;
