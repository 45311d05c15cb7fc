//! # athena-llm
//!
//! Generation service used by the host runtime for structured parameter
//! extraction. One OpenAI-compatible backend plus a mock for tests.

pub mod generate;
pub mod mock;
pub mod openai;
pub mod provider;

pub use generate::parse_json_object;
pub use mock::{MockProvider, MockResponse};
pub use openai::OpenAiProvider;
pub use provider::{ChatMessage, ChatRole, LlmProvider, LlmRequest, LlmResponse};
