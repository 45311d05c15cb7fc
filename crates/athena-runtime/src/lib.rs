//! # athena-runtime
//!
//! A small in-process host for action plugins: composes conversation state
//! from per-room history and providers, runs structured generation through an
//! [`athena_llm::LlmProvider`], and dispatches actions.

pub mod agent;

pub use agent::{AgentRuntime, ModelSettings, RECENT_MESSAGE_COUNT, ROOM_KEY};
