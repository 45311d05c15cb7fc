use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A message exchanged in a room, as the host stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub agent_id: Uuid,
    pub room_id: Uuid,
    pub content: Content,
    pub created_at: DateTime<Utc>,
}

/// Payload of a message and of every action callback.
///
/// Actions deliver `{text, content}` on success and `{text, error}` on
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_error(mut self, error: Value) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl Memory {
    /// Create a plain text message from `user_id` in `room_id`.
    pub fn user_text(agent_id: Uuid, user_id: Uuid, room_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            agent_id,
            room_id,
            content: Content::text(text),
            created_at: Utc::now(),
        }
    }

    /// A message authored by the agent, e.g. an action's delivered result.
    pub fn agent_reply(agent_id: Uuid, room_id: Uuid, content: Content) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: agent_id,
            agent_id,
            room_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Whether the agent itself authored this message.
    pub fn is_from_agent(&self) -> bool {
        self.user_id == self.agent_id
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }
}

/// One turn of an action example transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionExample {
    pub user: String,
    pub content: Content,
}

impl ActionExample {
    pub fn user(text: &str) -> Self {
        Self {
            user: "{{user1}}".into(),
            content: Content::text(text),
        }
    }

    pub fn agent(text: &str) -> Self {
        Self {
            user: "{{agent}}".into(),
            content: Content::text(text),
        }
    }

    pub fn agent_action(text: &str, action: &str) -> Self {
        Self {
            user: "{{agent}}".into(),
            content: Content::text(text).with_action(action),
        }
    }
}
