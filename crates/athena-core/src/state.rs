use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Conversation state composed by the host before an action runs.
///
/// Well-known fields are exposed as struct members; everything else lives in
/// `values` and is reachable from templates as `{{key}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub agent_name: String,
    /// Recent room messages rendered as `name: text` lines.
    pub recent_messages: String,
    /// Same lines as `recent_messages`, excluding the current message.
    pub conversation: String,
    /// Text of the message being replied to.
    pub message: String,
    #[serde(default)]
    pub values: HashMap<String, String>,
}

impl State {
    /// Look up a template value. Well-known fields take precedence.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "agentName" => Some(&self.agent_name),
            "recentMessages" => Some(&self.recent_messages),
            "conversation" => Some(&self.conversation),
            "message" => Some(&self.message),
            _ => self.values.get(key).map(String::as_str),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}
