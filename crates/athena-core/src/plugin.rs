use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use crate::action::Action;
use crate::message::Memory;
use crate::runtime::Runtime;
use crate::state::State;
use crate::{PluginError, Result};

/// Supplies context text injected into the prompt before an action is chosen.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Never fails: providers degrade to an explanatory sentence instead.
    async fn get(&self, runtime: &dyn Runtime, message: &Memory, state: Option<&State>) -> String;
}

/// A long-lived background service that needs one-time initialization.
#[async_trait]
pub trait Service: Send + Sync {
    fn service_type(&self) -> &str;

    async fn initialize(&self, runtime: &dyn Runtime) -> Result<()>;
}

/// Static aggregate of everything a plugin exposes to the host.
#[derive(Clone)]
pub struct Plugin {
    pub name: String,
    pub description: String,
    pub actions: Vec<Arc<dyn Action>>,
    pub providers: Vec<Arc<dyn Provider>>,
    pub services: Vec<Arc<dyn Service>>,
}

impl Plugin {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
            providers: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_service(mut self, service: Arc<dyn Service>) -> Self {
        self.services.push(service);
        self
    }

    /// Find an action by name or simile.
    pub fn action(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .or_else(|| self.actions.iter().find(|a| a.answers_to(name)))
    }

    pub fn action_names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Reject plugins that register the same action name twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for action in &self.actions {
            if !seen.insert(action.name().to_ascii_uppercase()) {
                return Err(PluginError::Config(format!(
                    "plugin '{}' registers action '{}' more than once",
                    self.name,
                    action.name()
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("actions", &self.action_names())
            .field("providers", &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("services", &self.services.iter().map(|s| s.service_type()).collect::<Vec<_>>())
            .finish()
    }
}
