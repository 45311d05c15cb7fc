use async_trait::async_trait;
use athena_config::AthenaConfig;
use athena_core::{
    Action, CacheStore, Content, GenerateRequest, HandlerOptions, Memory, MemoryCache, ModelClass,
    Plugin, PluginError, Result, Runtime, Service, State,
};
use athena_llm::{ChatMessage, LlmProvider, LlmRequest, parse_json_object};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// State value holding the room a state was composed for.
pub const ROOM_KEY: &str = "roomId";

/// Messages per room rendered into composed state.
pub const RECENT_MESSAGE_COUNT: usize = 10;

const JSON_INSTRUCTION: &str = "Respond with a single JSON object that matches the schema below. \
If the request does not fit what was asked for, respond with null. \
Do not add any other text.";

/// Model parameters used for generation.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub small_model: String,
    pub large_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelSettings {
    pub fn model_for(&self, class: ModelClass) -> &str {
        match class {
            ModelClass::Small => &self.small_model,
            ModelClass::Large => &self.large_model,
        }
    }
}

/// An in-process agent host for action plugins.
pub struct AgentRuntime {
    agent_id: Uuid,
    agent_name: String,
    settings: HashMap<String, String>,
    env_fallback: bool,
    cache: Arc<dyn CacheStore>,
    llm: Arc<dyn LlmProvider>,
    models: ModelSettings,
    history: RwLock<HashMap<Uuid, Vec<Memory>>>,
    plugins: Vec<Plugin>,
}

impl AgentRuntime {
    /// A runtime with default models, an in-memory cache and no settings.
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self::from_config(&AthenaConfig::default(), llm)
    }

    pub fn from_config(config: &AthenaConfig, llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            agent_id: Uuid::new_v4(),
            agent_name: config.agent.name.clone(),
            settings: config.settings.clone(),
            env_fallback: true,
            cache: Arc::new(MemoryCache::new()),
            llm,
            models: ModelSettings {
                small_model: config.agent.small_model.clone(),
                large_model: config.agent.large_model.clone(),
                temperature: config.agent.temperature,
                max_tokens: config.agent.max_tokens,
            },
            history: RwLock::new(HashMap::new()),
            plugins: Vec::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Only read settings given to the runtime, never the process environment.
    pub fn isolated(mut self) -> Self {
        self.env_fallback = false;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn models(&self) -> &ModelSettings {
        &self.models
    }

    /// Add a plugin. Action names must be unique across all plugins.
    pub fn register(&mut self, plugin: Plugin) -> Result<()> {
        plugin.validate()?;
        for name in plugin.action_names() {
            if self.find_action(name).is_some() {
                return Err(PluginError::Config(format!(
                    "action {name} from plugin {} is already registered",
                    plugin.name
                )));
            }
        }
        info!(
            plugin = %plugin.name,
            actions = plugin.actions.len(),
            providers = plugin.providers.len(),
            services = plugin.services.len(),
            "plugin registered"
        );
        self.plugins.push(plugin);
        Ok(())
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// All registered actions in registration order.
    pub fn actions(&self) -> impl Iterator<Item = &Arc<dyn Action>> {
        self.plugins.iter().flat_map(|p| p.actions.iter())
    }

    pub fn services(&self) -> impl Iterator<Item = &Arc<dyn Service>> {
        self.plugins.iter().flat_map(|p| p.services.iter())
    }

    /// Look up an action by name or simile across plugins.
    pub fn find_action(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.plugins.iter().find_map(|p| p.action(name))
    }

    /// Initialize every service. Failures are logged and skipped.
    pub async fn initialize(&self) {
        for service in self.services() {
            match service.initialize(self).await {
                Ok(()) => info!(service = service.service_type(), "service initialized"),
                Err(e) => error!(
                    service = service.service_type(),
                    error = %e,
                    "service failed to initialize"
                ),
            }
        }
    }

    /// Append a message to its room's history.
    pub fn record(&self, memory: Memory) {
        self.history
            .write()
            .entry(memory.room_id)
            .or_default()
            .push(memory);
    }

    pub fn room_history(&self, room_id: Uuid) -> Vec<Memory> {
        self.history
            .read()
            .get(&room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Run one action on a fresh user message and collect what it delivers.
    ///
    /// Returns `(false, [])` without calling the handler when the action's
    /// `validate` fails.
    pub async fn invoke(&self, action: &str, text: &str, room_id: Uuid) -> Result<(bool, Vec<Content>)> {
        let action = self
            .find_action(action)
            .ok_or_else(|| PluginError::ActionNotFound(action.to_string()))?;

        let message = Memory::user_text(self.agent_id, Uuid::new_v4(), room_id, text);
        self.record(message.clone());

        if !action.validate(self, &message).await {
            warn!(action = action.name(), "action is not available");
            return Ok((false, Vec::new()));
        }

        let mut delivered = Vec::new();
        let mut sink = |content: Content| delivered.push(content);
        let ok = action
            .handler(
                self,
                &message,
                None,
                &HandlerOptions::default(),
                Some(&mut sink as &mut (dyn FnMut(Content) + Send)),
            )
            .await?;

        for content in &delivered {
            self.record(Memory::agent_reply(self.agent_id, room_id, content.clone()));
        }
        Ok((ok, delivered))
    }

    /// Plain-text completion with the given model class.
    pub async fn generate_text(&self, prompt: &str, class: ModelClass) -> Result<String> {
        let request = LlmRequest {
            model: self.models.model_for(class).to_string(),
            system: None,
            messages: vec![ChatMessage::user(prompt)],
            max_tokens: self.models.max_tokens,
            temperature: self.models.temperature,
            json_mode: false,
        };
        Ok(self.llm.complete(&request).await?.text)
    }

    /// Ask the large model which registered action fits `text`.
    ///
    /// The first action whose name or simile appears in the reply wins;
    /// `None` when the model names nothing registered.
    pub async fn select_action(&self, text: &str, room_id: Uuid) -> Result<Option<&Arc<dyn Action>>> {
        let catalog = self
            .actions()
            .map(|a| {
                if a.similes().is_empty() {
                    format!("- {}: {}", a.name(), a.description())
                } else {
                    format!(
                        "- {}: {} (also: {})",
                        a.name(),
                        a.description(),
                        a.similes().join(", ")
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let history = self.room_history(room_id);
        let start = history.len().saturating_sub(RECENT_MESSAGE_COUNT);
        let prompt = format!(
            "You are {name}. Choose the single best action for the user's latest message.\n\n\
             Available actions:\n{catalog}\n\n\
             Conversation:\n{recent}\nuser: {text}\n\n\
             Reply with the action name only, or NONE if no action applies.",
            name = self.agent_name,
            recent = self.render_lines(&history[start..]),
        );

        let reply = self.generate_text(&prompt, ModelClass::Large).await?;
        let words: Vec<&str> = reply
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|w| !w.is_empty())
            .collect();
        let chosen = self.actions().find(|a| {
            std::iter::once(a.name())
                .chain(a.similes().iter().copied())
                .any(|n| words.iter().any(|w| w.eq_ignore_ascii_case(n)))
        });
        debug!(reply = %reply.trim(), chosen = ?chosen.map(|a| a.name()), "action selection");
        Ok(chosen)
    }

    fn render_lines(&self, messages: &[Memory]) -> String {
        messages
            .iter()
            .map(|m| {
                let who = if m.is_from_agent() { self.agent_name.as_str() } else { "user" };
                format!("{who}: {}", m.text())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn recent_fields(&self, message: &Memory) -> (String, String) {
        let history = self.room_history(message.room_id);
        let start = history.len().saturating_sub(RECENT_MESSAGE_COUNT);
        let recent = &history[start..];
        let earlier: Vec<Memory> = recent
            .iter()
            .filter(|m| m.id != message.id)
            .cloned()
            .collect();
        (self.render_lines(recent), self.render_lines(&earlier))
    }
}

#[async_trait]
impl Runtime for AgentRuntime {
    fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    fn get_setting(&self, key: &str) -> Option<String> {
        let from_settings = self.settings.get(key).cloned();
        let value = if self.env_fallback {
            from_settings.or_else(|| std::env::var(key).ok())
        } else {
            from_settings
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    async fn compose_state(&self, message: &Memory) -> Result<State> {
        let (recent_messages, conversation) = self.recent_fields(message);
        let mut state = State {
            agent_name: self.agent_name.clone(),
            recent_messages,
            conversation,
            message: message.text().to_string(),
            values: HashMap::new(),
        };
        state.set(ROOM_KEY, message.room_id.to_string());

        let mut sections = Vec::new();
        for plugin in &self.plugins {
            for provider in &plugin.providers {
                let text = provider.get(self, message, Some(&state)).await;
                debug!(provider = provider.name(), chars = text.len(), "provider ran");
                if !text.is_empty() {
                    sections.push(text);
                }
            }
        }
        state.set("providers", sections.join("\n\n"));
        Ok(state)
    }

    async fn update_recent_message_state(&self, mut state: State) -> Result<State> {
        let Some(room_id) = state.get(ROOM_KEY).and_then(|r| Uuid::parse_str(r).ok()) else {
            return Ok(state);
        };
        let history = self.room_history(room_id);
        let start = history.len().saturating_sub(RECENT_MESSAGE_COUNT);
        state.recent_messages = self.render_lines(&history[start..]);
        Ok(state)
    }

    async fn generate_object(&self, request: GenerateRequest) -> Result<Option<serde_json::Value>> {
        let schema = serde_json::to_string_pretty(&request.schema)?;
        let llm_request = LlmRequest {
            model: self.models.model_for(request.model_class).to_string(),
            system: Some(format!("{JSON_INSTRUCTION}\n\nSchema:\n{schema}")),
            messages: vec![ChatMessage::user(request.context)],
            max_tokens: self.models.max_tokens,
            temperature: self.models.temperature,
            // `null` is a valid answer, which JSON-object mode cannot express.
            json_mode: false,
        };
        debug!(provider = self.llm.name(), model = %llm_request.model, "generating object");
        let response = self.llm.complete(&llm_request).await?;
        parse_json_object(&response.text).map_err(|e| PluginError::ExtractionFailed(e.to_string()))
    }
}
