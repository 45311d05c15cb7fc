//! The generic action driver.
//!
//! Every API-backed action runs the same sequence: compose or refresh the
//! conversation state, extract parameters, run the action-specific request
//! and formatting, then deliver exactly one result through the callback.

use async_trait::async_trait;
use athena_core::{
    Action, ActionExample, Callback, Content, HandlerOptions, Memory, PluginError, Result,
    Runtime, State,
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt::Debug;
use tracing::{debug, error, info, warn};

use crate::extract::{Extraction, extract};
use crate::upstream::ErrorMessages;

/// Name, similes and description of an action.
#[derive(Debug, Clone, Copy)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub similes: &'static [&'static str],
    pub description: &'static str,
}

/// A successful action result.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub text: String,
    pub content: Value,
}

impl Delivery {
    pub fn new(text: impl Into<String>, content: Value) -> Self {
        Self {
            text: text.into(),
            content,
        }
    }
}

/// Per-action configuration plugged into [`Pipeline`].
#[async_trait]
pub trait ApiAction: Send + Sync + 'static {
    type Params: DeserializeOwned + Debug + Send;

    fn descriptor(&self) -> &ActionDescriptor;

    fn examples(&self) -> Vec<Vec<ActionExample>>;

    fn extraction(&self) -> &Extraction;

    fn errors(&self) -> &ErrorMessages;

    /// Whether the action can run (credentials present, etc).
    async fn is_available(&self, runtime: &dyn Runtime) -> bool;

    /// Extra template values, e.g. a rendered reference list.
    async fn template_values(&self, _runtime: &dyn Runtime) -> Result<Vec<(&'static str, String)>> {
        Ok(Vec::new())
    }

    async fn execute(&self, runtime: &dyn Runtime, params: Self::Params) -> Result<Delivery>;

    /// Text for failures reported softly.
    fn soft_failure_text(&self, err: &PluginError) -> String {
        match err {
            PluginError::ExtractionFailed(_) => format!(
                "Sorry, I couldn't work out the details for your {} request. Could you rephrase it?",
                self.errors().subject
            ),
            other => other.to_string(),
        }
    }
}

/// Adapts an [`ApiAction`] to the host's [`Action`] trait.
pub struct Pipeline<A> {
    inner: A,
}

impl<A: ApiAction> Pipeline<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    async fn run(
        &self,
        runtime: &dyn Runtime,
        state: &State,
        options: &HandlerOptions,
    ) -> Result<Delivery> {
        let name = self.inner.descriptor().name;
        let extra = self.inner.template_values(runtime).await?;
        let params: A::Params = extract(
            runtime,
            state,
            self.inner.extraction(),
            &extra,
            &options.values,
        )
        .await?;
        debug!(action = name, ?params, "parameters extracted");
        self.inner.execute(runtime, params).await
    }

    fn outcome(&self, result: Result<Delivery>) -> (Content, bool) {
        let name = self.inner.descriptor().name;
        match result {
            Ok(delivery) => {
                info!(action = name, "action completed");
                (
                    Content::text(delivery.text).with_content(delivery.content),
                    true,
                )
            }
            Err(e) if e.is_soft() => {
                warn!(action = name, error = %e, "action could not proceed");
                let payload = json!({ "message": e.to_string(), "soft": true });
                (
                    Content::text(self.inner.soft_failure_text(&e)).with_error(payload),
                    false,
                )
            }
            Err(e) => {
                error!(action = name, status = ?e.status(), error = %e, "action failed");
                let errors = self.inner.errors();
                (
                    Content::text(errors.user_message(&e)).with_error(errors.payload(&e)),
                    false,
                )
            }
        }
    }
}

#[async_trait]
impl<A: ApiAction> Action for Pipeline<A> {
    fn name(&self) -> &str {
        self.inner.descriptor().name
    }

    fn similes(&self) -> &[&str] {
        self.inner.descriptor().similes
    }

    fn description(&self) -> &str {
        self.inner.descriptor().description
    }

    fn examples(&self) -> Vec<Vec<ActionExample>> {
        self.inner.examples()
    }

    async fn validate(&self, runtime: &dyn Runtime, _message: &Memory) -> bool {
        self.inner.is_available(runtime).await
    }

    async fn handler(
        &self,
        runtime: &dyn Runtime,
        message: &Memory,
        state: Option<State>,
        options: &HandlerOptions,
        callback: Option<Callback<'_>>,
    ) -> Result<bool> {
        info!(action = self.name(), "handling action");
        let state = match state {
            Some(state) => runtime.update_recent_message_state(state).await,
            None => runtime.compose_state(message).await,
        };

        let result = match state {
            Ok(state) => self.run(runtime, &state, options).await,
            Err(e) => Err(e),
        };
        let (content, ok) = self.outcome(result);
        if let Some(cb) = callback {
            cb(content.with_action(self.name()));
        }
        Ok(ok)
    }
}
