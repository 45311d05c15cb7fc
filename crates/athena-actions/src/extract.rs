use athena_core::{GenerateRequest, ModelClass, PluginError, Result, Runtime, State};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::schema::ParamSchema;
use crate::template::render_template;

/// How an action asks the model for its parameters.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub template: &'static str,
    pub schema: ParamSchema,
    pub model_class: ModelClass,
}

impl Extraction {
    pub fn new(template: &'static str, schema: ParamSchema, model_class: ModelClass) -> Self {
        Self {
            template,
            schema,
            model_class,
        }
    }
}

/// Render the template, ask the model, resolve the reply against the schema
/// and deserialize it.
///
/// `overrides` are host-supplied values laid over the model's reply before
/// resolution. Every way the reply can be unusable (null, not an object,
/// out of schema, wrong shape) surfaces as [`PluginError::ExtractionFailed`].
/// A schema without fields needs no model call.
pub async fn extract<T: DeserializeOwned>(
    runtime: &dyn Runtime,
    state: &State,
    extraction: &Extraction,
    extra: &[(&str, String)],
    overrides: &Map<String, Value>,
) -> Result<T> {
    if extraction.schema.fields().is_empty() {
        debug!("no parameters to extract");
        return serde_json::from_value(Value::Object(Map::new()))
            .map_err(|e| PluginError::ExtractionFailed(e.to_string()));
    }

    let context = render_template(extraction.template, state, extra);
    let reply = runtime
        .generate_object(GenerateRequest {
            context,
            model_class: extraction.model_class,
            schema: extraction.schema.to_json_schema(),
        })
        .await?;

    let Some(mut raw) = reply else {
        return Err(PluginError::ExtractionFailed(
            "the request does not match this action".into(),
        ));
    };
    debug!(raw = %raw, "model reply");

    if let Value::Object(ref mut object) = raw {
        for (k, v) in overrides {
            object.insert(k.clone(), v.clone());
        }
    }

    let resolved = extraction
        .schema
        .resolve(raw)
        .map_err(|e| PluginError::ExtractionFailed(e.to_string()))?;

    serde_json::from_value(Value::Object(resolved))
        .map_err(|e| PluginError::ExtractionFailed(e.to_string()))
}
