//! Declarative parameter schemas.
//!
//! A [`ParamSchema`] is used twice: rendered to JSON Schema for the
//! generation request, and applied to the reply to fill defaults, coerce
//! loosely typed values and enforce bounds.

use athena_core::{PluginError, Result};
use serde_json::{Map, Number, Value, json};

/// What to do with a number outside its declared bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    /// Pull the value to the nearest bound.
    Clamp,
    /// Fail validation.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Number {
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
        on_out_of_range: OutOfRange,
    },
    Boolean,
    Enum(&'static [&'static str]),
    /// A single string or a list of strings.
    StringOrList,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub description: &'static str,
}

impl Field {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: None,
            description: "",
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(
            name,
            FieldKind::Number {
                min: None,
                max: None,
                integer: true,
                on_out_of_range: OutOfRange::Clamp,
            },
        )
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn one_of(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self::new(name, FieldKind::Enum(variants))
    }

    pub fn string_or_list(name: &'static str) -> Self {
        Self::new(name, FieldKind::StringOrList)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Set numeric bounds. No-op for non-numeric fields.
    pub fn range(mut self, lo: Option<f64>, hi: Option<f64>) -> Self {
        if let FieldKind::Number { min, max, .. } = &mut self.kind {
            *min = lo;
            *max = hi;
        }
        self
    }

    pub fn reject_out_of_range(mut self) -> Self {
        if let FieldKind::Number {
            on_out_of_range, ..
        } = &mut self.kind
        {
            *on_out_of_range = OutOfRange::Reject;
        }
        self
    }

    fn invalid(&self, reason: impl Into<String>) -> PluginError {
        PluginError::InvalidParameter {
            field: self.name.to_string(),
            reason: reason.into(),
        }
    }

    /// Normalize a present, non-null value to the field's type.
    fn coerce(&self, value: Value) -> Result<Value> {
        match &self.kind {
            FieldKind::String => match value {
                Value::String(_) => Ok(value),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                other => Err(self.invalid(format!("expected a string, got {other}"))),
            },
            FieldKind::Boolean => match value {
                Value::Bool(_) => Ok(value),
                Value::String(ref s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(ref s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                other => Err(self.invalid(format!("expected a boolean, got {other}"))),
            },
            FieldKind::Enum(variants) => {
                let Value::String(s) = &value else {
                    return Err(self.invalid(format!("expected one of {}", variants.join(", "))));
                };
                variants
                    .iter()
                    .find(|v| v.eq_ignore_ascii_case(s.trim()))
                    .map(|v| Value::String(v.to_string()))
                    .ok_or_else(|| {
                        self.invalid(format!("'{s}' is not one of {}", variants.join(", ")))
                    })
            }
            FieldKind::StringOrList => match value {
                Value::String(_) => Ok(value),
                Value::Array(ref items) if items.iter().all(Value::is_string) => Ok(value),
                other => Err(self.invalid(format!("expected a string or list of strings, got {other}"))),
            },
            FieldKind::Number {
                min,
                max,
                integer,
                on_out_of_range,
            } => {
                let n = match &value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                }
                .filter(|n| n.is_finite())
                .ok_or_else(|| self.invalid(format!("expected a number, got {value}")))?;

                let n = if *integer { n.trunc() } else { n };
                let bounded = match (min, max) {
                    (Some(lo), _) if n < *lo => Some(*lo),
                    (_, Some(hi)) if n > *hi => Some(*hi),
                    _ => None,
                };
                let n = match (bounded, on_out_of_range) {
                    (None, _) => n,
                    (Some(bound), OutOfRange::Clamp) => bound,
                    (Some(_), OutOfRange::Reject) => {
                        return Err(self.invalid(format!(
                            "{n} is outside {}..={}",
                            fmt_bound(*min),
                            fmt_bound(*max)
                        )));
                    }
                };

                if *integer {
                    Ok(Value::Number(Number::from(n as i64)))
                } else {
                    Number::from_f64(n)
                        .map(Value::Number)
                        .ok_or_else(|| self.invalid("not representable"))
                }
            }
        }
    }

    /// Check an already-coerced value without changing it.
    fn check(&self, value: &Value) -> Result<()> {
        let coerced = self.coerce(value.clone())?;
        if &coerced == value || numbers_equal(&coerced, value) {
            Ok(())
        } else {
            Err(self.invalid(format!("{value} does not satisfy the field constraints")))
        }
    }

    fn json_schema(&self) -> Value {
        let mut prop = match &self.kind {
            FieldKind::String => json!({ "type": "string" }),
            FieldKind::Boolean => json!({ "type": "boolean" }),
            FieldKind::Enum(variants) => json!({ "type": "string", "enum": variants }),
            FieldKind::StringOrList => json!({
                "anyOf": [
                    { "type": "string" },
                    { "type": "array", "items": { "type": "string" } }
                ]
            }),
            FieldKind::Number {
                min, max, integer, ..
            } => {
                let mut p = json!({ "type": if *integer { "integer" } else { "number" } });
                if let Some(lo) = min {
                    p["minimum"] = json!(lo);
                }
                if let Some(hi) = max {
                    p["maximum"] = json!(hi);
                }
                p
            }
        };
        if !self.description.is_empty() {
            prop["description"] = json!(self.description);
        }
        if let Some(ref d) = self.default {
            prop["default"] = d.clone();
        }
        prop
    }
}

fn fmt_bound(bound: Option<f64>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}

fn numbers_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Deserialized form of a [`FieldKind::StringOrList`] value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Trimmed, non-empty entries. A single string may itself be
    /// comma-separated.
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            OneOrMany::One(s) => s.split(',').map(str::to_string).collect(),
            OneOrMany::Many(v) => v,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// The declared shape of an action's parameters.
#[derive(Debug, Clone, Default)]
pub struct ParamSchema {
    fields: Vec<Field>,
    strict: bool,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Treat unknown keys as a violation instead of dropping them.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Fill absent or null fields that declare a default.
    pub fn apply_defaults(&self, mut object: Map<String, Value>) -> Map<String, Value> {
        for field in &self.fields {
            let missing = object.get(field.name).is_none_or(Value::is_null);
            if missing && let Some(ref default) = field.default {
                object.insert(field.name.to_string(), default.clone());
            }
        }
        object
    }

    /// Validate without modifying anything.
    pub fn validate(&self, object: &Map<String, Value>) -> Result<()> {
        if self.strict
            && let Some(key) = object
                .keys()
                .find(|k| !self.fields.iter().any(|f| f.name == k.as_str()))
        {
            return Err(PluginError::InvalidParameter {
                field: key.clone(),
                reason: "unknown field".into(),
            });
        }

        for field in &self.fields {
            match object.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(field.invalid("required field is missing"));
                }
                None | Some(Value::Null) => {}
                Some(value) => field.check(value)?,
            }
        }
        Ok(())
    }

    /// Defaults, then coercion, then validation.
    pub fn resolve(&self, raw: Value) -> Result<Map<String, Value>> {
        let Value::Object(object) = raw else {
            return Err(PluginError::InvalidParameter {
                field: "$".into(),
                reason: format!("expected an object, got {raw}"),
            });
        };

        let mut object = self.apply_defaults(object);
        object.retain(|_, v| !v.is_null());
        if !self.strict {
            object.retain(|k, _| self.fields.iter().any(|f| f.name == k.as_str()));
        }

        for field in &self.fields {
            if let Some(value) = object.remove(field.name) {
                object.insert(field.name.to_string(), field.coerce(value)?);
            }
        }

        self.validate(&object)?;
        Ok(object)
    }

    /// JSON Schema handed to the generation service.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": !self.strict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markets() -> ParamSchema {
        ParamSchema::new()
            .field(Field::string("vs_currency").default("usd"))
            .field(Field::string("category"))
            .field(
                Field::one_of("order", &["market_cap_desc", "volume_desc"])
                    .default("market_cap_desc"),
            )
            .field(
                Field::integer("per_page")
                    .range(Some(1.0), Some(250.0))
                    .default(20),
            )
            .field(Field::boolean("sparkline").default(false))
    }

    #[test]
    fn test_defaults_fill_missing_and_null() {
        let out = markets()
            .resolve(json!({ "category": "gaming", "per_page": null }))
            .unwrap();
        assert_eq!(out["vs_currency"], "usd");
        assert_eq!(out["per_page"], 20);
        assert_eq!(out["order"], "market_cap_desc");
        assert_eq!(out["category"], "gaming");
    }

    #[test]
    fn test_coercion_from_strings() {
        let out = markets()
            .resolve(json!({ "per_page": "15", "sparkline": "TRUE", "order": "Volume_Desc" }))
            .unwrap();
        assert_eq!(out["per_page"], 15);
        assert_eq!(out["sparkline"], true);
        assert_eq!(out["order"], "volume_desc");
    }

    #[test]
    fn test_unknown_keys_dropped_when_lenient() {
        let out = markets().resolve(json!({ "extra": 1 })).unwrap();
        assert!(!out.contains_key("extra"));
    }

    #[test]
    fn test_unknown_keys_rejected_when_strict() {
        let schema = ParamSchema::new()
            .field(Field::integer("limit").default(10))
            .strict();
        assert!(schema.resolve(json!({ "limit": 3, "extra": true })).is_err());
    }

    #[test]
    fn test_json_schema_shape() {
        let s = markets().to_json_schema();
        assert_eq!(s["type"], "object");
        assert_eq!(s["properties"]["per_page"]["type"], "integer");
        assert_eq!(s["properties"]["per_page"]["maximum"], 250.0);
        assert_eq!(s["properties"]["order"]["enum"][1], "volume_desc");
        assert_eq!(s["additionalProperties"], true);
    }

    #[test]
    fn test_one_or_many_splits_and_trims() {
        let one: OneOrMany = serde_json::from_value(json!("bitcoin, ethereum")).unwrap();
        assert_eq!(one.into_vec(), vec!["bitcoin", "ethereum"]);
        let many: OneOrMany = serde_json::from_value(json!(["usd", " ", "EUR"])).unwrap();
        assert_eq!(many.into_vec(), vec!["usd", "EUR"]);
    }
}
