use athena_core::State;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Replace `{{key}}` placeholders from `extra` first, then from `state`.
/// Unknown placeholders are left as they are.
pub fn render_template(template: &str, state: &State, extra: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            extra
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .or_else(|| state.get(key).map(str::to_string))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
