//! Hermes REST access shared by the Pyth actions: base URL resolution,
//! price-id normalization and the response types.

use athena_actions::format::{format_scaled, from_unix, short_date_time};
use athena_actions::{Auth, ErrorMessages, UpstreamClient};
use athena_core::{PluginError, Result, Runtime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network";
pub const HERMES_URL_SETTING: &str = "PYTH_HERMES_URL";

const PRICE_ID_HEX_LEN: usize = 64;

const RESTRICTED: &str =
    "The Pyth Hermes endpoint refused the request. It may require a dedicated access plan.";

/// Status wording for a Hermes call about `subject`.
pub const fn errors(subject: &'static str) -> ErrorMessages {
    ErrorMessages::new(subject, RESTRICTED)
}

/// Handle shared by every Pyth action.
#[derive(Debug, Clone, Default)]
pub struct Hermes {
    http: reqwest::Client,
}

impl Hermes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(runtime: &dyn Runtime) -> String {
        runtime
            .get_setting(HERMES_URL_SETTING)
            .unwrap_or_else(|| DEFAULT_HERMES_URL.to_string())
    }

    pub fn client(&self, runtime: &dyn Runtime) -> UpstreamClient {
        UpstreamClient::with_client(self.http.clone(), Self::base_url(runtime), Auth::None)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

// ── Price ids ──────────────────────────────────────────────

/// Lowercase hex without the `0x` prefix, or `InvalidParameter`.
pub fn normalize_price_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex.len() != PRICE_ID_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PluginError::InvalidParameter {
            field: "price_ids".into(),
            reason: format!("'{trimmed}' is not a 32-byte hex price feed id"),
        });
    }
    Ok(hex.to_ascii_lowercase())
}

/// Normalize every id, dropping duplicates. At least one id is required.
pub fn normalize_price_ids(raw: Vec<String>) -> Result<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(raw.len());
    for id in raw {
        let id = normalize_price_id(&id)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(PluginError::InvalidParameter {
            field: "price_ids".into(),
            reason: "at least one price feed id is required".into(),
        });
    }
    Ok(ids)
}

/// Repeated `ids[]` query pairs.
pub fn id_query(ids: &[String]) -> Vec<(&'static str, String)> {
    ids.iter().map(|id| ("ids[]", id.clone())).collect()
}

// ── Response types ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeed {
    pub id: String,
    #[serde(default)]
    pub attributes: FeedAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedAttributes {
    pub asset_type: Option<String>,
    pub base: Option<String>,
    pub description: Option<String>,
    pub display_symbol: Option<String>,
    pub generic_symbol: Option<String>,
    pub quote_currency: Option<String>,
    pub symbol: Option<String>,
}

/// One `latest` response or one stream event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    #[serde(default)]
    pub binary: Option<BinaryUpdate>,
    #[serde(default)]
    pub parsed: Vec<ParsedPriceUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryUpdate {
    pub encoding: String,
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPriceUpdate {
    pub id: String,
    pub price: Price,
    pub ema_price: Price,
    #[serde(default)]
    pub metadata: Option<PriceMetadata>,
}

/// Fixed-point price: the real value is `price × 10^expo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub price: String,
    pub conf: String,
    pub expo: i32,
    pub publish_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceMetadata {
    pub slot: Option<u64>,
    pub proof_available_time: Option<i64>,
    pub prev_publish_time: Option<i64>,
}

impl Price {
    /// `(price, confidence)` rendered with the exponent applied.
    pub fn display(&self) -> Option<(String, String)> {
        let price = self.price.parse::<i64>().ok()?;
        let conf = self.conf.parse::<i64>().ok()?;
        if !self.value()?.is_finite() {
            return None;
        }
        Some((format_scaled(price, self.expo), format_scaled(conf, self.expo)))
    }

    pub fn value(&self) -> Option<f64> {
        let price = self.price.parse::<i64>().ok()?;
        Some(price as f64 * 10f64.powi(self.expo))
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        from_unix(self.publish_time)
    }

    fn line(&self, label: &str) -> String {
        match self.display() {
            Some((price, conf)) => format!("  {label}: {price} ± {conf}"),
            None => format!("  {label}: unavailable"),
        }
    }
}

/// Multi-line text for one feed's update.
pub fn render_update(update: &ParsedPriceUpdate) -> String {
    let published = update
        .price
        .published_at()
        .map(|at| format!("{} UTC", short_date_time(&at)))
        .unwrap_or_else(|| "unknown".into());
    [
        format!("Feed 0x{}", update.id.trim_start_matches("0x")),
        update.price.line("Price"),
        update.ema_price.line("EMA Price"),
        format!("  Published: {published}"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BTC: &str = "e62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43";

    #[test]
    fn test_normalize_price_id() {
        assert_eq!(normalize_price_id(&format!("0x{BTC}")).unwrap(), BTC);
        assert_eq!(
            normalize_price_id(&format!("  0X{}  ", BTC.to_uppercase())).unwrap(),
            BTC
        );
        assert!(normalize_price_id("0x1234").is_err());
        assert!(normalize_price_id(&"g".repeat(64)).is_err());
    }

    #[test]
    fn test_normalize_price_ids_dedupes_and_requires_one() {
        let ids = normalize_price_ids(vec![BTC.into(), format!("0x{BTC}")]).unwrap();
        assert_eq!(ids, vec![BTC.to_string()]);
        let err = normalize_price_ids(vec![]).unwrap_err();
        assert!(err.is_soft());
    }

    #[test]
    fn test_render_update() {
        let update = ParsedPriceUpdate {
            id: BTC.into(),
            price: Price {
                price: "6512345678901".into(),
                conf: "1234567".into(),
                expo: -8,
                publish_time: 1_737_299_045,
            },
            ema_price: Price {
                price: "bogus".into(),
                conf: "0".into(),
                expo: -8,
                publish_time: 1_737_299_045,
            },
            metadata: None,
        };
        assert_eq!(
            render_update(&update),
            format!(
                "Feed 0x{BTC}\n  Price: 65,123.45678901 ± 0.01234567\n  EMA Price: unavailable\n  \
                 Published: 1/19/2025, 3:04:05 PM UTC"
            )
        );
    }

    #[test]
    fn test_malformed_exponents_render_without_panicking() {
        let huge = Price {
            price: "6512345678901".into(),
            conf: "1500000".into(),
            expo: i32::MAX,
            publish_time: 1_737_299_045,
        };
        assert_eq!(huge.line("Price"), "  Price: unavailable");

        let tiny = Price { expo: i32::MIN, ..huge };
        assert_eq!(tiny.line("Price"), "  Price: 0.00 ± 0.00");
    }
}
