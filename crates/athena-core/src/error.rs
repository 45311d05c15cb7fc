use thiserror::Error;

/// Unified error type shared by the host contract and every plugin.
#[derive(Error, Debug)]
pub enum PluginError {
    // ── Configuration ──────────────────────────────────────────
    /// Required credentials are missing. Raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("config error: {0}")]
    Config(String),

    // ── Extraction / validation ────────────────────────────────
    /// The generation step produced nothing usable for this action.
    #[error("parameter extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Invalid category: {0}. Please choose from the available categories.")]
    UnresolvedCategory(String),

    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    // ── Upstream APIs ──────────────────────────────────────────
    /// The upstream answered, but with an empty or malformed payload.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Reference data could not be fetched within the retry budget.
    #[error("{resource} unavailable after {attempts} attempts: {source}")]
    UpstreamUnavailable {
        resource: String,
        attempts: u32,
        #[source]
        source: Box<PluginError>,
    },

    /// The primary API call failed. `status` is `None` for transport errors.
    #[error("{message}")]
    UpstreamHttp {
        status: Option<u16>,
        message: String,
    },

    // ── Host services ──────────────────────────────────────────
    #[error("generation error: {0}")]
    Generation(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("service error: {service}: {reason}")]
    Service { service: String, reason: String },

    #[error("action not found: {0}")]
    ActionNotFound(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PluginError {
    /// Failures reported to the end user as a soft "could not do that"
    /// instead of an upstream error.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            PluginError::ExtractionFailed(_)
                | PluginError::UnresolvedCategory(_)
                | PluginError::InvalidParameter { .. }
        )
    }

    /// HTTP status of a failed upstream call, looking through retry wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            PluginError::UpstreamHttp { status, .. } => *status,
            PluginError::UpstreamUnavailable { source, .. } => source.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;
