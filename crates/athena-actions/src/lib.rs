//! # athena-actions
//!
//! The pipeline shared by every API-backed action: parameter schemas,
//! prompt rendering, structured extraction, retrying cache-backed reference
//! fetches, upstream HTTP calls with status mapping, and text formatting.

pub mod extract;
pub mod fetcher;
pub mod format;
pub mod pipeline;
pub mod schema;
pub mod template;
pub mod upstream;

pub use extract::{Extraction, extract};
pub use fetcher::{
    ReferenceDataPolicy, RetryPolicy, fetch_cached, fetch_with_retry, require_non_empty,
};
pub use pipeline::{ActionDescriptor, ApiAction, Delivery, Pipeline};
pub use schema::{Field, FieldKind, OneOrMany, OutOfRange, ParamSchema};
pub use template::render_template;
pub use upstream::{Auth, ErrorMessages, INVALID_REQUEST, RATE_LIMITED, UpstreamClient};
