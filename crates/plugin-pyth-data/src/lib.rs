//! # plugin-pyth-data
//!
//! Pyth price-oracle data from the public Hermes API. No credentials are
//! needed; `PYTH_HERMES_URL` points the actions at another Hermes host.
//!
//! | Action                      | Endpoint                                   |
//! |-----------------------------|--------------------------------------------|
//! | `GET_PRICE_FEEDS`           | `/v2/price_feeds`                          |
//! | `GET_PRICE_UPDATES_STREAM`  | `/v2/updates/price/stream` (SSE)           |
//! | `GET_LATEST_PRICE_UPDATES`  | `/v2/updates/price/latest`                 |
//! | `GET_LATEST_PUBLISHER_CAPS` | `/v2/updates/publisher_stake_caps/latest`  |

pub mod feeds;
pub mod hermes;
pub mod latest;
pub mod publisher_caps;
pub mod stream;
pub mod templates;

use athena_actions::Pipeline;
use athena_core::Plugin;
use std::sync::Arc;

pub use hermes::{Hermes, normalize_price_id};

pub fn pyth_data_plugin() -> Plugin {
    let hermes = Arc::new(Hermes::new());
    Plugin::new("pyth-data", "Pyth Data Plugin for price feeds and market data")
        .with_action(Arc::new(Pipeline::new(feeds::GetPriceFeeds::new(hermes.clone()))))
        .with_action(Arc::new(Pipeline::new(
            stream::GetPriceUpdatesStream::new(hermes.clone()),
        )))
        .with_action(Arc::new(Pipeline::new(
            latest::GetLatestPriceUpdates::new(hermes.clone()),
        )))
        .with_action(Arc::new(Pipeline::new(
            publisher_caps::GetLatestPublisherCaps::new(hermes),
        )))
}
