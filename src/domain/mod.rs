//! Concrete stores of the habit-tracking and marketplace app.

pub mod market;
pub mod metrics;

pub use market::{market_store, Category, MarketQuery, MarketSource, MarketStore, Posting};
pub use metrics::{metrics_store, Metric, MetricKind, MetricsStore};
