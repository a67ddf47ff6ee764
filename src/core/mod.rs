//! Core derivation logic and abstractions

pub mod cache;
pub mod config;
pub mod convert;
pub mod derive;
pub mod dividends;
pub mod document;
pub mod log;
pub mod metrics;
pub mod source;
pub mod trend;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use config::{AppConfig, InstrumentConfig};
pub use document::{DividendEvent, QuoteDocument, Window};
pub use metrics::{AttrValue, MetricsRecord};
pub use source::QuoteSource;
pub use trend::Trend;
