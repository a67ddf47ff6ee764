//! Per-instrument refresh state
//!
//! An `InstrumentTracker` owns one instrument's configuration, the rolling
//! previous close (the only value carried between refresh cycles) and the
//! last successfully published record. Trackers never share state, so a set
//! of them can refresh concurrently.

use crate::core::config::InstrumentConfig;
use crate::core::derive::derive;
use crate::core::document::QuoteDocument;
use crate::core::metrics::MetricsRecord;
use crate::core::source::QuoteSource;
use crate::core::trend::{self, Trend};
use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::ProgressBar;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PublishedRecord {
    pub name: String,
    pub record: MetricsRecord,
    pub trend: Trend,
    pub icon: &'static str,
}

pub struct InstrumentTracker {
    config: InstrumentConfig,
    previous_close: Option<f64>,
    published: Option<PublishedRecord>,
}

impl InstrumentTracker {
    pub fn new(config: InstrumentConfig) -> Self {
        InstrumentTracker {
            config,
            previous_close: None,
            published: None,
        }
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn display_name(&self) -> String {
        self.config.display_name()
    }

    /// The record published by the most recent successful refresh, if any.
    /// A failed cycle leaves the previous record in place.
    pub fn published(&self) -> Option<&PublishedRecord> {
        self.published.as_ref()
    }

    /// Run one refresh cycle: fetch the document(s), derive the record,
    /// classify the trend and publish atomically. Any failure abandons the
    /// cycle without touching the published record.
    pub async fn refresh(&mut self, source: &dyn QuoteSource) -> Result<()> {
        let doc = if self.config.is_manual() {
            let price = self
                .config
                .purchase_price
                .context("Manual instrument requires purchase_price")?;
            QuoteDocument::manual(price)
        } else {
            source.fetch_document(self.config.id).await?
        };

        let conversion = match self.config.conversion_id {
            Some(conversion_id) => Some(source.fetch_document(conversion_id).await?),
            None => None,
        };

        let today = chrono::Local::now().date_naive();
        let record = derive(&doc, &self.config, conversion.as_ref(), today)?;

        let previous_close = trend::derive_previous_close(&doc, self.previous_close);
        let trend = trend::classify(doc.last(), previous_close);
        self.previous_close = previous_close;

        debug!(
            instrument = self.config.id,
            trend = trend.as_str(),
            "Publishing refreshed record"
        );
        self.published = Some(PublishedRecord {
            name: self.config.display_name(),
            icon: trend::icon(trend, self.config.show_trend_icon),
            trend,
            record,
        });
        Ok(())
    }
}

/// Refresh every tracker concurrently. Failures are logged per instrument
/// and do not affect the other trackers.
pub async fn refresh_all(
    trackers: &mut [InstrumentTracker],
    source: &dyn QuoteSource,
    pb: &ProgressBar,
) {
    let futures = trackers.iter_mut().map(|tracker| async move {
        let name = tracker.display_name();
        let result = tracker.refresh(source).await;
        pb.inc(1);
        if let Err(e) = result {
            warn!(instrument = %name, error = %e, "Refresh cycle abandoned");
        }
    });
    join_all(futures).await;
}
