use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::document::QuoteDocument;
use crate::core::source::QuoteSource;

// AvanzaProvider implementation for QuoteSource
//
// Fetches the market-guide document for an orderbook id. Stocks and ETFs
// share the section shapes, but ETF-specific fields only appear on the etf
// endpoint, so a document declaring an exchange-traded fund is requeried
// there.
pub struct AvanzaProvider {
    base_url: String,
    cache: Arc<Cache<u32, QuoteDocument>>,
}

impl AvanzaProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<u32, QuoteDocument>>) -> Self {
        AvanzaProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }

    async fn fetch_endpoint(&self, kind: &str, orderbook_id: u32) -> Result<QuoteDocument> {
        let url = format!("{}/_api/market-guide/{kind}/{orderbook_id}", self.base_url);
        debug!("Requesting quote document from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("kursvakt/0.1")
            .build()?;
        let response = client.get(&url).send().await.map_err(|e| {
            anyhow!("Request error: {} for instrument: {} URL: {}", e, orderbook_id, url)
        })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for instrument: {}",
                response.status(),
                orderbook_id
            ));
        }

        let value = response.json::<Value>().await.map_err(|e| {
            anyhow!("Failed to parse response for instrument {}: {}", orderbook_id, e)
        })?;
        QuoteDocument::from_value(value)
    }
}

#[async_trait]
impl QuoteSource for AvanzaProvider {
    #[instrument(
        name = "AvanzaQuoteFetch",
        skip(self),
        fields(orderbook_id = %orderbook_id)
    )]
    async fn fetch_document(&self, orderbook_id: u32) -> Result<QuoteDocument> {
        if let Some(cached) = self.cache.get(&orderbook_id).await {
            return Ok(cached);
        }

        let doc = self.fetch_endpoint("stock", orderbook_id).await?;
        let doc = if doc.is_etf() {
            debug!("Instrument {} is an ETF, requerying etf endpoint", orderbook_id);
            self.fetch_endpoint("etf", orderbook_id).await?
        } else {
            doc
        };

        self.cache.put(orderbook_id, doc.clone()).await;
        Ok(doc)
    }
}
