//! Quote source abstraction

use crate::core::document::QuoteDocument;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_document(&self, orderbook_id: u32) -> Result<QuoteDocument>;
}
