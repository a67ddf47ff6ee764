pub mod avanza;

// Re-export for providers to easily use cache
pub use crate::core::cache::Cache;
