//! siebwerk - German news-corpus cleaning and dedup pipeline
//!
//! Turns archives of scraped German-language news articles into a
//! deduplicated training corpus: encoding repair, lexical normalization,
//! content fingerprinting, an insert-or-increment store, and a seeded,
//! reproducible export.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`encoding`] - Mojibake detection and Windows-1252 round-trip repair
//! - [`normalize`] - The ordered lexical normalizer
//! - [`segment`] - Sentence splitting for the raw-sentence layer
//! - [`fingerprint`] - Content fingerprints over canonical text
//! - [`storage`] - The dedup/counting store (SQLite, plus a mock)
//! - [`pipeline`] - Worker pool driving the cleaning phases
//! - [`corpus`] - Seeded training-corpus export
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use siebwerk::corpus::{export, ExportOptions};
//! use siebwerk::normalize::NormalizeOptions;
//! use siebwerk::pipeline::{Pipeline, PipelineConfig};
//! use siebwerk::storage::sqlite_factory;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let factory = sqlite_factory("data/siebwerk.db");
//!     let pipeline = Pipeline::new(PipelineConfig::default());
//!     pipeline
//!         .clean_articles(factory.clone(), NormalizeOptions::corpus_defaults())
//!         .await?;
//!     export(&factory()?, &ExportOptions::default(), "corpus.txt")?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod encoding;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod segment;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::corpus::{export, ExportOptions};
    pub use crate::error::{Error, Result};
    pub use crate::fingerprint::fingerprint;
    pub use crate::models::{Article, CanonicalTextRecord, RawSentenceRecord, StoreStats};
    pub use crate::normalize::{normalize, NormalizeOptions};
    pub use crate::pipeline::{Pipeline, PipelineConfig};
    pub use crate::storage::{CorpusRepository, RepositoryFactory, SharedCorpusRepository};
}

// Direct re-exports for convenience
pub use models::{Article, CanonicalTextRecord, RawSentenceRecord, StoreStats};
