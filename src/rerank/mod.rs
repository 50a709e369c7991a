use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::document::Metadata;
use crate::error::CompressorError;

// -- Request / response types ------------------------------------------------

/// One document as submitted to the reranker. `id` is the document's position in the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: usize,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankRequest {
    pub query: String,
    pub passages: Vec<Passage>,
}

/// A scored passage returned by the reranker. `id` correlates with [`Passage::id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    pub id: usize,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub score: f64,
}

// -- RerankClient trait ------------------------------------------------------

/// Synchronous reranking client.
///
/// Implementations return results ordered by descending relevance; callers
/// rely on that order and do not re-sort.
pub trait RerankClient: Send + Sync {
    fn rerank(&self, request: &RerankRequest) -> Result<Vec<RerankResult>>;
    fn name(&self) -> &str;
}

// -- Factory -----------------------------------------------------------------

/// Build the local reranking client from settings.
///
/// Fails with [`CompressorError::MissingDependency`] when the crate was built
/// without the `local` feature.
pub fn create_client(settings: &Settings) -> Result<Arc<dyn RerankClient>, CompressorError> {
    #[cfg(feature = "local")]
    {
        let ranker = local::LocalRanker::try_new(&settings.model, &settings.cache_dir)?;
        Ok(Arc::new(ranker))
    }
    #[cfg(not(feature = "local"))]
    {
        tracing::debug!(
            "Cannot build reranker for model '{}': 'local' feature disabled",
            settings.model
        );
        Err(CompressorError::MissingDependency {
            capability: "Local reranker (fastembed)",
            remedy: "Rebuild with the 'local' feature enabled: `cargo build --features local`, \
                     or supply a pre-built RerankClient.",
        })
    }
}

#[cfg(feature = "local")]
pub mod local;
