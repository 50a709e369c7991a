use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{CompressorConfig, Settings};
use crate::document::Document;
use crate::error::CompressorError;
use crate::rerank::{create_client, Passage, RerankClient, RerankRequest};

/// Metadata key holding the document's position in the compressor input.
pub const ID_KEY: &str = "id";
/// Metadata key holding the reranker's relevance score.
pub const RELEVANCE_SCORE_KEY: &str = "relevance_score";

// -- DocumentCompressor trait ------------------------------------------------

/// Post-retrieval step that narrows a candidate list for a query.
pub trait DocumentCompressor: Send + Sync {
    fn compress_documents(&self, documents: &[Document], query: &str) -> Result<Vec<Document>>;
}

// -- RerankCompressor --------------------------------------------------------

/// Reorders documents with a [`RerankClient`] and keeps the top `top_n`.
pub struct RerankCompressor {
    client: Arc<dyn RerankClient>,
    settings: Settings,
}

impl RerankCompressor {
    /// Build the default local client from `settings`.
    pub fn new(settings: Settings) -> Result<Self, CompressorError> {
        let client = create_client(&settings)?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: Arc<dyn RerankClient>, settings: Settings) -> Self {
        Self { client, settings }
    }

    /// Resolve `config` against defaults, then use `client` or construct one.
    pub fn from_config(
        config: CompressorConfig,
        client: Option<Arc<dyn RerankClient>>,
    ) -> Result<Self, CompressorError> {
        let settings = config.into_settings();
        match client {
            Some(client) => Ok(Self::with_client(client, settings)),
            None => Self::new(settings),
        }
    }

    pub fn top_n(&self) -> usize {
        self.settings.top_n
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn cache_dir(&self) -> &Path {
        &self.settings.cache_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &Arc<dyn RerankClient> {
        &self.client
    }
}

impl DocumentCompressor for RerankCompressor {
    fn compress_documents(&self, documents: &[Document], query: &str) -> Result<Vec<Document>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let request = RerankRequest {
            query: query.to_string(),
            passages: documents
                .iter()
                .enumerate()
                .map(|(id, doc)| Passage {
                    id,
                    text: doc.page_content.clone(),
                    metadata: doc.metadata.clone(),
                })
                .collect(),
        };

        debug!(
            "Reranking {} documents with {} (top_n={})",
            documents.len(),
            self.client.name(),
            self.settings.top_n
        );

        // N = 0 still goes through the client.
        let results = self.client.rerank(&request)?;

        let compressed: Vec<Document> = results
            .into_iter()
            .take(self.settings.top_n)
            .map(|r| {
                let mut metadata = match documents.get(r.id) {
                    Some(original) => original.metadata.clone(),
                    None => {
                        warn!(
                            "Reranker returned id {} outside of {} input documents",
                            r.id,
                            documents.len()
                        );
                        r.metadata
                    }
                };
                metadata.insert(ID_KEY.to_string(), Value::from(r.id));
                metadata.insert(RELEVANCE_SCORE_KEY.to_string(), Value::from(r.score));
                Document::with_metadata(r.text, metadata)
            })
            .collect();

        debug!("Reranking kept {} documents", compressed.len());
        Ok(compressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rerank::RerankResult;

    struct ReverseClient;

    impl RerankClient for ReverseClient {
        fn rerank(&self, request: &RerankRequest) -> Result<Vec<RerankResult>> {
            let n = request.passages.len();
            Ok(request
                .passages
                .iter()
                .rev()
                .enumerate()
                .map(|(rank, p)| RerankResult {
                    id: p.id,
                    text: p.text.clone(),
                    metadata: p.metadata.clone(),
                    score: (n - rank) as f64 / n as f64,
                })
                .collect())
        }

        fn name(&self) -> &str {
            "reverse"
        }
    }

    fn compressor(top_n: usize) -> RerankCompressor {
        RerankCompressor::with_client(
            Arc::new(ReverseClient),
            Settings::default().with_top_n(top_n),
        )
    }

    #[test]
    fn test_accessors() {
        let c = compressor(4);
        assert_eq!(c.top_n(), 4);
        assert_eq!(c.model(), crate::config::DEFAULT_MODEL_NAME);
        assert_eq!(c.cache_dir(), std::env::temp_dir().as_path());
        assert_eq!(c.client().name(), "reverse");
    }

    #[test]
    fn test_reverse_client_order_kept() {
        let docs = vec![Document::new("a"), Document::new("b"), Document::new("c")];
        let out = compressor(2).compress_documents(&docs, "q").unwrap();
        let texts: Vec<&str> = out.iter().map(|d| d.page_content.as_str()).collect();
        assert_eq!(texts, vec!["c", "b"]);
        assert_eq!(out[0].metadata[ID_KEY], 2);
        assert_eq!(out[1].metadata[ID_KEY], 1);
    }

    #[test]
    fn test_from_config_with_injected_client() {
        let cfg = CompressorConfig::from_toml_str("top_n = 1\nmodel = \"custom\"").unwrap();
        let client: Arc<dyn RerankClient> = Arc::new(ReverseClient);
        let c = RerankCompressor::from_config(cfg, Some(client)).unwrap();
        assert_eq!(c.top_n(), 1);
        assert_eq!(c.model(), "custom");
    }

    #[cfg(not(feature = "local"))]
    #[test]
    fn test_new_without_local_feature_fails() {
        let err = match RerankCompressor::new(Settings::default()) {
            Ok(_) => panic!("construction should fail without a client"),
            Err(e) => e,
        };
        assert!(matches!(err, CompressorError::MissingDependency { .. }));
    }
}
