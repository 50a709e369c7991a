use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use fastembed::{RerankInitOptions, RerankerModel, TextRerank};
use tracing::{debug, info};

use super::{RerankClient, RerankRequest, RerankResult};
use crate::error::CompressorError;

/// Cross-encoder reranker running locally through fastembed (ONNX Runtime).
pub struct LocalRanker {
    model: Mutex<TextRerank>,
    model_name: String,
}

impl LocalRanker {
    pub fn try_new(model_name: &str, cache_dir: &Path) -> Result<Self, CompressorError> {
        let model_enum = resolve_model(model_name)?;

        info!(
            "Loading local reranker model: {} (cache: {})",
            model_name,
            cache_dir.display()
        );
        let model = TextRerank::try_new(
            RerankInitOptions::new(model_enum)
                .with_cache_dir(cache_dir.to_path_buf())
                .with_show_download_progress(true),
        )
        .map_err(|e| CompressorError::ModelLoad {
            model: model_name.to_string(),
            source: anyhow::anyhow!(e),
        })?;

        Ok(Self {
            model: Mutex::new(model),
            model_name: model_name.to_string(),
        })
    }
}

impl RerankClient for LocalRanker {
    fn rerank(&self, request: &RerankRequest) -> Result<Vec<RerankResult>> {
        if request.passages.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Reranking {} passages with {}",
            request.passages.len(),
            self.model_name
        );

        let documents: Vec<&str> = request.passages.iter().map(|p| p.text.as_str()).collect();
        let mut model = self
            .model
            .lock()
            .map_err(|e| anyhow::anyhow!("Reranker model lock poisoned: {}", e))?;
        let scored = model
            .rerank(request.query.as_str(), documents, false, None)
            .context("Local reranking failed")?;

        // fastembed reports positions into `documents`, which mirror `passages`.
        let results = scored
            .into_iter()
            .filter_map(|r| {
                request.passages.get(r.index).map(|passage| RerankResult {
                    id: passage.id,
                    text: passage.text.clone(),
                    metadata: passage.metadata.clone(),
                    score: f64::from(r.score),
                })
            })
            .collect();

        Ok(results)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

// -- Model resolution --------------------------------------------------------

fn resolve_model(name: &str) -> Result<RerankerModel, CompressorError> {
    let supported = TextRerank::list_supported_models();
    supported
        .iter()
        .find(|info| model_code_matches(name, &info.model_code))
        .map(|info| info.model.clone())
        .ok_or_else(|| CompressorError::UnknownModel {
            model: name.to_string(),
            supported: supported
                .iter()
                .map(|info| info.model_code.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Match either the full model code or its last path segment, ignoring case.
fn model_code_matches(name: &str, code: &str) -> bool {
    let name = name.trim();
    if name.eq_ignore_ascii_case(code) {
        return true;
    }
    let tail = |s: &str| s.rsplit('/').next().unwrap_or(s).to_ascii_lowercase();
    !name.is_empty() && tail(name) == tail(code)
}
