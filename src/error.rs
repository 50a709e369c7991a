use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressorError {
    #[error("{capability} is not available. {remedy}")]
    MissingDependency {
        capability: &'static str,
        remedy: &'static str,
    },

    #[error("unsupported reranker model '{model}' (supported: {supported})")]
    UnknownModel { model: String, supported: String },

    #[error("failed to load reranker model '{model}': {source}")]
    ModelLoad {
        model: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CompressorError {
    /// True for errors raised while validating configuration, before any model is touched.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            CompressorError::MissingDependency { .. }
                | CompressorError::UnknownModel { .. }
                | CompressorError::Toml(_)
                | CompressorError::Json(_)
        )
    }
}
