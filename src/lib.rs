pub mod compressor;
pub mod config;
pub mod document;
pub mod error;
pub mod rerank;

pub use compressor::{DocumentCompressor, RerankCompressor, ID_KEY, RELEVANCE_SCORE_KEY};
pub use config::{CompressorConfig, Settings};
pub use document::{Document, Metadata};
pub use error::CompressorError;
pub use rerank::{create_client, Passage, RerankClient, RerankRequest, RerankResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
