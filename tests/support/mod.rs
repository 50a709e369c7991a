//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use rerank_compressor::{
    Document, Metadata, RerankClient, RerankCompressor, RerankRequest, RerankResult, Settings,
};
use serde_json::Value;

/// Error type a failing client raises, so tests can check it is passed through untouched.
#[derive(Debug, thiserror::Error)]
#[error("model server unavailable (status {status})")]
pub struct ClientFailure {
    pub status: u16,
}

enum Reply {
    Results(Vec<RerankResult>),
    Fail(u16),
}

/// A `RerankClient` returning a canned response and recording every request.
pub struct MockClient {
    reply: Reply,
    requests: Mutex<Vec<RerankRequest>>,
}

impl MockClient {
    pub fn returning(results: Vec<RerankResult>) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Results(results),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail(status),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RerankRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl RerankClient for MockClient {
    fn rerank(&self, request: &RerankRequest) -> Result<Vec<RerankResult>> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Results(results) => Ok(results.clone()),
            Reply::Fail(status) => Err(ClientFailure { status: *status }.into()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

pub fn compressor(client: Arc<MockClient>, top_n: usize) -> RerankCompressor {
    RerankCompressor::with_client(client, Settings::default().with_top_n(top_n))
}

pub fn entry(id: usize, text: &str, score: f64) -> RerankResult {
    RerankResult {
        id,
        text: text.to_string(),
        metadata: Metadata::new(),
        score,
    }
}

pub fn doc(text: &str, pairs: &[(&str, Value)]) -> Document {
    let metadata: Metadata = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    Document::with_metadata(text, metadata)
}

pub fn plain_docs(texts: &[&str]) -> Vec<Document> {
    texts.iter().map(|t| Document::new(*t)).collect()
}
