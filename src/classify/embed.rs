//! Text embedding backends.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::EmbedError;

/// Turns text into a dense vector. Shared read-only across worker threads.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

// ── Token hash ──

pub const TOKEN_HASH_DIM: usize = 256;

/// Deterministic offline embedding: signed FNV-1a buckets over word tokens,
/// L2-normalized. Text with no tokens maps to the zero vector.
#[derive(Debug, Clone)]
pub struct TokenHashEmbedder {
    dim: usize,
}

impl TokenHashEmbedder {
    pub fn new(dim: usize) -> Self {
        TokenHashEmbedder { dim: dim.max(1) }
    }
}

impl Default for TokenHashEmbedder {
    fn default() -> Self {
        TokenHashEmbedder::new(TOKEN_HASH_DIM)
    }
}

fn fnv1a64(s: &str) -> u64 {
    let mut h: u64 = 14695981039346656037;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    h
}

impl Embedder for TokenHashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut v = vec![0.0f32; self.dim];
        let lower = text.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let h = fnv1a64(token);
            let idx = (h % self.dim as u64) as usize;
            let sign = if (h >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }
}

// ── Ollama ──

/// Embeddings from an Ollama server. Prefers the batched `/api/embed`
/// endpoint and falls back to per-item `/api/embeddings` on older servers.
pub struct OllamaEmbedder {
    host: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct EmbedResp {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct EmbeddingsResp {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(host: &str, model: &str, timeout: Duration) -> Result<Self, EmbedError> {
        let host = normalize_host(host);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbedError::Http { url: host.clone(), message: e.to_string() })?;
        Ok(OllamaEmbedder { host, model: model.to_string(), client })
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::blocking::Response, EmbedError> {
        self.client
            .post(url)
            .json(body)
            .send()
            .map_err(|e| EmbedError::Http { url: url.to_string(), message: e.to_string() })
    }

    fn embed_legacy(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let url = format!("{}/api/embeddings", self.host);
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            let body = serde_json::json!({ "model": self.model, "prompt": text });
            let resp = self.post(&url, &body)?;
            if !resp.status().is_success() {
                let status = resp.status();
                let message = resp.text().unwrap_or_default();
                return Err(EmbedError::Http { url, message: format!("{status}: {message}") });
            }
            let r: EmbeddingsResp = resp.json().map_err(|e| EmbedError::Shape(e.to_string()))?;
            out.push(r.embedding);
        }
        Ok(out)
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| EmbedError::Shape("no embedding returned".into()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/api/embed", self.host);
        let body = serde_json::json!({ "model": self.model, "input": texts, "truncate": true });
        let resp = self.post(&url, &body)?;
        if !resp.status().is_success() {
            debug!(status = %resp.status(), "/api/embed unavailable, using /api/embeddings");
            return self.embed_legacy(texts);
        }
        let out: EmbedResp = resp.json().map_err(|e| EmbedError::Shape(e.to_string()))?;
        if out.embeddings.len() != texts.len() {
            return Err(EmbedError::Shape(format!(
                "{} embeddings for {} inputs",
                out.embeddings.len(),
                texts.len()
            )));
        }
        Ok(out.embeddings)
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

// ── Tests ──
