use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RagError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, RagError> {
        self.embed(&[input.to_string()])
            .await?
            .pop()
            .ok_or_else(|| RagError::Embedding("empty embedding response".into()))
    }
}

/// Client for an OpenAI-compatible `/embeddings` endpoint (OpenAI, Ollama,
/// text-embeddings-inference, ...).
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&EmbeddingRequest {
                model: &self.model,
                input: inputs,
            });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("HTTP {}: {}", status, body)));
        }
        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("bad response: {}", e)))?;

        debug!(inputs = inputs.len(), model = %self.model, "embedded");
        into_ordered(parsed.data, inputs.len())
    }
}

fn into_ordered(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>, RagError> {
    if data.len() != expected {
        return Err(RagError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_reordered_by_index() {
        let data = vec![
            EmbeddingData { index: 1, embedding: vec![2.0] },
            EmbeddingData { index: 0, embedding: vec![1.0] },
        ];
        assert_eq!(into_ordered(data, 2).unwrap(), vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn count_mismatch() {
        let data = vec![EmbeddingData { index: 0, embedding: vec![1.0] }];
        assert!(matches!(into_ordered(data, 2), Err(RagError::Embedding(_))));
    }

    #[test]
    fn request_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbeddingRequest { model: "m", input: &input }).unwrap();
        assert_eq!(body, serde_json::json!({ "model": "m", "input": ["a", "b"] }));
    }

    #[tokio::test]
    async fn embed_one_uses_batch() {
        let v = testing::LetterEmbedder.embed_one("abba").await.unwrap();
        assert_eq!(v[0], 2.0);
        assert_eq!(v[1], 2.0);
    }
}
