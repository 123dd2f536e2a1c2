use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "docs_rag";
const ENV_PREFIX: &str = "DOCS_RAG";

/// Runtime settings. Sources, later ones winning: built-in defaults, an
/// optional `docs_rag.toml`, then `DOCS_RAG_*` environment variables (a
/// `.env` file is loaded first).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub start_path: String,
    pub stop_path: String,
    pub data_dir: PathBuf,
    pub content_selector: String,
    pub normalize_highlight: bool,

    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,

    pub embed_base_url: String,
    pub embed_model: String,
    pub embed_api_key: Option<String>,

    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,

    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://fastapi.tiangolo.com/".into(),
            start_path: "python-types/".into(),
            stop_path: "how-to/authentication-error-status-code/".into(),
            data_dir: PathBuf::from("data"),
            content_selector: "div.md-content".into(),
            normalize_highlight: false,
            chunk_size: 100,
            chunk_overlap: 10,
            top_k: crate::rag::DEFAULT_TOP_K,
            embed_base_url: "http://localhost:11434/v1".into(),
            embed_model: "nomic-embed-text".into(),
            embed_api_key: None,
            llm_base_url: "https://api.groq.com/openai/v1".into(),
            llm_model: "llama-3.1-8b-instant".into(),
            llm_api_key: None,
            bind: "127.0.0.1:8000".into(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some(CONFIG_FILE), Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(file: Option<&str>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }
        builder
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn urls_path(&self) -> PathBuf {
        self.data_dir.join("urls.json")
    }

    pub fn documents_path(&self) -> PathBuf {
        self.data_dir.join("documents.json")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn defaults_without_sources() {
        let s = Settings::from_sources(None, env(&[])).unwrap();
        assert_eq!(s.start_path, "python-types/");
        assert_eq!((s.chunk_size, s.chunk_overlap, s.top_k), (100, 10, 2));
        assert_eq!(s.llm_model, "llama-3.1-8b-instant");
        assert!(s.llm_api_key.is_none());
        assert_eq!(s.documents_path(), PathBuf::from("data/documents.json"));
    }

    #[test]
    fn env_overrides() {
        let s = Settings::from_sources(
            None,
            env(&[
                ("DOCS_RAG_TOP_K", "5"),
                ("DOCS_RAG_DATA_DIR", "/tmp/rag"),
                ("DOCS_RAG_NORMALIZE_HIGHLIGHT", "true"),
                ("DOCS_RAG_LLM_API_KEY", "gsk_test"),
            ]),
        )
        .unwrap();
        assert_eq!(s.top_k, 5);
        assert!(s.normalize_highlight);
        assert_eq!(s.urls_path(), PathBuf::from("/tmp/rag/urls.json"));
        assert_eq!(s.llm_api_key.as_deref(), Some("gsk_test"));
    }
}
