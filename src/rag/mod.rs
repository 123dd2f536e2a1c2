pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod llm;

use tracing::{debug, info};

use crate::error::RagError;
use embeddings::Embedder;
use index::VectorIndex;
use llm::ChatModel;

pub const DEFAULT_TOP_K: usize = 2;

/// Fills the fixed instruction template in a single pass, so braces in the
/// retrieved context are left untouched.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant. Use the context provided to answer the question accurately. \
         Only use this context, not your knowledge. If you dont get relavant context say, I don't know.\n\n\
         context:{}question:{}",
        context, question
    )
}

/// Question answering over a loaded index.
pub struct Rag {
    embedder: Box<dyn Embedder>,
    chat: Box<dyn ChatModel>,
    index: VectorIndex,
    top_k: usize,
}

impl Rag {
    pub fn new(
        embedder: Box<dyn Embedder>,
        chat: Box<dyn ChatModel>,
        index: VectorIndex,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            chat,
            index,
            top_k: top_k.max(1),
        }
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Texts of the closest chunks, joined by blank lines.
    pub async fn retrieve(&self, query: &str) -> Result<String, RagError> {
        if self.index.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        let vector = self.embedder.embed_one(query).await?;
        let hits = self.index.top_k(&vector, self.top_k);
        for hit in &hits {
            debug!(url = %hit.chunk.url, chunk = hit.chunk.index, score = hit.score, "retrieved");
        }
        Ok(hits
            .iter()
            .map(|h| h.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// `None` when the user typed `exit`.
    pub async fn answer(&self, query: &str) -> Result<Option<String>, RagError> {
        if query.trim().eq_ignore_ascii_case("exit") {
            return Ok(None);
        }
        let context = self.retrieve(query).await?;
        let reply = self.chat.complete(&build_prompt(&context, query)).await?;
        info!(query, "answered");
        Ok(Some(format!("Answer : {}", reply)))
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::chunker::Chunk;
    use super::embeddings::testing::{letters, LetterEmbedder};
    use super::testing::ScriptedChat;
    use super::*;

    fn index_of(texts: &[&str]) -> VectorIndex {
        let mut index = VectorIndex::default();
        for (i, t) in texts.iter().enumerate() {
            index.push(
                Chunk {
                    url: "https://d.io/".into(),
                    title: None,
                    index: i,
                    text: t.to_string(),
                },
                letters(t),
            );
        }
        index
    }

    #[test]
    fn prompt_embeds_context_and_question() {
        let p = build_prompt("CTX", "Q?");
        assert!(p.starts_with("You are a helpful assistant."));
        assert!(p.ends_with("\n\ncontext:CTXquestion:Q?"));
        assert!(p.contains("I don't know."));
    }

    #[test]
    fn prompt_keeps_braces_in_context() {
        let p = build_prompt("use {question} and {context} here", "Q?");
        assert!(p.ends_with("context:use {question} and {context} herequestion:Q?"));
    }

    #[tokio::test]
    async fn exit_yields_nothing() {
        let chat = Arc::new(ScriptedChat::replying("unused"));
        let rag = Rag::new(Box::new(LetterEmbedder), Box::new(chat.clone()), index_of(&["x"]), 2);
        assert_eq!(rag.answer("exit").await.unwrap(), None);
        assert_eq!(rag.answer("  EXIT ").await.unwrap(), None);
        assert!(chat.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn answer_uses_top_k_context() {
        let chat = Arc::new(ScriptedChat::replying("42"));
        let rag = Rag::new(
            Box::new(LetterEmbedder),
            Box::new(chat.clone()),
            index_of(&["zzzz", "aaab", "aabb"]),
            2,
        );

        let answer = rag.answer("aaaa").await.unwrap();
        assert_eq!(answer.as_deref(), Some("Answer : 42"));

        let prompts = chat.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("context:aaab\n\naabbquestion:aaaa"));
    }

    #[tokio::test]
    async fn empty_index_is_an_error() {
        let rag = Rag::new(
            Box::new(LetterEmbedder),
            Box::new(ScriptedChat::replying("x")),
            VectorIndex::default(),
            2,
        );
        assert!(matches!(rag.answer("hi").await, Err(RagError::EmptyIndex)));
    }
}
