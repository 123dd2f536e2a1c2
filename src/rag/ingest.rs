use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::chunker::{Chunk, TextChunker};
use super::embeddings::Embedder;
use crate::clean::clean_text;
use crate::document::Document;

const EMBED_BATCH: usize = 32;

pub fn chunk_documents(chunker: &TextChunker, docs: &[Document]) -> Vec<Chunk> {
    docs.iter().flat_map(|d| chunker.chunk_document(d)).collect()
}

/// Single-page ingestion: the whole page's visible text, no structure.
pub fn chunk_page(chunker: &TextChunker, url: &str, html: &str) -> Vec<Chunk> {
    chunker.chunk_text(url, None, &clean_text(html))
}

/// Embeds chunk texts in batches; output lines up with `chunks`.
pub async fn embed_chunks(embedder: &dyn Embedder, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} chunks ({per_sec})")?
            .progress_chars("=> "),
    );

    let mut vectors = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBED_BATCH) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        vectors.extend(embedder.embed(&texts).await?);
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();

    info!("Embedded {} chunks", vectors.len());
    Ok(vectors)
}
