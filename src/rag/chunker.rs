use crate::document::Document;

/// A window of one document's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub url: String,
    pub title: Option<String>,
    pub index: usize,
    pub text: String,
}

/// Fixed-size character windows with overlap. Sizes count `char`s, so
/// multi-byte text is never split inside a code point.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }

    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.chunk_text(&doc.url, doc.title.clone(), &doc.plain_text())
    }

    pub fn chunk_text(&self, url: &str, title: Option<String>, text: &str) -> Vec<Chunk> {
        self.split(text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk {
                url: url.to_string(),
                title: title.clone(),
                index,
                text,
            })
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(100, 10)
    }
}
