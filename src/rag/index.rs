use super::chunker::Chunk;

/// In-memory vectors loaded from the store; search is a linear cosine scan.
#[derive(Default)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

#[derive(Debug)]
pub struct Hit<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

impl VectorIndex {
    pub fn push(&mut self, chunk: Chunk, vector: Vec<f32>) {
        self.entries.push((chunk, vector));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best `k` chunks, highest similarity first. Ties keep insertion order.
    pub fn top_k(&self, query: &[f32], k: usize) -> Vec<Hit<'_>> {
        let mut hits: Vec<Hit<'_>> = self
            .entries
            .iter()
            .map(|(chunk, vector)| Hit {
                chunk,
                score: cosine(query, vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        hits
    }
}

/// Vectors of different length compare over the shared prefix; a zero vector
/// scores 0.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
