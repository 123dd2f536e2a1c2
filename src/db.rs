use std::path::Path;

use rusqlite::Connection;

use crate::error::RagError;
use crate::rag::chunker::Chunk;
use crate::rag::index::VectorIndex;

pub const DB_FILE: &str = "index.sqlite";

pub fn connect(data_dir: &Path) -> Result<Connection, RagError> {
    std::fs::create_dir_all(data_dir)?;
    let conn = Connection::open(data_dir.join(DB_FILE))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<(), RagError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS chunks (
            id          INTEGER PRIMARY KEY,
            url         TEXT NOT NULL,
            title       TEXT,
            chunk_index INTEGER NOT NULL,
            text        TEXT NOT NULL,
            embedding   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(url, chunk_index)
        );
        CREATE INDEX IF NOT EXISTS idx_chunks_url ON chunks(url);
        ",
    )?;
    Ok(())
}

/// Stores chunks with their embeddings (as JSON arrays). Re-inserting a
/// `(url, chunk_index)` pair replaces the old row.
pub fn insert_chunks(
    conn: &Connection,
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
) -> Result<usize, RagError> {
    if chunks.len() != embeddings.len() {
        return Err(RagError::Embedding(format!(
            "{} chunks but {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }

    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO chunks (url, title, chunk_index, text, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let encoded = serde_json::to_string(embedding)?;
            count += stmt.execute(rusqlite::params![
                chunk.url,
                chunk.title,
                chunk.index as i64,
                chunk.text,
                encoded,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn clear(conn: &Connection) -> Result<usize, RagError> {
    Ok(conn.execute("DELETE FROM chunks", [])?)
}

pub fn load_index(conn: &Connection) -> Result<VectorIndex, RagError> {
    let mut stmt =
        conn.prepare("SELECT url, title, chunk_index, text, embedding FROM chunks ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            let index: i64 = row.get(2)?;
            let chunk = Chunk {
                url: row.get(0)?,
                title: row.get(1)?,
                index: index as usize,
                text: row.get(3)?,
            };
            let embedding: String = row.get(4)?;
            Ok((chunk, embedding))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut index = VectorIndex::default();
    for (chunk, embedding) in rows {
        let vector: Vec<f32> = serde_json::from_str(&embedding)?;
        index.push(chunk, vector);
    }
    Ok(index)
}

// ── Stats ──

pub struct Stats {
    pub chunks: usize,
    pub pages: usize,
    pub last_indexed: Option<String>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats, RagError> {
    let chunks: usize = conn.query_row("SELECT COUNT(*) FROM chunks", [], |r| r.get(0))?;
    let pages: usize =
        conn.query_row("SELECT COUNT(DISTINCT url) FROM chunks", [], |r| r.get(0))?;
    let last_indexed: Option<String> =
        conn.query_row("SELECT MAX(created_at) FROM chunks", [], |r| r.get(0))?;
    Ok(Stats {
        chunks,
        pages,
        last_indexed,
    })
}
