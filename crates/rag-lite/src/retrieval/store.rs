//! Persistent vector collection: SQLite for the records, HNSW for search

use parking_lot::{Mutex, RwLock};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::ChunkMetadata;

use super::index::{IndexEntry, SearchHit, VectorIndex};

/// The single named collection of stored records
///
/// Lifecycle: [`VectorStore::open`] at startup, [`VectorStore::clear`] to drop
/// and recreate the collection, [`VectorStore::close`] at shutdown.
///
/// Records are persisted in SQLite and mirrored into an in-memory
/// [`VectorIndex`]. `search` and `count` only touch the index and run in
/// parallel; `add` serialises on the write connection. `clear` and `close`
/// take the outer lock exclusively, so nothing observes the collection while
/// it is being recreated.
pub struct VectorStore {
    /// Collection (table) name
    collection: String,
    /// Database file, `None` when in memory
    path: Option<PathBuf>,
    /// Open collection; `None` once closed
    state: RwLock<Option<Collection>>,
}

struct Collection {
    /// Write connection
    conn: Mutex<Connection>,
    /// Search index mirroring the table
    index: VectorIndex,
}

impl VectorStore {
    /// Create or open the collection in the SQLite file at `path`
    pub fn open<P: AsRef<Path>>(path: P, collection: &str) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::vector_db(format!("Failed to open database: {}", e)))?;
        let store = Self::with_connection(conn, collection, Some(path.to_path_buf()))?;

        tracing::info!(
            "Vector store opened at {} (collection '{}', {} records)",
            path.display(),
            collection,
            store.count()?
        );
        Ok(store)
    }

    /// Create an in-memory collection (for tests and ephemeral runs)
    pub fn open_in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::vector_db(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn, collection, None)
    }

    fn with_connection(conn: Connection, collection: &str, path: Option<PathBuf>) -> Result<Self> {
        if collection.is_empty()
            || !collection.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::Config(format!("Invalid collection name '{}'", collection)));
        }

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            "#,
        )
        .map_err(|e| Error::vector_db(format!("Failed to set pragmas: {}", e)))?;
        conn.execute_batch(&create_table_sql(collection))?;

        let index = VectorIndex::from_entries(load_entries(&conn, collection)?);

        Ok(Self {
            collection: collection.to_string(),
            path,
            state: RwLock::new(Some(Collection {
                conn: Mutex::new(conn),
                index,
            })),
        })
    }

    /// Collection name
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Database file, if persisted
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether [`VectorStore::close`] has not been called yet
    pub fn is_open(&self) -> bool {
        self.state.read().is_some()
    }

    /// Upsert one record per position of the three parallel lists.
    ///
    /// Empty or mismatched lists, and vectors whose dimension differs from each
    /// other or from the stored ones, are rejected without writing anything.
    /// Returns the number of records written.
    pub fn add(
        &self,
        texts: &[String],
        embeddings: &[Vec<f32>],
        metadatas: &[ChunkMetadata],
    ) -> Result<usize> {
        if texts.is_empty() || embeddings.is_empty() || metadatas.is_empty() {
            tracing::warn!("Empty lists provided to add; nothing stored");
            return Err(Error::InvalidInput("empty lists provided to add".to_string()));
        }
        if texts.len() != embeddings.len() || texts.len() != metadatas.len() {
            tracing::warn!(
                "Mismatched lengths in add. Texts: {}, Embeddings: {}, Metadatas: {}",
                texts.len(),
                embeddings.len(),
                metadatas.len()
            );
            return Err(Error::InvalidInput(format!(
                "mismatched lengths: {} texts, {} embeddings, {} metadatas",
                texts.len(),
                embeddings.len(),
                metadatas.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 || embeddings.iter().any(|e| e.len() != dimension) {
            return Err(Error::InvalidInput(
                "embeddings must be non-empty and of equal dimension".to_string(),
            ));
        }

        let guard = self.state.read();
        let collection = guard.as_ref().ok_or_else(closed)?;
        let mut conn = collection.conn.lock();

        if let Some(stored) = collection.index.dimension() {
            if stored != dimension {
                return Err(Error::InvalidInput(format!(
                    "embedding dimension {} does not match collection dimension {}",
                    dimension, stored
                )));
            }
        }

        let entries: Vec<IndexEntry> = texts
            .iter()
            .zip(embeddings)
            .zip(metadatas)
            .map(|((text, embedding), meta)| IndexEntry {
                id: meta.record_id(),
                text: text.clone(),
                metadata: meta.clone(),
                embedding: embedding.clone(),
            })
            .collect();

        let created_at = chrono::Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                r#"INSERT INTO "{}" (id, embedding, dimension, document, filename, chunk_index, created_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                   ON CONFLICT(id) DO UPDATE SET
                       embedding = excluded.embedding,
                       dimension = excluded.dimension,
                       document = excluded.document,
                       filename = excluded.filename,
                       chunk_index = excluded.chunk_index,
                       created_at = excluded.created_at"#,
                self.collection
            ))?;

            for entry in &entries {
                stmt.execute(params![
                    entry.id,
                    serde_json::to_string(&entry.embedding)?,
                    dimension as i64,
                    entry.text,
                    entry.metadata.filename,
                    entry.metadata.chunk_index as i64,
                    created_at,
                ])?;
            }
        }
        tx.commit()?;

        let written = entries.len();
        // Still under the write connection lock, so index writers stay ordered
        collection.index.upsert(entries);

        tracing::info!(
            "Added {} embeddings to collection '{}'",
            written,
            self.collection
        );
        Ok(written)
    }

    /// Texts of the `k` records nearest to `query`, nearest first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<String>> {
        Ok(self
            .search_with_distance(query, k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// The `k` records nearest to `query` by squared L2 distance, nearest first.
    ///
    /// Ties are broken by record id. An empty query, `k == 0` or an empty
    /// collection give an empty result.
    pub fn search_with_distance(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.is_empty() {
            tracing::warn!("No query embedding provided");
            return Ok(Vec::new());
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let guard = self.state.read();
        let index = &guard.as_ref().ok_or_else(closed)?.index;

        if let Some(dimension) = index.dimension() {
            if dimension != query.len() {
                tracing::warn!(
                    "Query dimension {} differs from collection dimension {}",
                    query.len(),
                    dimension
                );
            }
        }

        let hits = index.search(query, k);
        tracing::debug!("Found {} similar chunks", hits.len());
        Ok(hits)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        let guard = self.state.read();
        Ok(guard.as_ref().ok_or_else(closed)?.index.len())
    }

    /// Drop the collection and recreate it empty, atomically
    pub fn clear(&self) -> Result<()> {
        let mut guard = self.state.write();
        let collection = guard.as_mut().ok_or_else(closed)?;
        let conn = collection.conn.get_mut();

        tracing::info!("Clearing vector store by deleting collection '{}'", self.collection);
        let tx = conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS \"{}\";\n{}",
            self.collection,
            create_table_sql(&self.collection)
        ))?;
        tx.commit()?;
        collection.index.clear();

        tracing::info!("Collection '{}' cleared and recreated", self.collection);
        Ok(())
    }

    /// Close the underlying connection; later operations fail
    pub fn close(&self) -> Result<()> {
        let taken = self.state.write().take();
        if let Some(collection) = taken {
            collection
                .conn
                .into_inner()
                .close()
                .map_err(|(_, e)| Error::vector_db(format!("Failed to close database: {}", e)))?;
            tracing::info!("Vector store '{}' closed", self.collection);
        }
        Ok(())
    }
}

fn closed() -> Error {
    Error::vector_db("vector store is closed")
}

fn create_table_sql(collection: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{0}" (
            id TEXT PRIMARY KEY,
            embedding TEXT NOT NULL,
            dimension INTEGER NOT NULL,
            document TEXT NOT NULL,
            filename TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS "idx_{0}_filename" ON "{0}"(filename);
        "#,
        collection
    )
}

/// Read every stored record for the search index
fn load_entries(conn: &Connection, collection: &str) -> Result<Vec<IndexEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, embedding, document, filename, chunk_index FROM \"{}\"",
        collection
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, i64>(4)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, embedding, text, filename, chunk_index) = row?;
        entries.push(IndexEntry {
            id,
            text,
            metadata: ChunkMetadata::new(filename, chunk_index as usize),
            embedding: serde_json::from_str(&embedding)?,
        });
    }
    Ok(entries)
}
