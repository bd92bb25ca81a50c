//! HNSW nearest-neighbour index over the stored records, using instant-distance
//!
//! Readers search an immutable snapshot; a write builds a new snapshot and
//! swaps it in, so searches never wait on a graph rebuild.

use instant_distance::{Builder, HnswMap, Point, Search};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::ChunkMetadata;

/// A nearest-neighbor match
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Record id (`{filename}_chunk{index}`)
    pub id: String,
    /// Stored chunk text
    pub text: String,
    /// Stored metadata
    pub metadata: ChunkMetadata,
    /// Squared L2 distance to the query
    pub distance: f32,
}

/// One record as held by the index
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Record id
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Chunk metadata
    pub metadata: ChunkMetadata,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

#[derive(Clone, Debug)]
struct EmbeddingPoint(Vec<f32>);

impl Point for EmbeddingPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Squared L2
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

#[derive(Default)]
struct Snapshot {
    entries: Vec<IndexEntry>,
    hnsw: Option<HnswMap<EmbeddingPoint, usize>>,
}

impl Snapshot {
    fn build(entries: Vec<IndexEntry>) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let points = entries
            .iter()
            .map(|e| EmbeddingPoint(e.embedding.clone()))
            .collect();
        let values = (0..entries.len()).collect();
        let hnsw = Builder::default().build(points, values);

        Self {
            entries,
            hnsw: Some(hnsw),
        }
    }

    fn dimension(&self) -> Option<usize> {
        self.entries.first().map(|e| e.embedding.len())
    }
}

/// Vector index with snapshot reads
///
/// Writers (`upsert`, `clear`) must be serialised by the caller; readers may
/// run concurrently with each other and with a writer.
pub struct VectorIndex {
    current: RwLock<Arc<Snapshot>>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("len", &self.len())
            .field("dimension", &self.dimension())
            .finish()
    }
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Build an index over entries with unique ids
    pub fn from_entries(entries: Vec<IndexEntry>) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::build(entries))),
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read())
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.snapshot().entries.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of the indexed vectors, if any are stored
    pub fn dimension(&self) -> Option<usize> {
        self.snapshot().dimension()
    }

    /// Insert or replace entries by id, then rebuild the graph
    pub fn upsert(&self, incoming: Vec<IndexEntry>) {
        let mut entries = self.snapshot().entries.clone();
        let mut positions: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();

        for entry in incoming {
            match positions.get(&entry.id) {
                Some(&i) => entries[i] = entry,
                None => {
                    positions.insert(entry.id.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }

        let rebuilt = Arc::new(Snapshot::build(entries));
        *self.current.write() = rebuilt;
    }

    /// Drop every entry
    pub fn clear(&self) {
        *self.current.write() = Arc::new(Snapshot::default());
    }

    /// The `k` nearest entries to `query`, nearest first, ties ordered by id.
    ///
    /// A query whose dimension differs from the indexed vectors matches nothing.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        let snapshot = self.snapshot();
        let Some(hnsw) = snapshot.hnsw.as_ref() else {
            return Vec::new();
        };
        if k == 0 || snapshot.dimension() != Some(query.len()) {
            return Vec::new();
        }

        let point = EmbeddingPoint(query.to_vec());
        let mut search = Search::default();
        let mut candidates: Vec<(f32, usize)> = hnsw
            .search(&point, &mut search)
            .map(|item| (item.distance, *item.value))
            .collect();

        candidates.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| snapshot.entries[a.1].id.cmp(&snapshot.entries[b.1].id))
        });
        candidates.truncate(k);

        candidates
            .into_iter()
            .map(|(distance, i)| {
                let entry = &snapshot.entries[i];
                SearchHit {
                    id: entry.id.clone(),
                    text: entry.text.clone(),
                    metadata: entry.metadata.clone(),
                    distance,
                }
            })
            .collect()
    }
}
