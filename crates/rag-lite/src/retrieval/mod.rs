//! Persistent vector collection and nearest-neighbour search

pub mod index;
pub mod store;

pub use index::{IndexEntry, SearchHit, VectorIndex};
pub use store::VectorStore;
