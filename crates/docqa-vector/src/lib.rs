//! docqa-vector
//!
//! Flat (brute-force) vector index over document chunks. Cosine similarity:
//! vectors are L2-normalised on insert, queries on search, and scored by dot
//! product. Exact top-k, deterministic ordering, read-only after build, so
//! `&VectorIndex` can be searched from many threads at once.

pub mod index;
pub mod search;
pub mod similarity;

pub use index::{IndexEntry, VectorIndex};
