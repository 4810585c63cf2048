//! Local lexical retrieval over chunked text documents.
//!
//! Files are split into overlapping chunks, tokenised, and scored with
//! Okapi BM25 at query time. The whole index lives in memory and is
//! snapshotted to a single JSON file.

pub mod builder;
pub mod chunker;
pub mod config;
pub mod error;
pub mod index;
pub mod persist;
pub mod store;
pub mod tokenizer;

pub use builder::{build_index, default_doc_paths, existing_paths};
pub use config::RagConfig;
pub use error::{RagError, Result};
pub use index::{DocChunk, IndexStats, QueryHit, RagIndex, INDEX_FORMAT_VERSION};
pub use store::RagStore;
