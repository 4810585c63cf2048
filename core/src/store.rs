use crate::builder::build_index;
use crate::error::{RagError, Result};
use crate::persist::{load_index, save_index};
use crate::{QueryHit, RagConfig, RagIndex};
use std::path::{Path, PathBuf};

/// Owns one in-memory index and the snapshot path it is saved to.
///
/// Not internally synchronised: callers sharing a store across threads must
/// give `build_from_paths`/`load` exclusive access.
#[derive(Debug, Clone)]
pub struct RagStore {
    index_path: PathBuf,
    index: Option<RagIndex>,
}

impl RagStore {
    pub fn new<P: AsRef<Path>>(index_path: P) -> Self {
        Self { index_path: index_path.as_ref().to_path_buf(), index: None }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(&config.index_path)
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&RagIndex> {
        self.index.as_ref()
    }

    /// Replace the in-memory index with one built from `paths`.
    pub fn build_from_paths<I, P>(&mut self, paths: I, chunk_size: usize, overlap: usize)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.index = Some(build_index(paths, chunk_size, overlap));
    }

    pub fn save(&self) -> Result<()> {
        let index = self.index.as_ref().ok_or(RagError::NoIndex)?;
        save_index(&self.index_path, index)?;
        tracing::info!(path = %self.index_path.display(), total_docs = index.total_docs, "index saved");
        Ok(())
    }

    /// Load the snapshot, replacing whatever is in memory. Returns `false`
    /// if no snapshot exists; the current index is then left untouched.
    pub fn load(&mut self) -> Result<bool> {
        match load_index(&self.index_path)? {
            Some(index) => {
                tracing::info!(path = %self.index_path.display(), total_docs = index.total_docs, "index loaded");
                self.index = Some(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Search, loading the snapshot first if nothing is in memory.
    /// No snapshot means no hits.
    pub fn query(&mut self, text: &str, top_k: usize) -> Result<Vec<QueryHit>> {
        if self.index.is_none() && !self.load()? {
            tracing::debug!(path = %self.index_path.display(), "no index available");
            return Ok(Vec::new());
        }
        Ok(self.search(text, top_k))
    }

    /// Search the in-memory index only.
    pub fn search(&self, text: &str, top_k: usize) -> Vec<QueryHit> {
        match &self.index {
            Some(index) => index.search(text, top_k),
            None => Vec::new(),
        }
    }
}
