use crate::error::{RagError, Result};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// On-disk format version written by [`crate::persist::save_index`].
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// BM25 term-frequency saturation.
pub const BM25_K1: f64 = 1.5;
/// BM25 document-length normalisation.
pub const BM25_B: f64 = 0.75;

pub type TermCounts = BTreeMap<String, u32>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocChunk {
    /// Path of the file this chunk was cut from. Shared by sibling chunks.
    pub source: String,
    pub text: String,
}

/// The whole retrieval index. `docs`, `tf` and `doc_lengths` are parallel
/// arrays of length `total_docs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagIndex {
    pub version: u32,
    #[serde(default)]
    pub created_at: String,
    pub docs: Vec<DocChunk>,
    pub tf: Vec<TermCounts>,
    /// Number of chunks containing each token at least once.
    pub df: TermCounts,
    pub doc_lengths: Vec<u32>,
    pub avg_doc_len: f64,
    pub total_docs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryHit {
    pub source: String,
    pub text: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_docs: u32,
    pub sources: usize,
    pub vocabulary: usize,
    pub avg_doc_len: f64,
    pub created_at: String,
}

impl RagIndex {
    /// Compute term statistics for an ordered list of chunks.
    pub fn from_chunks(docs: Vec<DocChunk>) -> Self {
        let mut tf = Vec::with_capacity(docs.len());
        let mut df = TermCounts::new();
        let mut doc_lengths = Vec::with_capacity(docs.len());

        for doc in &docs {
            let tokens = tokenize(&doc.text);
            doc_lengths.push(tokens.len() as u32);
            let mut counts = TermCounts::new();
            for tok in tokens {
                *counts.entry(tok).or_insert(0) += 1;
            }
            // each distinct token counts once per chunk
            for tok in counts.keys() {
                *df.entry(tok.clone()).or_insert(0) += 1;
            }
            tf.push(counts);
        }

        let avg_doc_len = if doc_lengths.is_empty() {
            0.0
        } else {
            doc_lengths.iter().map(|&l| l as f64).sum::<f64>() / doc_lengths.len() as f64
        };
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();

        Self {
            version: INDEX_FORMAT_VERSION,
            created_at,
            total_docs: docs.len() as u32,
            docs,
            tf,
            df,
            doc_lengths,
            avg_doc_len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Reject snapshots from another format version or with misaligned arrays.
    pub fn validate(&self) -> Result<()> {
        if self.version != INDEX_FORMAT_VERSION {
            return Err(RagError::VersionMismatch { found: self.version, expected: INDEX_FORMAT_VERSION });
        }
        let n = self.total_docs as usize;
        if self.docs.len() != n || self.tf.len() != n || self.doc_lengths.len() != n {
            return Err(RagError::Corrupt(format!(
                "total_docs={} but docs={}, tf={}, doc_lengths={}",
                self.total_docs,
                self.docs.len(),
                self.tf.len(),
                self.doc_lengths.len()
            )));
        }
        Ok(())
    }

    /// Rank chunks against `query` with BM25 and return at most `top_k` hits.
    ///
    /// IDF is `1 + (N - df + 0.5) / (df + 0.5)`, the raw ratio rather than its
    /// logarithm; existing indexes and rankings depend on this form. Query
    /// tokens unknown to the index contribute nothing, and chunks scoring
    /// zero are never returned. Ties keep index order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<QueryHit> {
        let total_docs = self.total_docs as usize;
        if self.docs.is_empty() || total_docs == 0 || top_k == 0 {
            return Vec::new();
        }
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let avg_doc_len = if self.avg_doc_len == 0.0 { 1.0 } else { self.avg_doc_len };
        let mut scores = vec![0.0f64; total_docs];

        for tok in &tokens {
            let doc_freq = self.df.get(tok).copied().unwrap_or(0);
            if doc_freq == 0 {
                continue;
            }
            let df_t = doc_freq as f64;
            let idf = 1.0 + (total_docs as f64 - df_t + 0.5) / (df_t + 0.5);
            for (idx, counts) in self.tf.iter().enumerate() {
                let freq = counts.get(tok).copied().unwrap_or(0);
                if freq == 0 {
                    continue;
                }
                let freq = freq as f64;
                let denom = freq + BM25_K1 * (1.0 - BM25_B + BM25_B * (self.doc_lengths[idx] as f64 / avg_doc_len));
                scores[idx] += idf * (freq * (BM25_K1 + 1.0) / denom);
            }
        }

        let mut ranked: Vec<usize> = (0..total_docs).collect();
        // stable sort, so equal scores keep index order
        ranked.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));

        ranked
            .into_iter()
            .take(top_k)
            .filter(|&idx| scores[idx] > 0.0)
            .map(|idx| {
                let doc = &self.docs[idx];
                QueryHit { source: doc.source.clone(), text: doc.text.clone(), score: scores[idx] }
            })
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let sources: BTreeSet<&str> = self.docs.iter().map(|d| d.source.as_str()).collect();
        IndexStats {
            total_docs: self.total_docs,
            sources: sources.len(),
            vocabulary: self.df.len(),
            avg_doc_len: self.avg_doc_len,
            created_at: self.created_at.clone(),
        }
    }
}
