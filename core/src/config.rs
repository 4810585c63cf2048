use crate::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::persist::DEFAULT_INDEX_PATH;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TOP_K: usize = 4;

/// Retrieval settings, normally read from `RAG_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RagConfig {
    pub index_path: PathBuf,
    pub top_k: usize,
    /// When false callers skip retrieval entirely.
    pub enabled: bool,
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            top_k: DEFAULT_TOP_K,
            enabled: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl RagConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            index_path: lookup("RAG_INDEX_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.index_path),
            top_k: parse_or("RAG_TOP_K", lookup("RAG_TOP_K"), defaults.top_k),
            enabled: lookup("RAG_ENABLED")
                .map(|v| parse_flag("RAG_ENABLED", &v, defaults.enabled))
                .unwrap_or(defaults.enabled),
            chunk_size: parse_or("RAG_CHUNK_SIZE", lookup("RAG_CHUNK_SIZE"), defaults.chunk_size),
            overlap: parse_or("RAG_CHUNK_OVERLAP", lookup("RAG_CHUNK_OVERLAP"), defaults.overlap),
        }
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %v, "invalid value, using default");
            default
        }),
    }
}

fn parse_flag(key: &str, raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(key, value = raw, "invalid flag, using default");
            default
        }
    }
}
