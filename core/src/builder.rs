use crate::chunker::chunk_text;
use crate::{DocChunk, RagIndex};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions picked up when walking a directory (compared case-insensitively).
const DOC_EXTENSIONS: &[&str] = &["md", "txt"];

/// Prefix of the project guide documents indexed by default.
const GUIDE_PREFIX: &str = "GUIA COMPLETO - CONSTRU";

/// Build a fresh index from files and directories.
///
/// Directories are walked recursively for `.md`/`.txt` files; explicit file
/// paths are indexed whatever their extension. Paths that are neither are
/// ignored, and a file that cannot be read contributes no chunks.
pub fn build_index<I, P>(paths: I, chunk_size: usize, overlap: usize) -> RagIndex
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut docs: Vec<DocChunk> = Vec::new();
    let mut files = 0usize;
    for path in paths {
        for file in discover_files(path.as_ref()) {
            files += 1;
            docs.extend(read_and_chunk(&file, chunk_size, overlap));
        }
    }
    let index = RagIndex::from_chunks(docs);
    tracing::info!(files, total_docs = index.total_docs, vocabulary = index.df.len(), "built index");
    index
}

fn discover_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let p = entry.path();
            if p.is_file() && has_doc_extension(p) {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    }
    files
}

fn has_doc_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| DOC_EXTENSIONS.iter().any(|d| ext.eq_ignore_ascii_case(d)))
        .unwrap_or(false)
}

fn read_and_chunk(path: &Path, chunk_size: usize, overlap: usize) -> Vec<DocChunk> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return Vec::new();
        }
    };
    // invalid UTF-8 becomes U+FFFD instead of failing the file
    let text = String::from_utf8_lossy(&bytes);
    let source = path.to_string_lossy().into_owned();
    chunk_text(&text, chunk_size, overlap)
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .map(|c| DocChunk { source: source.clone(), text: c.to_string() })
        .collect()
}

/// Conventional documentation locations under a project root.
pub fn default_doc_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths = vec![root.join("README.md"), root.join("EXECUTE_ISSO.md"), root.join("docs")];
    if let Ok(entries) = fs::read_dir(root) {
        let mut guides: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(GUIDE_PREFIX))
            .map(|e| e.path())
            .collect();
        guides.sort();
        paths.extend(guides);
    }
    paths
}

pub fn existing_paths<I, P>(paths: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().map(|p| p.as_ref().to_path_buf()).filter(|p| p.exists()).collect()
}
