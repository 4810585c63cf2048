use crate::error::Result;
use crate::RagIndex;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

/// Fallback snapshot location when nothing is configured.
pub const DEFAULT_INDEX_PATH: &str = "data/rag_index.json";

/// Write the index as one JSON document, creating parent directories.
///
/// Non-ASCII text is written as-is (UTF-8), not escaped.
pub fn save_index(path: &Path, index: &RagIndex) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut w, index)?;
    w.flush()?;
    tracing::debug!(path = %path.display(), total_docs = index.total_docs, "saved index");
    Ok(())
}

/// Read a snapshot. `Ok(None)` when the file does not exist; any parse,
/// version or consistency problem is an error.
pub fn load_index(path: &Path) -> Result<Option<RagIndex>> {
    let f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let index: RagIndex = serde_json::from_reader(BufReader::new(f))?;
    index.validate()?;
    tracing::debug!(path = %path.display(), total_docs = index.total_docs, "loaded index");
    Ok(Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocChunk, RagError, INDEX_FORMAT_VERSION};
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_index(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/index.json");
        save_index(&path, &RagIndex::from_chunks(Vec::new())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn non_ascii_text_survives() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        let index = RagIndex::from_chunks(vec![DocChunk { source: "guia.md".into(), text: "Construção — 日本語 ✓".into() }]);
        save_index(&path, &index).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Construção — 日本語 ✓"));
        assert_eq!(load_index(&path).unwrap().unwrap(), index);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_index(&path), Err(RagError::Json(_))));
    }

    #[test]
    fn unversioned_snapshot_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        std::fs::write(
            &path,
            r#"{"docs":[],"tf":[],"df":{},"doc_lengths":[],"avg_doc_len":0.0,"total_docs":0}"#,
        )
        .unwrap();
        assert!(load_index(&path).is_err());
    }

    #[test]
    fn future_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.json");
        let mut index = RagIndex::from_chunks(Vec::new());
        index.version = INDEX_FORMAT_VERSION + 1;
        save_index(&path, &index).unwrap();
        assert!(matches!(load_index(&path), Err(RagError::VersionMismatch { .. })));
    }
}
