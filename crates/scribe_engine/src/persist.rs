use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::record::ContentRecord;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize metadata: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Write `content` to `path` through a temp file in the same directory, so a
/// reader never sees a half-written file.
pub fn write_atomically(path: &Path, content: &[u8]) -> Result<(), PersistError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub markdown: PathBuf,
    pub metadata: PathBuf,
}

/// Persists a record as `<root>/<base>/<base>.md` and
/// `<root>/<base>/<base>_context.json`.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths_for(&self, base: &str) -> OutputPaths {
        let dir = self.root.join(base);
        OutputPaths {
            markdown: dir.join(format!("{base}.md")),
            metadata: dir.join(format!("{base}_context.json")),
        }
    }

    pub fn write(&self, base: &str, record: &ContentRecord) -> Result<OutputPaths, PersistError> {
        let paths = self.paths_for(base);
        ensure_output_dir(&self.root.join(base))?;

        let metadata = serde_json::to_string_pretty(&record.metadata())?;
        write_atomically(&paths.markdown, record.to_markdown().as_bytes())?;
        write_atomically(&paths.metadata, metadata.as_bytes())?;

        engine_info!(
            "wrote {} and {}",
            paths.markdown.display(),
            paths.metadata.display()
        );
        Ok(paths)
    }
}
