//! Artifact persistence: where documents and tables live and how documents
//! are encoded.

use std::fs;
use std::io;
use std::path::Path;

use pbk_core::{CoreError, ExchangeDocument};

/// Capability queries and I/O for pipeline artifacts.
pub trait ArtifactStore {
    /// Whether an artifact is already present. Drives the annotation-table guard.
    fn exists(&self, path: &Path) -> bool;

    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Create or replace an artifact.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Local filesystem store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsArtifactStore;

impl ArtifactStore for FsArtifactStore {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }
}

pub trait DocumentCodec {
    /// # Errors
    ///
    /// Returns `CoreError::Document` if the document cannot be encoded.
    fn encode(&self, document: &ExchangeDocument) -> Result<String, CoreError>;

    /// # Errors
    ///
    /// Returns `CoreError::Document` if the text is not a document.
    fn decode(&self, content: &str) -> Result<ExchangeDocument, CoreError>;
}

/// Pretty JSON encoding of the exchange document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentCodec;

impl DocumentCodec for JsonDocumentCodec {
    fn encode(&self, document: &ExchangeDocument) -> Result<String, CoreError> {
        let mut json = document.to_json()?;
        json.push('\n');
        Ok(json)
    }

    fn decode(&self, content: &str) -> Result<ExchangeDocument, CoreError> {
        ExchangeDocument::from_json(content)
    }
}

/// Read and decode a persisted document.
///
/// # Errors
///
/// Returns `CoreError::NotFound` when the artifact cannot be read, or the
/// codec's decoding error.
pub fn load_document(
    store: &dyn ArtifactStore,
    codec: &dyn DocumentCodec,
    path: &Path,
) -> Result<ExchangeDocument, CoreError> {
    let content = store.read_to_string(path).map_err(|_| CoreError::NotFound {
        entity_type: "document".to_string(),
        id: path.display().to_string(),
    })?;
    codec.decode(&content)
}
