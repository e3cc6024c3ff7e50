use std::path::Path;

use anyhow::Context;
use pbk_core::ExchangeDocument;
use pbk_pipeline::store::load_document;
use pbk_pipeline::{FsArtifactStore, JsonDocumentCodec};

/// Read a compiled model document written by `pbk build`.
pub fn read_document(path: &Path) -> anyhow::Result<ExchangeDocument> {
    load_document(&FsArtifactStore, &JsonDocumentCodec, path)
        .with_context(|| format!("failed to load model document {}", path.display()))
}

/// Clamp a collection length into a progress-bar total.
pub fn progress_total(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
