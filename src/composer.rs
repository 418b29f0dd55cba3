//! Composition: serialize a resolved bundle into one output text blob.
//!
//! Content retrieval goes through the [`ContentStore`] trait so tests can
//! substitute a mock for the filesystem. Composition is all-or-nothing: a
//! single failed read fails the whole compose, and no partial output is
//! ever produced.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::resolver::Bundle;

/// Separator inserted between documents unless the caller overrides it.
pub const DEFAULT_SEPARATOR: &str = "\n---\n";

/// Error type for content retrieval (simple boxed error for now).
pub type ReadError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for retrieving a document's raw content given its declared path.
/// Allows plugging in real, test, or mockable stores.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Return the full raw text at `path`, or fail with a read error.
    async fn read(&self, path: &Path) -> Result<String, ReadError>;
}

/// Filesystem-backed store. Relative document paths resolve against the
/// catalog's root directory when one is configured.
#[derive(Debug, Default)]
pub struct FsContentStore {
    root: Option<PathBuf>,
}

impl FsContentStore {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if !path.is_absolute() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn read(&self, path: &Path) -> Result<String, ReadError> {
        let full = self.resolve(path);
        debug!(path = %full.display(), "Reading document content");
        match tokio::fs::read_to_string(&full).await {
            Ok(content) => Ok(content),
            Err(e) => {
                error!(error = ?e, path = %full.display(), "Failed to read document content");
                Err(Box::new(e) as ReadError)
            }
        }
    }
}

/// The composed output blob and its computed byte length.
#[derive(Debug, Clone)]
pub struct Composed {
    pub text: String,
    pub length: usize,
}

#[derive(Debug)]
pub enum ComposeError {
    /// A document's content could not be retrieved; names the offending id.
    Read { id: String, source: ReadError },
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { id, source } => {
                write!(f, "failed to read content for document '{}': {}", id, source)
            }
        }
    }
}

impl std::error::Error for ComposeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Concatenate each document's raw content in bundle order, joined by
/// `separator`. Deterministic: the same bundle composes to byte-identical
/// output every time.
pub async fn compose(
    store: &dyn ContentStore,
    bundle: &Bundle,
    separator: &str,
) -> Result<Composed, ComposeError> {
    info!(documents = bundle.documents.len(), "Starting compose");
    let mut parts = Vec::with_capacity(bundle.documents.len());
    for doc in &bundle.documents {
        let content = store.read(&doc.path).await.map_err(|e| {
            error!(id = %doc.id, error = %e, "Compose aborted on failed read");
            ComposeError::Read {
                id: doc.id.clone(),
                source: e,
            }
        })?;
        debug!(id = %doc.id, bytes = content.len(), "Retrieved document content");
        parts.push(content);
    }
    let text = parts.join(separator);
    let length = text.len();
    info!(documents = parts.len(), bytes = length, "Compose complete");
    Ok(Composed { text, length })
}
