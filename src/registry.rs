//! Document catalog: maps identifiers to guidance documents.
//!
//! The registry is built once at startup from the loaded config and shared
//! read-only afterwards. It answers lookups by id and produces restartable
//! listings, optionally filtered by category.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Broad grouping for catalog documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Core,
    Frontend,
    Backend,
    Language,
    Testing,
    Workflow,
}

impl Category {
    /// Parse a category name string as it appears in config files.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "core" => Ok(Self::Core),
            "frontend" => Ok(Self::Frontend),
            "backend" => Ok(Self::Backend),
            "language" => Ok(Self::Language),
            "testing" => Ok(Self::Testing),
            "workflow" => Ok(Self::Workflow),
            _ => Err(format!(
                "Unknown category '{}'. Known categories: core, frontend, backend, language, testing, workflow",
                s
            )),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Language => "language",
            Self::Testing => "testing",
            Self::Workflow => "workflow",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unit of static guidance text, registered once and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: String,
    /// Path to the raw content, resolved against the catalog root at read time.
    pub path: PathBuf,
    /// Declared size; trusted as-is, never recomputed from file contents.
    pub line_count: u64,
    pub category: Category,
}

#[derive(Debug)]
pub enum RegistryError {
    DuplicateId(String),
    NotFound(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "document id '{}' is already registered", id),
            Self::NotFound(id) => write!(f, "document id '{}' is not registered", id),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Catalog of known documents, in registration order.
#[derive(Debug, Default)]
pub struct DocumentRegistry {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to the catalog. Ids are unique; a second registration
    /// under the same id is a configuration error.
    pub fn register(&mut self, doc: Document) -> Result<(), RegistryError> {
        if self.index.contains_key(&doc.id) {
            error!(id = %doc.id, "Attempted to register duplicate document id");
            return Err(RegistryError::DuplicateId(doc.id));
        }
        debug!(id = %doc.id, path = %doc.path.display(), category = %doc.category, "Registered document");
        self.index.insert(doc.id.clone(), self.documents.len());
        self.documents.push(doc);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Document, RegistryError> {
        self.index
            .get(id)
            .map(|&i| &self.documents[i])
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Iterate documents in registration order, optionally filtered by category.
    pub fn list(&self, category: Option<Category>) -> impl Iterator<Item = &Document> + '_ {
        self.documents
            .iter()
            .filter(move |doc| category.map_or(true, |c| doc.category == c))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
