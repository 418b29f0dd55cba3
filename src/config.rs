use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// On-disk YAML schema for the document catalog and its profiles.
#[derive(Debug, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Optional directory that relative document paths resolve against.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
    pub documents: Vec<DocumentEntry>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Vec<String>>,
}

impl BundleConfig {
    pub fn trace_loaded(&self) {
        info!(
            documents = self.documents.len(),
            profiles = self.profiles.len(),
            "Loaded bundle config"
        );
        debug!(?self, "Bundle config loaded (full debug)");
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub id: String,
    pub path: PathBuf,
    pub line_count: u64,
    /// Parsed into a [`Category`](crate::registry::Category) at load time.
    pub category: String,
}

impl DocumentEntry {
    pub fn trace_loaded(&self) {
        info!(
            id = %self.id,
            path = %self.path.display(),
            line_count = self.line_count,
            category = %self.category,
            "Loaded document entry"
        );
    }
}
