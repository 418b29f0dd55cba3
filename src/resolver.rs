//! Bundle resolution: expands a profile name or explicit id list into an
//! ordered, deduplicated list of documents with its combined declared size.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use tracing::{debug, error, info};

use crate::registry::{Document, DocumentRegistry};

/// Named, ordered document-id lists loaded from configuration.
#[derive(Debug, Default)]
pub struct ProfileTable {
    profiles: BTreeMap<String, Vec<String>>,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, ids: Vec<String>) {
        let name = name.into();
        debug!(profile = %name, documents = ids.len(), "Registered profile");
        self.profiles.insert(name, ids);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.profiles.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Resolved, deduplicated, ordered list of documents for one request.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub documents: Vec<Document>,
    /// Sum of declared line counts across the bundle's documents.
    pub total_lines: u64,
}

impl Bundle {
    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }
}

#[derive(Debug)]
pub enum ResolveError {
    UnknownProfile(String),
    NotFound(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProfile(name) => write!(f, "unknown profile '{}'", name),
            Self::NotFound(id) => write!(f, "document id '{}' is not registered", id),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Turns profile names and explicit id lists into bundles.
pub struct BundleResolver<'a> {
    registry: &'a DocumentRegistry,
    profiles: &'a ProfileTable,
}

impl<'a> BundleResolver<'a> {
    pub fn new(registry: &'a DocumentRegistry, profiles: &'a ProfileTable) -> Self {
        Self { registry, profiles }
    }

    /// Resolve a named profile, preserving its declared document order and
    /// dropping repeated ids (first occurrence wins).
    pub fn resolve_profile(&self, name: &str) -> Result<Bundle, ResolveError> {
        let ids = self.profiles.get(name).ok_or_else(|| {
            error!(profile = %name, "Requested profile is not defined");
            ResolveError::UnknownProfile(name.to_string())
        })?;
        info!(profile = %name, declared = ids.len(), "Resolving profile");
        self.collect(ids.iter().map(String::as_str))
    }

    /// Same dedup/order contract as [`resolve_profile`](Self::resolve_profile),
    /// for an explicit id list.
    pub fn resolve_ids(&self, ids: &[String]) -> Result<Bundle, ResolveError> {
        info!(declared = ids.len(), "Resolving explicit id list");
        self.collect(ids.iter().map(String::as_str))
    }

    fn collect<'b>(&self, ids: impl Iterator<Item = &'b str>) -> Result<Bundle, ResolveError> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut documents = Vec::new();
        for id in ids {
            if !seen.insert(id) {
                debug!(id = %id, "Skipping duplicate document id");
                continue;
            }
            match self.registry.get(id) {
                Ok(doc) => documents.push(doc.clone()),
                Err(_) => {
                    error!(id = %id, "Requested document is not registered");
                    return Err(ResolveError::NotFound(id.to_string()));
                }
            }
        }
        let total_lines = documents.iter().map(|d| d.line_count).sum();
        info!(
            documents = documents.len(),
            total_lines, "Resolved bundle"
        );
        Ok(Bundle {
            documents,
            total_lines,
        })
    }
}
