use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info};

use crate::config::BundleConfig;
use crate::registry::{Category, Document, DocumentRegistry};
use crate::resolver::ProfileTable;

/// Fully loaded catalog: the registry, the profile table, and the content root.
#[derive(Debug)]
pub struct Catalog {
    pub registry: DocumentRegistry,
    pub profiles: ProfileTable,
    pub root_dir: Option<PathBuf>,
}

/// Loads the static YAML catalog config and builds the runtime registry and
/// profile table. Fails fast on duplicate document ids, unknown categories,
/// and profiles that reference unregistered documents.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading catalog configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: BundleConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };
    config.trace_loaded();

    let mut registry = DocumentRegistry::new();
    for entry in &config.documents {
        entry.trace_loaded();
        let category = match Category::parse(&entry.category) {
            Ok(c) => c,
            Err(msg) => {
                error!(id = %entry.id, category = %entry.category, "Unsupported document category");
                anyhow::bail!(msg);
            }
        };
        registry
            .register(Document {
                id: entry.id.clone(),
                path: entry.path.clone(),
                line_count: entry.line_count,
                category,
            })
            .map_err(|e| {
                error!(error = %e, "Registry rejected document entry");
                anyhow::anyhow!("{e}")
            })?;
    }

    // Profiles may repeat ids (dedup happens at resolve time), but every id
    // they name must exist in the registry.
    let mut profiles = ProfileTable::new();
    for (name, ids) in &config.profiles {
        for id in ids {
            if registry.get(id).is_err() {
                error!(profile = %name, id = %id, "Profile references unknown document id");
                anyhow::bail!("profile '{}' references unknown document id '{}'", name, id);
            }
        }
        profiles.insert(name.clone(), ids.clone());
    }

    info!(
        documents = registry.len(),
        profiles = profiles.len(),
        "Catalog loaded successfully"
    );

    Ok(Catalog {
        registry,
        profiles,
        root_dir: config.root_dir,
    })
}
