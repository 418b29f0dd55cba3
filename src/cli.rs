use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::composer::{compose, ComposeError, FsContentStore, DEFAULT_SEPARATOR};
use crate::load_config::load_config;
use crate::registry::Category;
use crate::resolver::{BundleResolver, ResolveError};

/// CLI for rules-bundle: compose guidance documents into one context blob.
#[derive(Parser)]
#[clap(
    name = "rules-bundle",
    version,
    about = "Compose curated guidance documents into a single context bundle for AI coding assistants"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a profile or an explicit id list into one output blob
    Compose {
        /// Path to the YAML catalog config file
        #[clap(long)]
        config: PathBuf,
        /// Named profile to resolve
        #[clap(long, conflicts_with = "ids", required_unless_present = "ids")]
        profile: Option<String>,
        /// Explicit comma-separated document ids to resolve
        #[clap(long, value_delimiter = ',')]
        ids: Option<Vec<String>>,
        /// Write the composed text here instead of stdout
        #[clap(long)]
        out: Option<PathBuf>,
        /// Separator inserted between documents
        #[clap(long, default_value = DEFAULT_SEPARATOR)]
        separator: String,
    },
    /// List catalog documents with their declared line counts
    List {
        /// Path to the YAML catalog config file
        #[clap(long)]
        config: PathBuf,
        /// Only show documents in this category
        #[clap(long)]
        category: Option<String>,
        /// Emit the listing as JSON
        #[clap(long)]
        json: bool,
    },
    /// List profiles with their resolved document counts and total lines
    Profiles {
        /// Path to the YAML catalog config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Failure modes of a CLI run, keyed to the exit-code contract:
/// bad caller input exits 2, failed content reads exit 3, everything else 1.
#[derive(Debug)]
pub enum RunError {
    BadInput(String),
    Read(String),
    Other(anyhow::Error),
}

impl RunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BadInput(_) => 2,
            Self::Read(_) => 3,
            Self::Other(_) => 1,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadInput(msg) | Self::Read(msg) => f.write_str(msg),
            Self::Other(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ResolveError> for RunError {
    fn from(e: ResolveError) -> Self {
        Self::BadInput(e.to_string())
    }
}

impl From<ComposeError> for RunError {
    fn from(e: ComposeError) -> Self {
        Self::Read(e.to_string())
    }
}

impl From<anyhow::Error> for RunError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e)
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<(), RunError> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let result = match cli.command {
        Commands::Compose {
            config,
            profile,
            ids,
            out,
            separator,
        } => compose_command(config, profile, ids, out, &separator).await,
        Commands::List {
            config,
            category,
            json,
        } => list_command(config, category, json),
        Commands::Profiles { config } => profiles_command(config),
    };

    // Emit an 'exit' span for structured tracing parity with tests.
    let exit_span = tracing::info_span!("exit");
    exit_span.in_scope(|| {
        tracing::info!("run finished");
    });

    result
}

async fn compose_command(
    config: PathBuf,
    profile: Option<String>,
    ids: Option<Vec<String>>,
    out: Option<PathBuf>,
    separator: &str,
) -> Result<(), RunError> {
    let catalog = load_config(&config)?;
    let resolver = BundleResolver::new(&catalog.registry, &catalog.profiles);

    let bundle = match (profile, ids) {
        (Some(name), _) => resolver.resolve_profile(&name)?,
        (None, Some(list)) => resolver.resolve_ids(&list)?,
        // clap enforces that one of the two is present
        (None, None) => {
            return Err(RunError::BadInput(
                "either --profile or --ids is required".to_string(),
            ))
        }
    };

    let store = FsContentStore::new(catalog.root_dir.clone());
    let composed = compose(&store, &bundle, separator).await?;

    match out {
        Some(path) => {
            std::fs::write(&path, &composed.text).map_err(|e| {
                error!(error = ?e, path = %path.display(), "Failed to write composed output");
                RunError::Other(anyhow::anyhow!(
                    "Failed to write composed output to {:?}: {}",
                    path,
                    e
                ))
            })?;
            info!(path = %path.display(), bytes = composed.length, "Wrote composed output");
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout
                .write_all(composed.text.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|e| {
                    error!(error = ?e, "Failed to write composed output to stdout");
                    RunError::Other(anyhow::anyhow!("Failed to write to stdout: {}", e))
                })?;
        }
    }
    Ok(())
}

fn list_command(config: PathBuf, category: Option<String>, json: bool) -> Result<(), RunError> {
    let catalog = load_config(&config)?;
    let filter = match category {
        Some(s) => Some(Category::parse(&s).map_err(RunError::BadInput)?),
        None => None,
    };

    let documents: Vec<_> = catalog.registry.list(filter).collect();
    if json {
        let rendered = serde_json::to_string_pretty(&documents)
            .map_err(|e| RunError::Other(anyhow::anyhow!("Failed to render JSON listing: {e}")))?;
        println!("{rendered}");
    } else {
        for doc in &documents {
            println!("{}\t{}\t{} lines", doc.id, doc.category, doc.line_count);
        }
    }
    info!(documents = documents.len(), "Listed catalog documents");
    Ok(())
}

fn profiles_command(config: PathBuf) -> Result<(), RunError> {
    let catalog = load_config(&config)?;
    let resolver = BundleResolver::new(&catalog.registry, &catalog.profiles);

    for (name, _) in catalog.profiles.iter() {
        // Profiles were validated at load, so resolution cannot miss ids here.
        let bundle = resolver.resolve_profile(name)?;
        println!(
            "{}: {} documents, {} lines",
            name,
            bundle.documents.len(),
            bundle.total_lines
        );
    }
    Ok(())
}
