use std::path::PathBuf;

use rules_bundle::composer::{compose, ComposeError, FsContentStore, MockContentStore, DEFAULT_SEPARATOR};
use rules_bundle::registry::{Category, Document, DocumentRegistry, RegistryError};
use rules_bundle::resolver::{BundleResolver, ProfileTable, ResolveError};

fn doc(id: &str, path: &str, line_count: u64, category: Category) -> Document {
    Document {
        id: id.to_string(),
        path: PathBuf::from(path),
        line_count,
        category,
    }
}

fn example_registry() -> DocumentRegistry {
    let mut registry = DocumentRegistry::new();
    registry
        .register(doc("core", "a.md", 10, Category::Core))
        .unwrap();
    registry
        .register(doc("frontend", "b.md", 20, Category::Frontend))
        .unwrap();
    registry
}

#[test]
fn registry_rejects_duplicate_ids() {
    let mut registry = example_registry();
    let err = registry
        .register(doc("core", "elsewhere.md", 99, Category::Backend))
        .unwrap_err();
    match err {
        RegistryError::DuplicateId(id) => assert_eq!(id, "core"),
        other => panic!("Expected DuplicateId, got: {other:?}"),
    }
    // The original registration is untouched.
    assert_eq!(registry.get("core").unwrap().line_count, 10);
}

#[test]
fn registry_list_filters_by_category_and_restarts() {
    let registry = example_registry();

    let all: Vec<_> = registry.list(None).map(|d| d.id.as_str()).collect();
    assert_eq!(all, ["core", "frontend"]);

    let frontend: Vec<_> = registry
        .list(Some(Category::Frontend))
        .map(|d| d.id.as_str())
        .collect();
    assert_eq!(frontend, ["frontend"]);

    // Listing is restartable: a second pass sees the same sequence.
    let again: Vec<_> = registry.list(None).map(|d| d.id.as_str()).collect();
    assert_eq!(again, all);
}

/// Duplicates in a profile's declared list are dropped, first occurrence wins,
/// and total_lines sums the declared line counts of the deduplicated bundle.
#[test]
fn resolve_profile_dedupes_and_sums_declared_lines() {
    let registry = example_registry();
    let mut profiles = ProfileTable::new();
    profiles.insert(
        "web",
        vec!["core".to_string(), "frontend".to_string(), "core".to_string()],
    );

    let resolver = BundleResolver::new(&registry, &profiles);
    let bundle = resolver.resolve_profile("web").expect("web resolves");

    assert_eq!(bundle.ids(), ["core", "frontend"]);
    assert_eq!(bundle.total_lines, 30);

    // Idempotent: resolving again yields the same bundle.
    let again = resolver.resolve_profile("web").unwrap();
    assert_eq!(again.ids(), bundle.ids());
    assert_eq!(again.total_lines, bundle.total_lines);
}

#[test]
fn resolve_profile_fails_on_unknown_profile() {
    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);

    let err = resolver.resolve_profile("nope").unwrap_err();
    match &err {
        ResolveError::UnknownProfile(name) => assert_eq!(name, "nope"),
        other => panic!("Expected UnknownProfile, got: {other:?}"),
    }
    assert!(err.to_string().contains("nope"));
}

/// Unregistered ids always fail resolution, naming the offending id; they are
/// never silently dropped.
#[test]
fn resolve_ids_fails_naming_missing_id() {
    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);

    let err = resolver
        .resolve_ids(&["core".to_string(), "missing".to_string()])
        .unwrap_err();
    match &err {
        ResolveError::NotFound(id) => assert_eq!(id, "missing"),
        other => panic!("Expected NotFound, got: {other:?}"),
    }
    assert!(err.to_string().contains("missing"));
}

#[test]
fn resolve_ids_applies_same_dedup_contract_as_profiles() {
    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);

    let bundle = resolver
        .resolve_ids(&[
            "frontend".to_string(),
            "core".to_string(),
            "frontend".to_string(),
        ])
        .unwrap();
    assert_eq!(bundle.ids(), ["frontend", "core"]);
    assert_eq!(bundle.total_lines, 30);
}

fn mock_store_with_contents() -> MockContentStore {
    let mut store = MockContentStore::new();
    store.expect_read().returning(|path| {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        match name.as_str() {
            "a.md" => Ok("A".to_string()),
            "b.md" => Ok("B".to_string()),
            other => Err(format!("no content for {other}").into()),
        }
    });
    store
}

/// Two one-line documents "A" and "B" compose to "A\n---\nB" with the default
/// separator.
#[tokio::test]
async fn compose_joins_documents_with_separator() {
    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);
    let bundle = resolver
        .resolve_ids(&["core".to_string(), "frontend".to_string()])
        .unwrap();

    let store = mock_store_with_contents();
    let composed = compose(&store, &bundle, DEFAULT_SEPARATOR)
        .await
        .expect("compose succeeds");

    assert_eq!(composed.text, "A\n---\nB");
    assert_eq!(composed.length, composed.text.len());
}

#[tokio::test]
async fn compose_is_deterministic_for_the_same_bundle() {
    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);
    let bundle = resolver
        .resolve_ids(&["core".to_string(), "frontend".to_string()])
        .unwrap();

    let store = mock_store_with_contents();
    let first = compose(&store, &bundle, "\n===\n").await.unwrap();
    let second = compose(&store, &bundle, "\n===\n").await.unwrap();

    assert_eq!(first.text, second.text);
    assert_eq!(first.length, second.length);
}

/// A single failed read fails the whole compose; no partial output is returned.
#[tokio::test]
async fn compose_fails_whole_on_read_error() {
    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);
    let bundle = resolver
        .resolve_ids(&["core".to_string(), "frontend".to_string()])
        .unwrap();

    let mut store = MockContentStore::new();
    store.expect_read().returning(|path| {
        if path.ends_with("a.md") {
            Ok("A".to_string())
        } else {
            Err("disk on fire".into())
        }
    });

    let err = compose(&store, &bundle, DEFAULT_SEPARATOR)
        .await
        .unwrap_err();
    match &err {
        ComposeError::Read { id, .. } => assert_eq!(id, "frontend"),
    }
    assert!(err.to_string().contains("frontend"));
}

#[tokio::test]
async fn fs_content_store_reads_relative_to_root() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("a.md"), "A").unwrap();
    std::fs::write(dir.path().join("b.md"), "B").unwrap();

    let registry = example_registry();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);
    let bundle = resolver
        .resolve_ids(&["core".to_string(), "frontend".to_string()])
        .unwrap();

    let store = FsContentStore::new(Some(dir.path().to_path_buf()));
    let composed = compose(&store, &bundle, DEFAULT_SEPARATOR).await.unwrap();
    assert_eq!(composed.text, "A\n---\nB");
}

#[tokio::test]
async fn fs_content_store_surfaces_read_errors() {
    let dir = tempfile::tempdir().expect("temp dir");

    let mut registry = DocumentRegistry::new();
    registry
        .register(doc("ghost", "ghost.md", 1, Category::Core))
        .unwrap();
    let profiles = ProfileTable::new();
    let resolver = BundleResolver::new(&registry, &profiles);
    let bundle = resolver.resolve_ids(&["ghost".to_string()]).unwrap();

    let store = FsContentStore::new(Some(dir.path().to_path_buf()));
    let err = compose(&store, &bundle, DEFAULT_SEPARATOR)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("ghost"));
}
