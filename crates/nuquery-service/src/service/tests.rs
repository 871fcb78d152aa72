//! Unit tests for the query façade

use super::*;

use nuquery_cache::CacheConfig;
use nuquery_core::error::{ErrorCode, ErrorKind, QueryError};
use nuquery_core::types::{Dependency, DependencyGroup, PackageManifest};
use nuquery_registry::testing::{StaticHost, StaticRegistry};
use nuquery_resolver::ContentSource;

struct Harness {
    service: PackageService,
    registry: Arc<StaticRegistry>,
    host: Arc<StaticHost>,
}

fn harness(registry: StaticRegistry, host: StaticHost) -> Harness {
    let registry = Arc::new(registry);
    let host = Arc::new(host);
    let cache = Arc::new(CacheStore::create(CacheConfig::default()));
    let service = PackageService::new(cache, registry.clone(), host.clone())
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(1)));

    Harness {
        service,
        registry,
        host,
    }
}

fn widget() -> PackageMetadata {
    let mut metadata = PackageMetadata::new("Acme.Widget", "1.1.0");
    metadata.description = Some("Widgets".to_string());
    metadata.authors = vec!["Acme".to_string()];
    metadata.total_downloads = 1234;
    metadata.project_url = Some("https://github.com/acme/widget".to_string());
    metadata
}

fn widget_registry() -> StaticRegistry {
    StaticRegistry::new().with_package(widget(), &["1.0.0", "1.1.0", "2.0.0-beta"])
}

fn searchable(id: &str, downloads: u64) -> PackageMetadata {
    let mut metadata = PackageMetadata::new(id, "1.0.0");
    metadata.description = Some("json tools".to_string());
    metadata.total_downloads = downloads;
    metadata
}

#[tokio::test]
async fn test_content_synthesized_for_bare_package() {
    let h = harness(widget_registry(), StaticHost::new());

    let response = h
        .service
        .fetch_content(&ContentQuery::new("Acme.Widget"))
        .await
        .unwrap();

    assert!(response.exists);
    assert_eq!(response.version, "1.1.0");
    assert_eq!(response.content_source, Some(ContentSource::Synthesized));
    assert!(response.content.contains("dotnet add package Acme.Widget"));
    assert_eq!(response.installation.dotnet_cli, "dotnet add package Acme.Widget --version 1.1.0");
    assert_eq!(response.repository.as_ref().map(|r| r.name.as_str()), Some("widget"));
    assert_eq!(response.basic_info.as_ref().map(|b| b.total_downloads), Some(1234));
    assert_eq!(h.host.calls(), 1);
}

#[tokio::test]
async fn test_content_with_examples() {
    let readme = "# Widget\n\n## Quick start\n\n```csharp\nvar w = new Widget();\n```\n";
    let h = harness(
        widget_registry().with_readme("Acme.Widget", "1.1.0", readme),
        StaticHost::new(),
    );

    let response = h
        .service
        .fetch_content(&ContentQuery::new("acme.widget"))
        .await
        .unwrap();

    assert_eq!(response.content_source, Some(ContentSource::Primary));
    assert_eq!(response.package_id, "Acme.Widget");
    assert_eq!(response.examples.len(), 1);
    assert_eq!(response.examples[0].title, "Quick start");

    let query = ContentQuery {
        include_examples: false,
        ..ContentQuery::new("Acme.Widget")
    };
    let without = h.service.fetch_content(&query).await.unwrap();
    assert!(without.examples.is_empty());
}

#[tokio::test]
async fn test_content_cache_hit() {
    let h = harness(
        widget_registry().with_readme("Acme.Widget", "1.1.0", "Hello World"),
        StaticHost::new(),
    );
    let query = ContentQuery::new("Acme.Widget");

    let first = h.service.fetch_content(&query).await.unwrap();
    let second = h.service.fetch_content(&query).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.registry.calls().versions, 1);
    assert_eq!(h.registry.calls().readme, 1);
    assert_eq!(h.service.cache_stats().hits, 1);
}

#[tokio::test]
async fn test_explicit_and_missing_versions() {
    let h = harness(
        widget_registry().with_readme("Acme.Widget", "2.0.0-beta", "Beta docs"),
        StaticHost::new(),
    );

    let query = ContentQuery {
        version: "2.0.0-BETA".to_string(),
        ..ContentQuery::new("Acme.Widget")
    };
    let beta = h.service.fetch_content(&query).await.unwrap();
    assert_eq!(beta.version, "2.0.0-beta");
    assert_eq!(beta.content, "Beta docs");

    let query = ContentQuery {
        version: "9.9.9".to_string(),
        ..ContentQuery::new("Acme.Widget")
    };
    let missing = h.service.fetch_content(&query).await.unwrap();
    assert!(!missing.exists);
    assert_eq!(missing.content_source, None);
}

#[tokio::test]
async fn test_not_found_is_cached() {
    let h = harness(StaticRegistry::new(), StaticHost::new());
    let query = ContentQuery::new("Does.Not.Exist");

    let first = h.service.fetch_content(&query).await.unwrap();
    let second = h.service.fetch_content(&query).await.unwrap();

    assert!(!first.exists);
    assert_eq!(first, second);
    assert_eq!(h.registry.calls().versions, 1);
    assert_eq!(h.registry.calls().readme, 0);
}

#[tokio::test]
async fn test_info_not_found_is_cached() {
    let h = harness(StaticRegistry::new(), StaticHost::new());
    let query = InfoQuery::new("Ghost.Package");

    let first = h.service.fetch_info(&query).await.unwrap();
    let second = h.service.fetch_info(&query).await.unwrap();

    assert!(!first.exists);
    assert!(!second.exists);
    assert_eq!(first.description, second.description);
    assert_eq!(h.registry.calls().versions, 1);
    assert_eq!(h.registry.calls().metadata, 0);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_expires_sooner() {
    let h = harness(StaticRegistry::new(), StaticHost::new());
    let h = Harness {
        service: h.service.with_ttls(CacheTtls {
            content: Duration::from_secs(3600),
            search: Duration::from_secs(900),
            not_found: Duration::from_secs(60),
        }),
        ..h
    };
    let query = InfoQuery::new("Does.Not.Exist");

    assert!(!h.service.fetch_info(&query).await.unwrap().exists);
    tokio::time::advance(Duration::from_secs(61)).await;
    assert!(!h.service.fetch_info(&query).await.unwrap().exists);

    assert_eq!(h.registry.calls().versions, 2);
}

#[tokio::test]
async fn test_validation_happens_before_any_io() {
    let h = harness(widget_registry(), StaticHost::new());

    let err = h
        .service
        .fetch_content(&ContentQuery::new("bad id!"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidPackageId);

    let query = ContentQuery {
        version: "not-a-version".to_string(),
        ..ContentQuery::new("Acme.Widget")
    };
    assert_eq!(
        h.service.fetch_content(&query).await.unwrap_err().code(),
        ErrorCode::InvalidVersion
    );

    let query = SearchQuery {
        limit: 0,
        ..SearchQuery::new("json")
    };
    assert_eq!(h.service.search(&query).await.unwrap_err().code(), ErrorCode::InvalidLimit);

    let query = SearchQuery {
        popularity: Some(1.5),
        ..SearchQuery::new("json")
    };
    assert_eq!(
        h.service.search(&query).await.unwrap_err().code(),
        ErrorCode::InvalidThreshold
    );

    assert_eq!(h.registry.calls().total(), 0);
    assert_eq!(h.service.cache_stats().entries, 0);
}

#[tokio::test]
async fn test_upstream_failure_is_typed_and_not_cached() {
    let registry = widget_registry().fail("versions", ErrorKind::ServerUnavailable { status: 503 });
    let h = harness(registry, StaticHost::new());

    let err = h
        .service
        .fetch_info(&InfoQuery::new("Acme.Widget"))
        .await
        .unwrap_err();

    assert!(matches!(err, QueryError::Upstream(_)));
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(h.registry.calls().versions, 3);

    h.registry.clear_failures();
    let info = h.service.fetch_info(&InfoQuery::new("Acme.Widget")).await.unwrap();
    assert!(info.exists);
}

#[tokio::test]
async fn test_info_with_dependencies() {
    let mut manifest = PackageManifest::new("Acme.Widget", "1.1.0");
    manifest.description = Some("Widgets for every occasion".to_string());
    manifest.license_expression = Some("MIT".to_string());
    manifest.dependency_groups = vec![DependencyGroup::new(
        Some("net8.0".to_string()),
        vec![Dependency::new("Acme.Core", Some("[1.0.0, )".to_string()))],
    )];

    let h = harness(widget_registry().with_manifest(manifest), StaticHost::new());
    let info = h.service.fetch_info(&InfoQuery::new("Acme.Widget")).await.unwrap();

    assert!(info.exists);
    assert_eq!(info.latest_version, "1.1.0");
    assert_eq!(info.description, "Widgets for every occasion");
    assert_eq!(info.license.as_deref(), Some("MIT"));
    assert_eq!(info.versions_count, 3);
    assert_eq!(info.downloads, 1234);
    assert_eq!(info.dependencies.as_ref().map(Vec::len), Some(1));
    assert_eq!(info.dev_dependencies, None);

    let query = InfoQuery {
        include_dependencies: false,
        include_dev_dependencies: true,
        ..InfoQuery::new("Acme.Widget")
    };
    let info = h.service.fetch_info(&query).await.unwrap();
    assert_eq!(info.dependencies, None);
    assert_eq!(info.dev_dependencies, Some(Vec::new()));
}

#[tokio::test]
async fn test_info_for_development_dependency_package() {
    let mut manifest = PackageManifest::new("Acme.Widget", "1.1.0");
    manifest.development_dependency = true;
    manifest.dependency_groups = vec![DependencyGroup::new(
        None,
        vec![Dependency::new("Acme.Analyzers", None)],
    )];

    let h = harness(widget_registry().with_manifest(manifest), StaticHost::new());
    let query = InfoQuery {
        include_dev_dependencies: true,
        ..InfoQuery::new("Acme.Widget")
    };
    let info = h.service.fetch_info(&query).await.unwrap();

    assert_eq!(info.dependencies, Some(Vec::new()));
    assert_eq!(info.dev_dependencies.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_search_popularity_filter() {
    let registry = StaticRegistry::new().with_search_results(vec![
        searchable("Json.B", 50),
        searchable("Json.A", 100),
        searchable("Json.C", 10),
    ]);
    let h = harness(registry, StaticHost::new());

    let query = SearchQuery {
        popularity: Some(0.6),
        ..SearchQuery::new("json")
    };
    let response = h.service.search(&query).await.unwrap();

    assert_eq!(response.query, "json");
    assert_eq!(response.total_count, 1);
    assert_eq!(response.results[0].package_id, "Json.A");
    assert_eq!(response.results[0].total_downloads, 100);

    h.service.search(&query).await.unwrap();
    assert_eq!(h.registry.calls().search, 1);
}

#[tokio::test]
async fn test_search_sorted_by_downloads() {
    let registry = StaticRegistry::new().with_search_results(vec![
        searchable("Json.B", 50),
        searchable("Json.C", 10),
        searchable("Json.A", 100),
    ]);
    let h = harness(registry, StaticHost::new());

    let response = h.service.search(&SearchQuery::new("json")).await.unwrap();
    let downloads: Vec<u64> = response.results.iter().map(|r| r.total_downloads).collect();
    assert_eq!(downloads, vec![100, 50, 10]);
}

#[tokio::test]
async fn test_search_matches_tags() {
    let mut tagged = searchable("Acme.Logger", 20);
    tagged.description = Some("Sinks and enrichers".to_string());
    tagged.tags = vec!["Logging".to_string()];
    let registry =
        StaticRegistry::new().with_search_results(vec![searchable("Json.A", 100), tagged]);
    let h = harness(registry, StaticHost::new());

    let response = h.service.search(&SearchQuery::new("logging")).await.unwrap();

    assert_eq!(response.total_count, 1);
    assert_eq!(response.results[0].package_id, "Acme.Logger");
    assert_eq!(response.results[0].tags, vec!["Logging".to_string()]);
}

#[tokio::test]
async fn test_shutdown_clears_cache() {
    let h = harness(widget_registry(), StaticHost::new());
    h.service.fetch_info(&InfoQuery::new("Acme.Widget")).await.unwrap();
    assert_eq!(h.service.cache_stats().entries, 1);

    h.service.shutdown();
    assert_eq!(h.service.cache_stats().entries, 0);
}
