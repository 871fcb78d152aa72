//! Unit tests for the NuGet client

use super::*;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> NuGetClient {
    NuGetClient::with_config(
        NuGetEndpoints::from_base(&server.uri()),
        Duration::from_secs(5),
        DEFAULT_USER_AGENT,
    )
    .unwrap()
}

#[tokio::test]
async fn test_client_creation() {
    let client = NuGetClient::new().unwrap();
    assert_eq!(client.endpoints(), &NuGetEndpoints::default());
    assert_eq!(
        client.endpoints().flat_container,
        "https://api.nuget.org/v3-flatcontainer"
    );
}

#[test]
fn test_encode_segment() {
    assert_eq!(encode_segment("Newtonsoft.Json"), "newtonsoft.json");
    assert_eq!(encode_segment("1.0.0-Beta"), "1.0.0-beta");
    assert_eq!(encode_segment("1.0.0+build"), "1.0.0%2Bbuild");
}

#[tokio::test]
async fn test_fetch_versions_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3-flatcontainer/newtonsoft.json/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "versions": ["12.0.3", "13.0.1", "13.0.3"]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let versions = client.fetch_versions("Newtonsoft.Json").await.unwrap();

    assert_eq!(
        versions.found(),
        Some(vec!["12.0.3".to_string(), "13.0.1".to_string(), "13.0.3".to_string()])
    );
}

#[tokio::test]
async fn test_fetch_versions_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3-flatcontainer/missing.package/index.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let versions = client.fetch_versions("Missing.Package").await.unwrap();
    assert!(!versions.is_found());
    assert!(!client.fetch_exists("Missing.Package").await.unwrap());
}

#[tokio::test]
async fn test_fetch_metadata_from_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("q", "packageid:Serilog"))
        .and(query_param("take", "1"))
        .and(query_param("semVerLevel", "2.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalHits": 1,
            "data": [{
                "id": "Serilog",
                "version": "3.1.1",
                "description": "Simple .NET logging with fully-structured events",
                "authors": ["Serilog Contributors"],
                "tags": ["serilog", "logging"],
                "totalDownloads": 1000,
                "verified": true,
                "projectUrl": "https://github.com/serilog/serilog"
            }]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let metadata = client.fetch_metadata("Serilog").await.unwrap().found().unwrap();

    assert_eq!(metadata.id, "Serilog");
    assert_eq!(metadata.version, "3.1.1");
    assert_eq!(metadata.total_downloads, 1000);
    assert!(metadata.verified);
    assert_eq!(
        metadata.project_url.as_deref(),
        Some("https://github.com/serilog/serilog")
    );
}

#[tokio::test]
async fn test_fetch_metadata_no_exact_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalHits": 1,
            "data": [{ "id": "Serilog.Sinks.Console", "version": "5.0.0" }]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(!client.fetch_metadata("Serilog").await.unwrap().is_found());
}

#[tokio::test]
async fn test_fetch_manifest_follows_catalog_entry() {
    let mock_server = MockServer::start().await;
    let catalog_url = format!("{}/catalog/serilog.3.1.1.json", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/v3/registration/serilog/3.1.1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "catalogEntry": catalog_url,
            "listed": true
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/catalog/serilog.3.1.1.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "Serilog",
            "version": "3.1.1",
            "description": "Structured logging",
            "authors": "Serilog Contributors",
            "licenseExpression": "Apache-2.0",
            "dependencyGroups": [
                { "targetFramework": ".NETStandard2.0", "dependencies": [
                    { "id": "System.Diagnostics.DiagnosticSource", "range": "[7.0.2, )" }
                ]}
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let manifest = client
        .fetch_manifest("Serilog", "3.1.1")
        .await
        .unwrap()
        .found()
        .unwrap();

    assert_eq!(manifest.id, "Serilog");
    assert_eq!(manifest.authors, vec!["Serilog Contributors".to_string()]);
    assert_eq!(manifest.license(), Some("Apache-2.0"));
    assert_eq!(manifest.dependency_groups.len(), 1);
    assert_eq!(
        manifest.dependency_groups[0].dependencies[0].id,
        "System.Diagnostics.DiagnosticSource"
    );
}

#[tokio::test]
async fn test_fetch_manifest_missing_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/registration/serilog/9.9.9.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    assert!(!client.fetch_manifest("Serilog", "9.9.9").await.unwrap().is_found());
}

#[tokio::test]
async fn test_fetch_readme() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3-flatcontainer/serilog/3.1.1/readme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Serilog\n\nLogging."))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let readme = client.fetch_readme("Serilog", "3.1.1").await.unwrap();
    assert_eq!(readme.found().as_deref(), Some("# Serilog\n\nLogging."));

    let missing = client.fetch_readme("Serilog", "1.0.0").await.unwrap();
    assert!(!missing.is_found());
}

#[tokio::test]
async fn test_search_passes_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("q", "json"))
        .and(query_param("take", "2"))
        .and(query_param("prerelease", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalHits": 2,
            "data": [
                { "id": "Newtonsoft.Json", "version": "13.0.3", "totalDownloads": 100 },
                { "id": "System.Text.Json", "version": "8.0.0", "totalDownloads": 50 }
            ]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let results = client.search("json", 2, false).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "Newtonsoft.Json");
    assert_eq!(results[1].total_downloads, 50);
}

#[tokio::test]
async fn test_server_error_is_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.fetch_versions("Serilog").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServerUnavailable { status: 503 });
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server).await;
    let err = client.search("json", 5, false).await.unwrap_err();

    assert_eq!(
        err.kind(),
        ErrorKind::RateLimited {
            retry_after_secs: Some(7)
        }
    );
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = NuGetClient::with_config(
        NuGetEndpoints::from_base(&mock_server.uri()),
        Duration::from_millis(100),
        DEFAULT_USER_AGENT,
    )
    .unwrap();

    let err = client.fetch_readme("Serilog", "3.1.1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let client = NuGetClient::with_config(
        NuGetEndpoints::from_base("http://127.0.0.1:1"),
        Duration::from_secs(5),
        DEFAULT_USER_AGENT,
    )
    .unwrap();

    let err = client.fetch_versions("Serilog").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}
