use std::{net::TcpListener, time::Duration};

use axum_test::TestServer;
use chrono::Utc;
use mockito::Matcher;
use vault_exporter_core::{config::VaultConfig, ServerInfo};
use vault_exporter_metrics::{metrics_router, LandingPage};
use vault_exporter_server::{initialize_metrics, VaultClient};

/// Helper to describe the build under test
fn server_info() -> ServerInfo {
    ServerInfo {
        version: "0.1.0".to_string(),
        branch: "main".to_string(),
        commit_hash: "1a2b3c4".to_string(),
        rust_version: "1.87.0".to_string(),
        build_time: "2024-05-01 10:00:00 +00:00".to_string(),
        start_time: Utc::now(),
    }
}

/// Helper to create the test server scraping the Vault at `address`
fn create_test_server(address: String) -> TestServer {
    let vault_client = VaultClient::new(&VaultConfig {
        address,
        timeout: Duration::from_secs(2),
        ..VaultConfig::default()
    })
    .expect("Failed to create Vault client");

    let server_info = server_info();
    let metrics = initialize_metrics(vault_client, &server_info).expect("Failed to register");
    let landing_page =
        LandingPage { title: "Vault Exporter".to_string(), build_info: server_info.to_string() };

    TestServer::new(metrics_router("/metrics", landing_page, metrics))
        .expect("Failed to create test server")
}

const BUILD_INFO: &str = "vault_exporter_build_info";

/// Samples derived from Vault health, leaving out the build info of the process
fn vault_lines(body: &str) -> Vec<&str> {
    body.lines()
        .filter(|line| line.starts_with("vault_") && !line.starts_with(BUILD_INFO))
        .collect()
}

#[tokio::test]
async fn test_scrape_healthy_vault() {
    let mut vault = mockito::Server::new_async().await;
    let mock = vault
        .mock("GET", "/v1/sys/health")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"initialized":true,"sealed":false,"standby":false,"version":"1.4.0","cluster_name":"c1","cluster_id":"id1"}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let server = create_test_server(vault.url());
    let response = server.get("/metrics").await;

    response.assert_status_ok();
    let body = response.text();
    for expected in [
        "vault_up 1",
        "vault_initialized 1",
        "vault_sealed 0",
        "vault_standby 0",
        r#"vault_version{version="1.4.0"} 1"#,
        r#"vault_cluster_name{cluster_name="c1"} 1"#,
        r#"vault_cluster_id{cluster_id="id1"} 1"#,
    ] {
        assert!(body.lines().any(|line| line == expected), "missing `{expected}` in:\n{body}");
    }
    assert_eq!(vault_lines(&body).len(), 7);
    assert!(body.contains("# TYPE vault_up gauge"));
    assert!(body.contains("# HELP vault_sealed Is the Vault node sealed."));
    assert!(body.contains(r#"vault_exporter_build_info{branch="main""#));
    assert_eq!(body.lines().filter(|line| line.starts_with(BUILD_INFO)).count(), 1);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_scrape_sealed_standby_vault() {
    let mut vault = mockito::Server::new_async().await;
    let _mock = vault
        .mock("GET", "/v1/sys/health")
        .match_query(Matcher::UrlEncoded("sealedcode".into(), "299".into()))
        .with_status(299)
        .with_body(r#"{"initialized":true,"sealed":true,"standby":true,"version":"1.4.0"}"#)
        .create_async()
        .await;

    let server = create_test_server(vault.url());
    let body = server.get("/metrics").await.text();

    assert!(body.lines().any(|line| line == "vault_up 1"));
    assert!(body.lines().any(|line| line == "vault_sealed 1"));
    assert!(body.lines().any(|line| line == "vault_standby 1"));
    assert!(body.lines().any(|line| line == r#"vault_cluster_id{cluster_id=""} 1"#));
}

#[tokio::test]
async fn test_scrape_vault_server_error() {
    let mut vault = mockito::Server::new_async().await;
    let _mock = vault
        .mock("GET", "/v1/sys/health")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"errors":["internal error"]}"#)
        .create_async()
        .await;

    let server = create_test_server(vault.url());
    let response = server.get("/metrics").await;

    response.assert_status_ok();
    assert_eq!(vault_lines(&response.text()), vec!["vault_up 0"]);
}

#[tokio::test]
async fn test_scrape_vault_invalid_json() {
    let mut vault = mockito::Server::new_async().await;
    let _mock = vault
        .mock("GET", "/v1/sys/health")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("{\"initialized\":")
        .create_async()
        .await;

    let server = create_test_server(vault.url());

    assert_eq!(vault_lines(&server.get("/metrics").await.text()), vec!["vault_up 0"]);
}

#[tokio::test]
async fn test_scrape_vault_connection_refused() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.local_addr().expect("Failed to get local address")
    };

    let server = create_test_server(format!("http://{address}"));
    let response = server.get("/metrics").await;

    response.assert_status_ok();
    let body = response.text();
    assert_eq!(vault_lines(&body), vec!["vault_up 0"]);
    assert!(body.lines().any(|line| line.starts_with(BUILD_INFO) && line.ends_with(" 1")));
}

#[tokio::test]
async fn test_each_scrape_queries_vault_once() {
    let mut vault = mockito::Server::new_async().await;
    let mock = vault
        .mock("GET", "/v1/sys/health")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            r#"{"initialized":true,"sealed":false,"standby":false,"version":"1.4.0","cluster_name":"c1","cluster_id":"id1"}"#,
        )
        .expect(3)
        .create_async()
        .await;

    let server = create_test_server(vault.url());
    let first = server.get("/metrics").await.text();
    let second = server.get("/metrics").await.text();
    let third = server.get("/metrics").await.text();

    assert_eq!(vault_lines(&first), vault_lines(&second));
    assert_eq!(vault_lines(&second), vault_lines(&third));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_landing_page() {
    let server = create_test_server("http://127.0.0.1:8200".to_string());
    let response = server.get("/").await;

    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("<h1>Vault Exporter</h1>"));
    assert!(body.contains("href='/metrics'"));
    assert!(body.contains("version=0.1.0, branch=main, revision=1a2b3c4"));
}

#[tokio::test]
async fn test_initialize_metrics_registers_catalog() {
    let vault_client = VaultClient::new(&VaultConfig::default()).expect("Failed to create client");
    let metrics = initialize_metrics(vault_client, &server_info()).expect("Failed to register");

    assert_eq!(
        metrics.metric_names(),
        vec![
            "vault_cluster_id",
            "vault_cluster_name",
            "vault_exporter_build_info",
            "vault_initialized",
            "vault_sealed",
            "vault_standby",
            "vault_up",
            "vault_version",
        ]
    );
}
