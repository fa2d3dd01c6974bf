// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Baseline and trend persistence through whole engine runs.

use botcheck_agent::models::config::AuditConfig;
use botcheck_agent::services::engine::run_audit;
use std::fs;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_stub_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("content")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_baseline_file_is_written_per_domain() {
    let server = start_stub_site().await;
    let reports = tempfile::tempdir().unwrap();
    let config = AuditConfig {
        target_url: server.uri(),
        reports_root: reports.path().to_path_buf(),
        ..AuditConfig::default()
    };

    run_audit(&config).await;

    let baseline_path = reports.path().join("bot_baselines").join("127.0.0.1.json");
    let text = fs::read_to_string(&baseline_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value["updated_at"].is_string());
    assert_eq!(value["summary"]["total"], 9);
    assert_eq!(value["summary"]["indexable"], 9);
}

#[tokio::test]
async fn test_baseline_disabled_suppresses_write_only() {
    let server = start_stub_site().await;
    let reports = tempfile::tempdir().unwrap();
    let config = AuditConfig {
        target_url: server.uri(),
        reports_root: reports.path().to_path_buf(),
        baseline_enabled: false,
        ..AuditConfig::default()
    };

    let first = run_audit(&config).await;
    let second = run_audit(&config).await;

    let baseline_path = reports.path().join("bot_baselines").join("127.0.0.1.json");
    assert!(!baseline_path.exists());
    assert!(!first.results.baseline_diff.available);
    assert!(!second.results.baseline_diff.available);

    // Trend history still accumulates
    assert_eq!(second.results.trend.history_count, 2);
    let trend_path = reports.path().join("bot_trends").join("127.0.0.1.json");
    assert!(trend_path.exists());
}

#[tokio::test]
async fn test_trend_file_shape_and_order() {
    let server = start_stub_site().await;
    let reports = tempfile::tempdir().unwrap();
    let config = AuditConfig {
        target_url: server.uri(),
        reports_root: reports.path().to_path_buf(),
        ..AuditConfig::default()
    };

    let first = run_audit(&config).await;
    let second = run_audit(&config).await;
    let third = run_audit(&config).await;

    let trend_path = reports.path().join("bot_trends").join("127.0.0.1.json");
    let text = fs::read_to_string(&trend_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let history = value["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);

    // Newest first; timestamps are unique and descending
    let timestamps: Vec<&str> = history
        .iter()
        .map(|s| s["timestamp"].as_str().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted);
    let unique: std::collections::BTreeSet<&str> = timestamps.iter().copied().collect();
    assert_eq!(unique.len(), timestamps.len());

    assert_eq!(first.results.trend.history_count, 1);
    assert_eq!(second.results.trend.history_count, 2);
    assert_eq!(third.results.trend.history_count, 3);
    assert_eq!(
        third.results.trend.latest.as_ref().unwrap().indexable,
        9
    );
    assert!(third.results.trend.delta_vs_previous.is_some());

    // Active profile identifiers travel with every snapshot
    assert_eq!(history[0]["retry_profile"], "standard");
    assert_eq!(history[0]["criticality_profile"], "balanced");
    assert_eq!(history[0]["sla_profile"], "standard");
}

#[tokio::test]
async fn test_runs_for_different_domains_do_not_collide() {
    let server_a = start_stub_site().await;
    let reports = tempfile::tempdir().unwrap();

    // Same IP, different port: the slug includes the host only, so both runs
    // share a slug for 127.0.0.1. Use a hostname variant to get a second slug.
    let config_a = AuditConfig {
        target_url: server_a.uri(),
        reports_root: reports.path().to_path_buf(),
        ..AuditConfig::default()
    };
    run_audit(&config_a).await;

    let localhost_url = server_a.uri().replace("127.0.0.1", "localhost");
    let config_b = AuditConfig {
        target_url: localhost_url,
        reports_root: reports.path().to_path_buf(),
        ..AuditConfig::default()
    };
    run_audit(&config_b).await;

    assert!(reports
        .path()
        .join("bot_baselines")
        .join("127.0.0.1.json")
        .exists());
    assert!(reports
        .path()
        .join("bot_baselines")
        .join("localhost.json")
        .exists());
}
