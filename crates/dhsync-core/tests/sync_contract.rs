//! Contract Test: Lookup-Driven Sync
//!
//! Verifies `list_records`, `published_addresses` and `sync`.
//!
//! Constraints verified:
//! - Only A records for exactly the requested hostname are considered
//! - A hostname already pointing at the target issues no write
//! - A listing rejection is surfaced as an error with no progress

mod common;

use common::*;
use dhsync_core::traits::HttpResponse;
use dhsync_core::{Error, ReconcileState, SyncPlan};
use std::net::Ipv4Addr;
use tokio_test::{assert_err, assert_ok};

fn listing(records: serde_json::Value) -> Scripted {
    Ok(HttpResponse::new(
        200,
        serde_json::json!({ "result": "success", "data": records }).to_string(),
    ))
}

#[tokio::test]
async fn list_records_decodes_every_entry() {
    let fetcher = ScriptedFetcher::new(vec![listing(serde_json::json!([
        { "record": "home.example.com", "zone": "example.com", "type": "A",
          "value": "198.51.100.20", "editable": "1", "comment": "", "account_id": "1" },
        { "record": "example.com", "zone": "example.com", "type": "MX",
          "value": "mx1.example.net", "editable": "0", "comment": "", "account_id": "1" }
    ]))]);
    let engine = engine_with(fetcher);

    let records = assert_ok!(engine.list_records().await);

    assert_eq!(records.len(), 2);
    assert!(records[0].is_editable());
    assert_eq!(records[1].record_type, "MX");
}

#[tokio::test]
async fn published_addresses_filters_name_and_type() {
    let fetcher = ScriptedFetcher::new(vec![listing(serde_json::json!([
        { "record": "home.example.com", "type": "A", "value": "198.51.100.20" },
        { "record": "Home.Example.com.", "type": "A", "value": "198.51.100.21" },
        { "record": "home.example.com", "type": "AAAA", "value": "2001:db8::1" },
        { "record": "www.example.com", "type": "A", "value": "192.0.2.80" }
    ]))]);
    let engine = engine_with(fetcher);

    let addresses = assert_ok!(engine.published_addresses(DOMAIN).await);

    assert_eq!(
        addresses,
        vec![
            Ipv4Addr::new(198, 51, 100, 20),
            Ipv4Addr::new(198, 51, 100, 21)
        ]
    );
}

#[tokio::test]
async fn listing_rejection_is_an_error() {
    let engine = engine_with(ScriptedFetcher::new(vec![rejected("invalid_api_key")]));

    let err = assert_err!(engine.list_records().await);

    match err {
        Error::Rejected { command, detail } => {
            assert_eq!(command, "dns-list_records");
            assert_eq!(detail, "invalid_api_key");
        }
        other => panic!("expected a rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn sync_adds_when_nothing_is_published() {
    let provider = FakeProvider::new();
    let engine = engine_with(FakeProvider::sharing_with(&provider));

    let report = assert_ok!(engine.sync(DOMAIN, NEW_IP, None).await);

    assert_eq!(report.plan, SyncPlan::Add);
    assert_eq!(report.state(), ReconcileState::Applied);
    assert_eq!(provider.published(DOMAIN), vec![NEW_IP.to_string()]);
}

#[tokio::test]
async fn sync_replaces_the_published_address() {
    let provider = FakeProvider::new()
        .with_record(DOMAIN, OLD_IP)
        .with_record("www.example.com", OLD_IP);
    let engine = engine_with(FakeProvider::sharing_with(&provider));

    let report = assert_ok!(engine.sync(DOMAIN, NEW_IP, Some("dhsync")).await);

    assert_eq!(
        report.plan,
        SyncPlan::Replace {
            old: OLD_IP,
            stale: Vec::new()
        }
    );
    assert_eq!(report.state(), ReconcileState::Applied);
    assert_eq!(provider.published(DOMAIN), vec![NEW_IP.to_string()]);
    assert_eq!(provider.published("www.example.com"), vec![OLD_IP.to_string()]);
}

#[tokio::test]
async fn sync_is_a_no_op_when_up_to_date() {
    let provider = FakeProvider::new().with_record(DOMAIN, NEW_IP);
    let engine = engine_with(FakeProvider::sharing_with(&provider));

    let report = assert_ok!(engine.sync(DOMAIN, NEW_IP, None).await);

    assert_eq!(report.plan, SyncPlan::UpToDate);
    assert_eq!(report.state(), ReconcileState::Applied);
    assert_eq!(provider.call_count(), 1, "only the listing is issued");
}

#[tokio::test]
async fn sync_listing_failure_reports_no_progress() {
    let fetcher = ScriptedFetcher::new(vec![connection_refused()]);
    let engine = engine_with(ScriptedFetcher::sharing_with(&fetcher));

    let err = assert_err!(engine.sync(DOMAIN, NEW_IP, None).await);

    assert!(err.source.is_transport());
    assert_eq!(err.partial.state(), ReconcileState::NotApplied);
    assert_eq!(fetcher.call_count(), 1);
}
