//! Test doubles and common utilities for the contract tests
//!
//! Both fetchers stand in for the raw HTTP primitive, so everything above
//! it (query building, rate-limit policy, decoding, sequencing) runs for real.

#![allow(dead_code)]

use dhsync_core::error::TransportError;
use dhsync_core::traits::{HttpFetch, HttpResponse};
use dhsync_core::{ApiConfig, ReconciliationEngine};
use std::collections::{BTreeSet, VecDeque};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "home.example.com";
pub const OLD_IP: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 20);
pub const NEW_IP: Ipv4Addr = Ipv4Addr::new(203, 0, 113, 10);
pub const API_KEY: &str = "test-api-key";

/// A scripted response: either an HTTP exchange or a transport failure
pub type Scripted = Result<HttpResponse, TransportError>;

/// `200 OK` with a success envelope
pub fn success(data: &str) -> Scripted {
    Ok(HttpResponse::new(
        200,
        serde_json::json!({ "result": "success", "data": data }).to_string(),
    ))
}

/// `200 OK` with an error envelope
pub fn rejected(data: &str) -> Scripted {
    Ok(HttpResponse::new(
        200,
        serde_json::json!({ "result": "error", "data": data }).to_string(),
    ))
}

/// `429 Too Many Requests`
pub fn rate_limited() -> Scripted {
    Ok(HttpResponse::new(
        429,
        r#"{"result":"error","data":"rate_limit_exceeded"}"#,
    ))
}

/// A connection failure
pub fn connection_refused() -> Scripted {
    Err(TransportError::request(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    )))
}

/// A fetcher that replays a fixed script, one entry per call
pub struct ScriptedFetcher {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    call_count: Arc<AtomicUsize>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            call_count: Arc::new(AtomicUsize::new(0)),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a fetcher that shares script and counters with `other`
    pub fn sharing_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            call_count: Arc::clone(&other.call_count),
            urls: Arc::clone(&other.urls),
        }
    }

    /// Number of requests made
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requested URLs, in order
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    /// `cmd` parameter of each request, in order
    pub fn commands(&self) -> Vec<String> {
        self.urls()
            .iter()
            .map(|u| query_value(u, "cmd").unwrap_or_default())
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpFetch for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("fetcher called more often than scripted")
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// An in-memory stand-in for the provider's record store
///
/// Rejects duplicate adds and removals of absent records the way the real
/// API does.
pub struct FakeProvider {
    records: Arc<Mutex<BTreeSet<(String, String)>>>,
    call_count: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeSet::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Pre-publish an A record
    pub fn with_record(self, domain: &str, address: Ipv4Addr) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert((domain.to_string(), address.to_string()));
        self
    }

    pub fn sharing_with(other: &Self) -> Self {
        Self {
            records: Arc::clone(&other.records),
            call_count: Arc::clone(&other.call_count),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Addresses published for `domain`
    pub fn published(&self, domain: &str) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(record, _)| record == domain)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpFetch for FakeProvider {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if query_value(url, "key").as_deref() != Some(API_KEY) {
            return rejected("invalid_api_key");
        }

        let record = query_value(url, "record").unwrap_or_default();
        let value = query_value(url, "value").unwrap_or_default();
        let mut records = self.records.lock().unwrap();

        match query_value(url, "cmd").as_deref() {
            Some("dns-add_record") => {
                if records.insert((record, value)) {
                    success("record_added")
                } else {
                    rejected("record_already_exists_remove_first")
                }
            }
            Some("dns-remove_record") => {
                if records.remove(&(record, value)) {
                    success("record_removed")
                } else {
                    rejected("no_such_record")
                }
            }
            Some("dns-list_records") => {
                let data: Vec<serde_json::Value> = records
                    .iter()
                    .map(|(record, value)| {
                        serde_json::json!({
                            "account_id": "1",
                            "comment": "",
                            "editable": "1",
                            "record": record,
                            "type": "A",
                            "value": value,
                            "zone": "example.com",
                        })
                    })
                    .collect();
                Ok(HttpResponse::new(
                    200,
                    serde_json::json!({ "result": "success", "data": data }).to_string(),
                ))
            }
            _ => rejected("no_such_cmd"),
        }
    }

    fn name(&self) -> &'static str {
        "fake-provider"
    }
}

/// Value of query parameter `key` in `url`
pub fn query_value(url: &str, key: &str) -> Option<String> {
    let url = url::Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Configuration used by every contract test
pub fn test_config() -> ApiConfig {
    ApiConfig::new(API_KEY)
}

/// Engine backed by `fetcher`
pub fn engine_with(fetcher: impl HttpFetch + 'static) -> ReconciliationEngine {
    ReconciliationEngine::from_parts(Box::new(fetcher), test_config())
        .expect("engine construction succeeds")
}
