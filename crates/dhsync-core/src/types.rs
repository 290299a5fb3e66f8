//! Value types exchanged between the transport, the engine and callers
//!
//! Everything here is constructed per call and never persisted.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Record type managed by this crate
pub const RECORD_TYPE_A: &str = "A";

/// Command adding a DNS record
pub const CMD_ADD_RECORD: &str = "dns-add_record";

/// Command removing a DNS record
pub const CMD_REMOVE_RECORD: &str = "dns-remove_record";

/// Command listing every DNS record of the account
pub const CMD_LIST_RECORDS: &str = "dns-list_records";

/// Provider verdict on a single command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// `"result": "success"`
    Success,
    /// `"result": "error"`
    Failure,
}

/// Outcome of one remote command
///
/// A `Failure` status is a successful evaluation with a negative verdict
/// (e.g. the record already exists). Calls that could not be evaluated fail
/// with [`crate::Error`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Provider verdict
    pub status: CommandStatus,
    /// Confirmation token on success, error token on failure
    pub detail: String,
}

impl CommandOutcome {
    /// Successful outcome
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            detail: detail.into(),
        }
    }

    /// Rejected outcome
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

/// Parameters of one remote command
///
/// Keys are unique. Entries are kept sorted so the same parameters always
/// produce the same query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandParameters {
    entries: BTreeMap<String, String>,
}

impl CommandParameters {
    /// Parameters for `command` with no arguments
    pub fn new(command: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("cmd".to_string(), command.into());
        Self { entries }
    }

    /// Set `key` to `value`, replacing any earlier value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// `dns-add_record` for an A record
    pub fn add_record(domain: &str, address: Ipv4Addr, comment: Option<&str>) -> Self {
        Self::record_command(CMD_ADD_RECORD, domain, address, comment)
    }

    /// `dns-remove_record` for an A record
    pub fn remove_record(domain: &str, address: Ipv4Addr, comment: Option<&str>) -> Self {
        Self::record_command(CMD_REMOVE_RECORD, domain, address, comment)
    }

    /// `dns-list_records`
    pub fn list_records() -> Self {
        Self::new(CMD_LIST_RECORDS)
    }

    fn record_command(
        command: &str,
        domain: &str,
        address: Ipv4Addr,
        comment: Option<&str>,
    ) -> Self {
        let params = Self::new(command)
            .with("record", domain)
            .with("type", RECORD_TYPE_A)
            .with("value", address.to_string());

        match comment {
            Some(comment) if !comment.is_empty() => params.with("comment", comment),
            _ => params,
        }
    }

    /// Command name (`cmd`)
    pub fn command(&self) -> &str {
        self.get("cmd").unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Iterate over `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Three-way summary of a replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    /// New address added and old address removed
    Applied,
    /// New address added, old address still published
    PartiallyApplied,
    /// New address not added; the old record is untouched
    NotApplied,
}

/// Caller-facing result of a replace
///
/// `remove_outcome` is only ever set when `add_outcome` is a success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Verdict on adding the new address
    pub add_outcome: Option<CommandOutcome>,
    /// Verdict on removing the old address
    pub remove_outcome: Option<CommandOutcome>,
}

impl ReconcileResult {
    pub fn state(&self) -> ReconcileState {
        match (&self.add_outcome, &self.remove_outcome) {
            (Some(add), Some(remove)) if add.is_success() && remove.is_success() => {
                ReconcileState::Applied
            }
            (Some(add), _) if add.is_success() => ReconcileState::PartiallyApplied,
            _ => ReconcileState::NotApplied,
        }
    }

    /// Whether the hostname may now resolve to both addresses
    pub fn needs_cleanup(&self) -> bool {
        self.state() == ReconcileState::PartiallyApplied
    }
}

/// One entry of `dns-list_records`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    /// Fully qualified name, e.g. `home.example.com`
    pub record: String,
    /// Zone the record lives in, e.g. `example.com`
    #[serde(default)]
    pub zone: String,
    /// Record value, an IP address for A records
    pub value: String,
    /// `"0"` or `"1"`
    #[serde(default)]
    pub editable: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub account_id: String,
}

impl DnsRecord {
    pub fn is_editable(&self) -> bool {
        self.editable == "1"
    }

    /// Parsed value of an A record
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        if self.record_type != RECORD_TYPE_A {
            return None;
        }
        self.value.parse().ok()
    }
}
