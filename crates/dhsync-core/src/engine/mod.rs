//! Reconciliation engine
//!
//! The ReconciliationEngine is responsible for:
//! - Adding and removing single A records
//! - Sequencing add-then-remove into a safe replace
//! - Reporting exactly how far a replace got
//!
//! ## Replace state machine
//!
//! ```text
//! Start ──add──▶ Adding ──error────────▶ fail (nothing committed)
//!                  │  └──Failure──────▶ AddFailed   (old record kept)
//!                  └──Success──▶ Removing ──error──▶ fail (add committed)
//!                                   └──any verdict──▶ Done
//! ```
//!
//! The old record is only touched after the provider confirmed the new one,
//! so the hostname never stops resolving. The price is a window, possibly
//! permanent if removal fails, where it resolves to both addresses.

mod plan;

pub use plan::{SyncPlan, plan_sync};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::traits::HttpFetch;
use crate::transport::{CommandTransport, decode_envelope, detail_text};
use crate::types::{
    CommandOutcome, CommandParameters, CommandStatus, DnsRecord, ReconcileResult, ReconcileState,
    CMD_LIST_RECORDS,
};
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// A replace that stopped on an error
///
/// `partial` records what the provider had already confirmed. An error with
/// a successful `partial.add_outcome` means the hostname now resolves to
/// both addresses and the old record needs cleanup.
#[derive(Debug, thiserror::Error)]
#[error("record replacement interrupted: {source}")]
pub struct ReconcileError {
    /// Outcomes confirmed before the failure
    pub partial: ReconcileResult,
    /// The error that stopped the replace
    pub source: Error,
}

impl ReconcileError {
    pub fn new(partial: ReconcileResult, source: Error) -> Self {
        Self { partial, source }
    }
}

impl From<Error> for ReconcileError {
    fn from(source: Error) -> Self {
        Self::new(ReconcileResult::default(), source)
    }
}

/// Result of a [`ReconciliationEngine::sync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// What the sync decided to do
    pub plan: SyncPlan,
    /// Outcomes of the commands it issued
    pub result: ReconcileResult,
}

impl SyncReport {
    pub fn state(&self) -> ReconcileState {
        match &self.plan {
            SyncPlan::UpToDate => ReconcileState::Applied,
            SyncPlan::Add => match &self.result.add_outcome {
                Some(add) if add.is_success() => ReconcileState::Applied,
                _ => ReconcileState::NotApplied,
            },
            SyncPlan::Replace { .. } => self.result.state(),
        }
    }
}

/// Add / remove / replace for A records
///
/// Holds no state between calls; every method issues fresh commands.
#[derive(Debug)]
pub struct ReconciliationEngine {
    transport: CommandTransport,
}

impl ReconciliationEngine {
    /// Create an engine on top of an existing transport
    pub fn new(transport: CommandTransport) -> Self {
        Self { transport }
    }

    /// Create an engine from a fetcher and API configuration
    pub fn from_parts(fetcher: Box<dyn HttpFetch>, config: ApiConfig) -> Result<Self> {
        Ok(Self::new(CommandTransport::new(fetcher, config)?))
    }

    pub fn transport(&self) -> &CommandTransport {
        &self.transport
    }

    /// Add an A record for `domain`
    ///
    /// A provider rejection (e.g. duplicate record) is returned as a
    /// [`CommandStatus::Failure`] outcome, not as an error.
    pub async fn add(
        &self,
        domain: &str,
        address: Ipv4Addr,
        comment: Option<&str>,
    ) -> Result<CommandOutcome> {
        debug!("Adding A record: {} -> {}", domain, address);
        let params = CommandParameters::add_record(domain, address, comment);
        self.transport.invoke(&params).await
    }

    /// Remove the A record `domain -> address`
    pub async fn remove(
        &self,
        domain: &str,
        address: Ipv4Addr,
        comment: Option<&str>,
    ) -> Result<CommandOutcome> {
        debug!("Removing A record: {} -> {}", domain, address);
        let params = CommandParameters::remove_record(domain, address, comment);
        self.transport.invoke(&params).await
    }

    /// Move `domain` from `old_address` to `new_address`
    ///
    /// # Returns
    ///
    /// - `Ok` with only `add_outcome` set: the add was rejected, nothing changed
    /// - `Ok` with both outcomes set: both commands were evaluated
    /// - `Err` with empty `partial`: the add could not be evaluated
    /// - `Err` with `partial.add_outcome` set: the new record is live, the
    ///   removal could not be evaluated
    pub async fn replace(
        &self,
        domain: &str,
        old_address: Ipv4Addr,
        new_address: Ipv4Addr,
        comment: Option<&str>,
    ) -> std::result::Result<ReconcileResult, ReconcileError> {
        info!(
            "Replacing A record: {} {} -> {}",
            domain, old_address, new_address
        );

        let add = self.add(domain, new_address, comment).await?;

        if add.status == CommandStatus::Failure {
            warn!(
                "Provider rejected {} -> {} ({}); keeping {}",
                domain, new_address, add.detail, old_address
            );
            return Ok(ReconcileResult {
                add_outcome: Some(add),
                remove_outcome: None,
            });
        }

        let mut result = ReconcileResult {
            add_outcome: Some(add),
            remove_outcome: None,
        };

        match self.remove(domain, old_address, comment).await {
            Ok(remove) => {
                if remove.is_success() {
                    info!("Replaced A record: {} -> {}", domain, new_address);
                } else {
                    warn!(
                        "Added {} -> {} but provider rejected removal of {} ({})",
                        domain, new_address, old_address, remove.detail
                    );
                }
                result.remove_outcome = Some(remove);
                Ok(result)
            }
            Err(e) => {
                warn!(
                    "Added {} -> {} but removal of {} failed: {}",
                    domain, new_address, old_address, e
                );
                Err(ReconcileError::new(result, e))
            }
        }
    }

    /// Every DNS record visible to the API key
    ///
    /// A provider `error` verdict becomes [`Error::Rejected`].
    pub async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let body = self
            .transport
            .fetch_body(&CommandParameters::list_records())
            .await?;

        let (status, data) = decode_envelope(&body)?;
        match status {
            CommandStatus::Success => {
                let records: Vec<DnsRecord> =
                    serde_json::from_value(data).map_err(crate::error::DecodeError::from)?;
                debug!("Listed {} DNS record(s)", records.len());
                Ok(records)
            }
            CommandStatus::Failure => Err(Error::rejected(CMD_LIST_RECORDS, detail_text(data))),
        }
    }

    /// IPv4 addresses currently published as A records for `domain`
    pub async fn published_addresses(&self, domain: &str) -> Result<Vec<Ipv4Addr>> {
        let wanted = normalize_name(domain);
        let addresses = self
            .list_records()
            .await?
            .iter()
            .filter(|record| normalize_name(&record.record) == wanted)
            .filter_map(DnsRecord::ipv4)
            .collect();
        Ok(addresses)
    }

    /// Make `domain` resolve to `target`, looking up what is published first
    pub async fn sync(
        &self,
        domain: &str,
        target: Ipv4Addr,
        comment: Option<&str>,
    ) -> std::result::Result<SyncReport, ReconcileError> {
        let published = self.published_addresses(domain).await?;
        let plan = plan_sync(&published, target);
        debug!("Sync plan for {}: {:?}", domain, plan);

        let result = match &plan {
            SyncPlan::UpToDate => {
                info!("A record already up to date: {} -> {}", domain, target);
                ReconcileResult::default()
            }
            SyncPlan::Add => {
                let add = self.add(domain, target, comment).await?;
                if add.is_success() {
                    info!("Created A record: {} -> {}", domain, target);
                } else {
                    warn!(
                        "Provider rejected {} -> {} ({})",
                        domain, target, add.detail
                    );
                }
                ReconcileResult {
                    add_outcome: Some(add),
                    remove_outcome: None,
                }
            }
            SyncPlan::Replace { old, stale } => {
                if !stale.is_empty() {
                    warn!(
                        "{} has {} further A record(s) left in place: {:?}",
                        domain,
                        stale.len(),
                        stale
                    );
                }
                self.replace(domain, *old, target, comment).await?
            }
        };

        Ok(SyncReport { plan, result })
    }
}

fn normalize_name(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}
