//! Sync planning
//!
//! Decides what a sync has to do from the A-record addresses currently
//! published for a hostname. Pure; no I/O.

use std::net::Ipv4Addr;

/// Action needed to make a hostname resolve to the target address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    /// The target address is already published
    UpToDate,
    /// Nothing is published; add the target
    Add,
    /// Another address is published; replace it with the target
    Replace {
        /// Address to remove once the target is added
        old: Ipv4Addr,
        /// Further published addresses left in place
        stale: Vec<Ipv4Addr>,
    },
}

/// Compute the plan for `target` given the `published` addresses
pub fn plan_sync(published: &[Ipv4Addr], target: Ipv4Addr) -> SyncPlan {
    if published.contains(&target) {
        return SyncPlan::UpToDate;
    }

    match published.split_first() {
        None => SyncPlan::Add,
        Some((old, rest)) => SyncPlan::Replace {
            old: *old,
            stale: rest.to_vec(),
        },
    }
}
