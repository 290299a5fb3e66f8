// # dhsync-core
//
// Core library for keeping a DreamHost "A" record pointed at a target
// address.
//
// ## Architecture Overview
//
// - **HttpFetch**: Trait for the raw HTTP GET primitive (implemented by `dhsync-http`)
// - **CommandTransport**: Executes one provider command, including the
//   rate-limit cool-down and single retry
// - **ReconciliationEngine**: add / remove / replace / sync built on the transport
//
// ## Design Principles
//
// 1. **Explicit configuration**: the API key and origin are passed in, never global
// 2. **Verdicts are values**: a provider rejection is a `CommandOutcome`, not an error
// 3. **Never drop the last record**: the old address is removed only after the
//    new one is confirmed
// 4. **Stateless**: nothing is cached or persisted between calls

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;
pub mod transport;
pub mod types;

// Re-export core types for convenience
pub use config::ApiConfig;
pub use engine::{ReconcileError, ReconciliationEngine, SyncPlan, SyncReport};
pub use error::{DecodeError, Error, Result, TransportError};
pub use traits::{HttpFetch, HttpResponse};
pub use transport::CommandTransport;
pub use types::{
    CommandOutcome, CommandParameters, CommandStatus, DnsRecord, ReconcileResult, ReconcileState,
};
