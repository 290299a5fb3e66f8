//! Core traits for the synchronizer
//!
//! - [`HttpFetch`]: raw HTTP GET primitive the transport is built on

pub mod http_fetch;

pub use http_fetch::{HttpFetch, HttpResponse};
