//! # optest-cluster
//!
//! Resource model and cluster client capabilities for the optest harness.
//!
//! ## Design Principles
//!
//! - Representations carry only the fields the harness actually reads;
//!   everything else stays opaque on the wire
//! - Fetch errors are classified (`not found` vs everything else) so that
//!   condition predicates can branch without string matching
//! - Reads and writes live on separate traits: the condition poller can
//!   only ever hold the read capability
//!
//! A production `Cluster` implementation wraps a real cluster API client;
//! the in-memory fake in `optest-testing` implements the same traits for
//! tests.

mod client;
mod error;
mod types;

pub use client::{Cluster, Fetch, ResourceClient};
pub use error::FetchError;
pub use types::*;
