//! # optest-harness
//!
//! End-to-end orchestration for an operator-managed cluster: install,
//! upgrade, and uninstall the operator through its subscription, then
//! assert that derived resources (addons, runs) converge.
//!
//! ## Design Principles
//!
//! - Orchestrators are strictly sequential stage pipelines: a stage starts
//!   only after the previous poller call succeeded, and a failing stage
//!   surfaces its error unchanged
//! - Nothing retries across stages and nothing rolls back implicitly;
//!   cleanup ([`olm::uninstall`]) is invoked explicitly
//! - All environment-derived settings live in one [`config::HarnessConfig`]
//!   constructed at scenario start and passed by reference; there is no
//!   package-level mutable state

pub mod assertions;
pub mod config;
pub mod olm;
pub mod operator;
pub mod predicates;
pub mod runs;
