//! # optest-poll
//!
//! Bounded condition polling for eventually-consistent cluster resources.
//!
//! The engine repeatedly fetches a resource and evaluates a caller-supplied
//! predicate until the condition holds, the predicate reports an
//! unrecoverable state, a deadline elapses, or a cancellation token fires.
//! Key concepts:
//!
//! - **Policy**: probe interval, overall timeout, and whether the first
//!   probe happens immediately ([`PollPolicy`]).
//! - **Observation**: the most recently fetched representation plus its
//!   fetch error, handed back on every terminal path for diagnostics
//!   ([`Observed`]).
//! - **Verdict**: a predicate maps one observation to keep-waiting,
//!   converged, or fatal ([`Verdict`]).
//!
//! ## Invariants
//!
//! - One poll owns its loop state; nothing is shared across concurrent polls
//! - Probes are strictly sequential and spaced by at least the interval
//! - The poller only reads; mutation belongs to orchestration code
//! - No history is kept beyond the single most recent observation

pub mod conditions;
mod error;
mod observed;
mod policy;
mod wait;

pub use error::{ConditionError, WaitError, WaitErrorKind};
pub use observed::Observed;
pub use policy::{PolicyError, PollPolicy};
pub use wait::{wait_for, wait_for_cancellable, Verdict, WaitResult};
