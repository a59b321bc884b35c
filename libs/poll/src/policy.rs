//! Poll pacing policies.

use std::time::Duration;

use thiserror::Error;

/// A policy was constructed with values that could never poll sensibly.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    #[error("timeout {timeout:?} is shorter than the poll interval {interval:?}")]
    TimeoutShorterThanInterval { interval: Duration, timeout: Duration },
}

/// Pacing for one wait: probe every `interval`, give up after `timeout`.
///
/// Policies are immutable and cheap to copy. Call sites either pick one of
/// the standard profiles or build their own through [`PollPolicy::new`],
/// which rejects invalid combinations up front instead of letting a wait
/// loop zero times and report a spurious timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    interval: Duration,
    timeout: Duration,
    immediate: bool,
}

impl PollPolicy {
    /// Profile for operator install/upgrade flows that settle in minutes.
    pub const SLOW: PollPolicy = PollPolicy {
        interval: Duration::from_secs(5),
        timeout: Duration::from_secs(20 * 60),
        immediate: true,
    };

    /// Profile for subscription status changes.
    pub const SUBSCRIPTION: PollPolicy = PollPolicy {
        interval: Duration::from_secs(10),
        timeout: Duration::from_secs(5 * 60),
        immediate: true,
    };

    /// Profile for in-cluster run status, expected to settle in seconds.
    pub const RUN: PollPolicy = PollPolicy {
        interval: Duration::from_secs(1),
        timeout: Duration::from_secs(60),
        immediate: true,
    };

    /// Build a custom policy with an immediate first probe.
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self, PolicyError> {
        if interval.is_zero() {
            return Err(PolicyError::ZeroInterval);
        }
        if timeout < interval {
            return Err(PolicyError::TimeoutShorterThanInterval { interval, timeout });
        }
        Ok(Self {
            interval,
            timeout,
            immediate: true,
        })
    }

    /// Wait one full interval before the first probe.
    ///
    /// With this variant an already-converged target still costs one
    /// interval; callers who need zero-wait detection keep the immediate
    /// default.
    pub fn delayed(mut self) -> Self {
        self.immediate = false;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }
}
