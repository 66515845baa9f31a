//! CSRF state store
//!
//! Holds exactly one outstanding state value. Issuing a new one replaces the
//! previous value, so only the most recent redirect can complete. A value is
//! consumed by the first callback that matches it and expires after a TTL.
//! A mismatching callback leaves the outstanding value in place.

use std::time::{Duration, Instant};

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::authorize::generate_state;

/// Outcome of checking a callback's `state` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCheck {
    /// Matches the outstanding value, which is now consumed
    Matched,
    /// Callback carried no `state`
    Missing,
    /// Nothing outstanding, or a different value
    Mismatch,
    /// Matched, but the value outlived its TTL
    Expired,
}

#[derive(Debug)]
struct IssuedState {
    value: String,
    issued_at: Instant,
}

/// Single-slot CSRF state holder.
#[derive(Debug)]
pub struct StateStore {
    slot: Option<IssuedState>,
    ttl: Duration,
}

impl StateStore {
    pub fn new(ttl: Duration) -> Self {
        Self { slot: None, ttl }
    }

    /// Generate and store a fresh value, replacing any outstanding one.
    pub fn issue(&mut self) -> String {
        let value = generate_state();
        if self.slot.is_some() {
            debug!("replacing outstanding CSRF state");
        }
        self.slot = Some(IssuedState {
            value: value.clone(),
            issued_at: Instant::now(),
        });
        value
    }

    /// Check a callback's `state` against the outstanding value.
    pub fn verify(&mut self, received: Option<&str>) -> StateCheck {
        let Some(received) = received else {
            return StateCheck::Missing;
        };
        let Some(issued) = &self.slot else {
            warn!("callback state received with nothing outstanding");
            return StateCheck::Mismatch;
        };
        let matches: bool = issued.value.as_bytes().ct_eq(received.as_bytes()).into();
        if !matches {
            warn!("callback state does not match outstanding value");
            return StateCheck::Mismatch;
        }

        let expired = issued.issued_at.elapsed() >= self.ttl;
        self.slot = None;
        if expired {
            warn!(ttl_secs = self.ttl.as_secs(), "callback state expired");
            StateCheck::Expired
        } else {
            StateCheck::Matched
        }
    }
}
