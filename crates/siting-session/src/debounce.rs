//! Debounced scheduling.
//!
//! [`Debouncer`] is an explicit schedule/cancel contract: scheduling replaces
//! any pending payload and pushes the deadline out to `now + quiet`, and
//! [`Debouncer::poll`] hands the payload back once the deadline has passed.
//! Time is supplied by the caller in milliseconds, so tests can advance it
//! deterministically; [`SystemClock`] provides it interactively.

use std::time::Duration;

use tracing::trace;
use web_time::Instant;

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Monotonic wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Identifies one scheduled payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    token: Token,
    due_ms: u64,
    payload: T,
}

/// Coalesces bursts of updates into one, delivered after a quiet interval.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet_ms: u64,
    next_token: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet_ms: u64::try_from(quiet.as_millis()).unwrap_or(u64::MAX),
            next_token: 0,
            pending: None,
        }
    }

    pub fn quiet_ms(&self) -> u64 {
        self.quiet_ms
    }

    /// Schedule `payload`, cancelling whatever was pending.
    pub fn schedule(&mut self, now_ms: u64, payload: T) -> Token {
        let token = Token(self.next_token);
        self.next_token += 1;
        if let Some(previous) = &self.pending {
            trace!(cancelled = previous.token.0, "debounce rescheduled");
        }
        self.pending = Some(Pending {
            token,
            due_ms: now_ms.saturating_add(self.quiet_ms),
            payload,
        });
        token
    }

    /// Drop the pending payload, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_token(&self) -> Option<Token> {
        self.pending.as_ref().map(|p| p.token)
    }

    /// Deadline of the pending payload.
    pub fn due_at(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        match &self.pending {
            Some(p) if now_ms >= p.due_ms => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }
}
