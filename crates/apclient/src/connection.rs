//! Session URI handling and reconnect pacing.
//!
//! The user gives the client an address that may lack a scheme and a
//! port. [`SessionUri`] normalizes it and, when no scheme was given,
//! remembers that the other WebSocket scheme is worth trying if the
//! first one fails. [`ReconnectPolicy`] spaces connection attempts with
//! exponential backoff.

use std::time::{Duration, Instant};

/// Port the reference server listens on.
const DEFAULT_PORT: u16 = 38281;

const INITIAL_INTERVAL: Duration = Duration::from_millis(1500);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_millis(15_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scheme {
    Ws,
    Wss,
}

impl Scheme {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }
}

/// A normalized server address with scheme-fallback bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionUri {
    scheme: Scheme,
    /// Host, port and optional path — everything after `scheme://`.
    rest: String,
    /// Set when the user left the scheme open, so a failed attempt may
    /// retry with the other one.
    try_fallback: bool,
}

impl SessionUri {
    /// Normalizes a user-supplied address. Returns `None` for an empty
    /// address, which disables connecting entirely.
    pub fn parse(address: &str, tls_capable: bool, prefer_unencrypted: bool) -> Option<Self> {
        if address.is_empty() {
            return None;
        }
        let (scheme, rest, try_fallback) = match address.split_once("://") {
            Some(("wss", rest)) => (Scheme::Wss, rest, false),
            Some((_, rest)) => (Scheme::Ws, rest, false),
            None => {
                let scheme = if tls_capable && !prefer_unencrypted {
                    Scheme::Wss
                } else {
                    Scheme::Ws
                };
                (scheme, address, tls_capable)
            }
        };
        Some(Self {
            scheme,
            rest: with_default_port(rest),
            try_fallback,
        })
    }

    /// The full URI for the next attempt.
    pub fn uri(&self) -> String {
        format!("{}://{}", self.scheme.as_str(), self.rest)
    }

    /// Switches ws↔wss if fallback is allowed. Returns whether a flip
    /// happened.
    pub fn flip_scheme(&mut self) -> bool {
        if !self.try_fallback {
            return false;
        }
        self.scheme = match self.scheme {
            Scheme::Ws => Scheme::Wss,
            Scheme::Wss => Scheme::Ws,
        };
        true
    }
}

/// Appends `:38281` when the authority carries no port. Bracketed IPv6
/// literals are opaque: colons inside `[...]` never count as a port
/// separator.
fn with_default_port(rest: &str) -> String {
    let (authority, path) = match rest.find('/') {
        Some(slash) => rest.split_at(slash),
        None => (rest, ""),
    };
    let has_port = match authority.strip_prefix('[') {
        Some(bracketed) => match bracketed.find(']') {
            Some(end) => bracketed[end + 1..].starts_with(':'),
            None => false,
        },
        None => authority.contains(':'),
    };
    if has_port || authority.is_empty() {
        rest.to_string()
    } else {
        format!("{authority}:{DEFAULT_PORT}{path}")
    }
}

// ---------------------------------------------------------------------------
// Reconnect pacing
// ---------------------------------------------------------------------------

/// Exponential backoff between connection attempts.
///
/// The gap after the k-th attempt is `1500 ms · 2^k`, capped at
/// max(15 s, whatever minimum spacing the transport asks for). A
/// successful open resets the progression.
#[derive(Debug)]
pub(crate) struct ReconnectPolicy {
    interval: Duration,
    max_interval: Duration,
    next_attempt: Option<Instant>,
    immediate: bool,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self {
            interval: INITIAL_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            next_attempt: None,
            immediate: false,
        }
    }

    /// Whether a new attempt should start now.
    pub fn due(&self, now: Instant) -> bool {
        self.immediate || self.next_attempt.is_none_or(|at| now >= at)
    }

    /// Records an attempt: schedules the next one a full interval out,
    /// then doubles the interval for the attempt after that.
    pub fn begin_attempt(&mut self, now: Instant) {
        self.immediate = false;
        self.next_attempt = Some(now + self.interval);
        self.interval = (self.interval * 2).min(self.max_interval);
    }

    /// Adopts the transport's advertised minimum spacing, which can only
    /// raise the cap above the 15 s default.
    pub fn note_transport_hint(&mut self, hint: Option<Duration>) {
        self.max_interval = DEFAULT_MAX_INTERVAL.max(hint.unwrap_or(Duration::ZERO));
    }

    /// A connection opened; the next disconnect starts over.
    pub fn note_open(&mut self) {
        self.interval = INITIAL_INTERVAL;
    }

    /// Forces the next `due` check to pass (scheme fallback probing).
    pub fn arm_immediate(&mut self) {
        self.immediate = true;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// =========================================================================
// Tests
// =========================================================================
