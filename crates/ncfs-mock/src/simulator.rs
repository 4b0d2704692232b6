//! The stateful dispatcher.
//!
//! Each [`Simulator`] is one isolated remote: its own table, state, and
//! call log. Tests build a fresh instance each, so they can run in parallel.

use axum::http::Method;
use parking_lot::Mutex;

use crate::signature::Signature;
use crate::state::ServerState;
use crate::table::TransitionTable;

/// Prefix of the reply body for requests with no table entry.
pub const UNMATCHED_PREFIX: &str = "response not defined! ";

/// How unmatched requests are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// `200` with the unmatched signature in the body. Clients that ignore
    /// bodies will not notice; the call log and the ERROR state will.
    #[default]
    Lenient,
    /// `501` with the same body.
    Strict,
}

/// A simulated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Default)]
struct Inner {
    state: ServerState,
    calls: Vec<String>,
    unmatched: Vec<String>,
}

#[derive(Debug)]
pub struct Simulator {
    table: TransitionTable,
    mode: Mode,
    inner: Mutex<Inner>,
}

impl Simulator {
    /// A lenient simulator in the EMPTY state.
    pub fn new(table: TransitionTable) -> Self {
        Self {
            table,
            mode: Mode::Lenient,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn strict(self) -> Self {
        self.with_mode(Mode::Strict)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Dispatch one request.
    ///
    /// Lookup and state update happen under one lock, so concurrent
    /// requests are serialised.
    pub fn handle(&self, method: Method, path: &str, body: &[u8]) -> Reply {
        let signature = Signature::new(method, path, body);
        let mut inner = self.inner.lock();
        let literal = signature.to_string();
        tracing::debug!(signature = %literal, state = %inner.state, "simulated request");
        inner.calls.push(literal);

        match self.table.lookup(&signature, inner.state) {
            Some(transition) => {
                let next = transition.next.unwrap_or(ServerState::Error);
                tracing::debug!(from = %inner.state, to = %next, status = transition.status, "transition");
                inner.state = next;
                Reply {
                    status: transition.status,
                    body: transition.body.clone(),
                }
            }
            None => {
                tracing::warn!(signature = %signature, state = %inner.state, "no response defined");
                inner.state = ServerState::Error;
                inner.unmatched.push(signature.to_string());
                let status = match self.mode {
                    Mode::Lenient => 200,
                    Mode::Strict => 501,
                };
                Reply {
                    status,
                    body: format!("{UNMATCHED_PREFIX}{signature}"),
                }
            }
        }
    }

    pub fn state(&self) -> ServerState {
        self.inner.lock().state
    }

    /// Force a state, e.g. to start a scenario mid-way.
    pub fn set_state(&self, state: ServerState) {
        self.inner.lock().state = state;
    }

    /// Every request seen, in arrival order, as literal signatures.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    /// Requests that matched no entry.
    pub fn unmatched(&self) -> Vec<String> {
        self.inner.lock().unmatched.clone()
    }

    /// Back to EMPTY with empty logs.
    pub fn reset(&self) {
        *self.inner.lock() = Inner::default();
    }
}
