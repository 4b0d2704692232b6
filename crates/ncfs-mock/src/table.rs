//! Transition tables.
//!
//! A [`Transition`] says: when this signature arrives (optionally, only in
//! this state), reply with this status and body and move to this state.
//! Lookup tries the state-independent entry first, then the entry qualified
//! by the current state.

use std::collections::HashMap;

use thiserror::Error;

use crate::signature::Signature;
use crate::state::ServerState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Two entries for the same (signature, state) key.
    #[error("duplicate transition for {0}")]
    Duplicate(String),

    /// A state-qualified entry whose signature already has a
    /// state-independent entry, so it could never match.
    #[error("transition for {0} is shadowed by a state-independent entry")]
    Shadowed(String),
}

/// One row of the table.
#[derive(Debug, Clone)]
pub struct Transition {
    pub signature: Signature,
    pub when: Option<ServerState>,
    pub status: u16,
    pub body: String,
    pub next: Option<ServerState>,
}

impl Transition {
    /// Matches `signature`, replies `200` with an empty body, and has no
    /// successor state until [`then`](Self::then) is called.
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            when: None,
            status: 200,
            body: String::new(),
            next: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Signature::get(path))
    }

    pub fn post(path: impl Into<String>, body: &str) -> Self {
        Self::new(Signature::post(path, body))
    }

    pub fn put(path: impl Into<String>, body: &str) -> Self {
        Self::new(Signature::put(path, body))
    }

    /// Only match in `state`.
    pub fn when(mut self, state: ServerState) -> Self {
        self.when = Some(state);
        self
    }

    pub fn respond(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status = status;
        self.body = body.into();
        self
    }

    pub fn then(mut self, state: ServerState) -> Self {
        self.next = Some(state);
        self
    }
}

/// Deterministic (signature, state) → transition map.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    primary: HashMap<Signature, Transition>,
    by_state: HashMap<(Signature, ServerState), Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transitions(
        transitions: impl IntoIterator<Item = Transition>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new();
        for transition in transitions {
            table.insert(transition)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, transition: Transition) -> Result<(), TableError> {
        let key = transition.signature.clone();
        match transition.when {
            None => {
                if self.primary.contains_key(&key) {
                    return Err(TableError::Duplicate(key.to_string()));
                }
                if self.by_state.keys().any(|(sig, _)| *sig == key) {
                    return Err(TableError::Shadowed(key.to_string()));
                }
                self.primary.insert(key, transition);
            }
            Some(state) => {
                if self.primary.contains_key(&key) {
                    return Err(TableError::Shadowed(format!("{key} {state}")));
                }
                let slot = (key, state);
                if self.by_state.contains_key(&slot) {
                    return Err(TableError::Duplicate(format!("{} {state}", slot.0)));
                }
                self.by_state.insert(slot, transition);
            }
        }
        Ok(())
    }

    /// Merge another table into this one.
    pub fn extend(&mut self, other: TransitionTable) -> Result<(), TableError> {
        for transition in other.into_transitions() {
            self.insert(transition)?;
        }
        Ok(())
    }

    pub fn lookup(&self, signature: &Signature, state: ServerState) -> Option<&Transition> {
        self.primary
            .get(signature)
            .or_else(|| self.by_state.get(&(signature.clone(), state)))
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.by_state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn into_transitions(self) -> impl Iterator<Item = Transition> {
        self.primary.into_values().chain(self.by_state.into_values())
    }
}
