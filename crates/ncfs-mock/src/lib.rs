//! Conformance simulator for the Nextcloud sciencemesh API.
//!
//! A [`Simulator`] plays the remote service from a [`TransitionTable`]:
//! each request is matched on its [`Signature`] (and, failing that, on the
//! signature plus the current [`ServerState`]), answered with a canned reply,
//! and moves the simulator to the next state. Every request is logged so
//! tests can assert exactly what went over the wire.
//!
//! [`MockServer`] puts a simulator behind a loopback axum listener so the
//! real HTTP driver can be pointed at it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ncfs_mock::{MockServer, Simulator, fixtures};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let sim = Arc::new(Simulator::new(fixtures::tester_table()?));
//! let server = MockServer::start(sim.clone()).await?;
//! println!("driver end_point = {}", server.endpoint());
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod server;
pub mod signature;
pub mod simulator;
pub mod state;
pub mod table;

pub use server::{MockServer, router};
pub use signature::{Body, Signature};
pub use simulator::{Mode, Reply, Simulator, UNMATCHED_PREFIX};
pub use state::ServerState;
pub use table::{TableError, Transition, TransitionTable};
