//! Canned exchanges.
//!
//! - [`tester_table`]: one stateless exchange per driver operation for user
//!   `tester`. Request bodies are exactly what the driver encodes for the
//!   documented arguments; replies are the documented fixture values.
//! - [`einstein_table`]: a home-directory scenario for user `einstein`
//!   where replies depend on what has happened so far.
//! - [`conformance_table`]: both, for the standalone server.

mod einstein;
mod tester;

pub use einstein::einstein_table;
pub use tester::tester_table;

use crate::table::{TableError, TransitionTable};

/// Mount point of the sciencemesh app on the simulated host.
pub const APP_PREFIX: &str = "/apps/sciencemesh/";

/// API path prefix for `user`.
pub fn api_prefix(user: &str) -> String {
    format!("{APP_PREFIX}~{user}/api/")
}

/// Everything the simulator knows, for serving standalone.
pub fn conformance_table() -> Result<TransitionTable, TableError> {
    let mut table = tester_table()?;
    table.extend(einstein_table()?)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_build() {
        let tester = tester_table().unwrap();
        let einstein = einstein_table().unwrap();
        let all = conformance_table().unwrap();
        assert_eq!(all.len(), tester.len() + einstein.len());
    }

    #[test]
    fn test_api_prefix() {
        assert_eq!(api_prefix("tester"), "/apps/sciencemesh/~tester/api/");
    }
}
