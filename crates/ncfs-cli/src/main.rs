//! ncfs command-line tool.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the conformance simulator (prints the driver endpoint)
//! ncfs mock --port 8080
//! ncfs mock --strict --table einstein
//!
//! # Call a remote
//! ncfs call --config ncfs.toml stat /subdir
//! ncfs call --endpoint http://127.0.0.1:8080/apps/sciencemesh/ --mock-http --user einstein create-dir /subdir
//! ```

mod call;
mod config;

use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ncfs_driver::{NextcloudDriver, RequestContext};
use ncfs_mock::fixtures::{conformance_table, einstein_table, tester_table};
use ncfs_mock::{MockServer, Simulator, TransitionTable};

use crate::call::{Operation, Output};
use crate::config::{CliConfig, Overrides};

#[derive(Parser, Debug)]
#[command(name = "ncfs")]
#[command(about = "Nextcloud storage driver and conformance simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the conformance simulator over HTTP
    Mock {
        /// Port to listen on (0 picks a free one)
        #[arg(long, default_value_t = 0)]
        port: u16,

        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
        host: IpAddr,

        /// Answer unmatched requests with 501 instead of 200
        #[arg(long)]
        strict: bool,

        /// Which canned exchanges to serve
        #[arg(long, value_enum, default_value_t = Table::All)]
        table: Table,
    },

    /// Run one driver operation and print the result
    Call {
        /// TOML config file with [driver] and [user] sections
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Endpoint URL, overriding the config file
        #[arg(long)]
        endpoint: Option<String>,

        /// Username, overriding the config file
        #[arg(long)]
        user: Option<String>,

        /// The endpoint is a local simulator
        #[arg(long)]
        mock_http: bool,

        #[command(subcommand)]
        op: Operation,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    All,
    Tester,
    Einstein,
}

impl Table {
    fn build(self) -> Result<TransitionTable> {
        let table = match self {
            Table::All => conformance_table(),
            Table::Tester => tester_table(),
            Table::Einstein => einstein_table(),
        };
        Ok(table?)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _telemetry = match ncfs_telemetry::init("ncfs") {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ncfs: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Mock {
            port,
            host,
            strict,
            table,
        } => run_mock(SocketAddr::new(host, port), strict, table).await,
        Command::Call {
            config,
            endpoint,
            user,
            mock_http,
            op,
        } => {
            let overrides = Overrides {
                endpoint,
                username: user,
                mock_http,
            };
            run_call(config, overrides, op).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("ncfs: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_mock(addr: SocketAddr, strict: bool, table: Table) -> Result<()> {
    let mut simulator = Simulator::new(table.build()?);
    if strict {
        simulator = simulator.strict();
    }
    let server = MockServer::bind(Arc::new(simulator), addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    println!("{}", server.endpoint());

    let stop = server.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c");
            return;
        }
        tracing::info!("interrupted, shutting down");
        stop.cancel();
    });

    server.run_until_stopped().await;
    Ok(())
}

async fn run_call(config: Option<PathBuf>, overrides: Overrides, op: Operation) -> Result<()> {
    let config = CliConfig::resolve(config.as_deref(), overrides)?;
    let driver = NextcloudDriver::from_config(&config.driver)?;
    let ctx = RequestContext::new(config.user.to_user());

    match call::run(&driver, &ctx, op).await? {
        Output::Nothing => {}
        Output::Text(text) => println!("{text}"),
        Output::Json(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Output::Bytes(bytes) => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mock() {
        let cli = Cli::try_parse_from(["ncfs", "mock", "--port", "8080", "--strict"]).unwrap();
        match cli.command {
            Command::Mock {
                port,
                host,
                strict,
                table,
            } => {
                assert_eq!(port, 8080);
                assert_eq!(host, IpAddr::V4(Ipv4Addr::LOCALHOST));
                assert!(strict);
                assert_eq!(table, Table::All);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_call() {
        let cli = Cli::try_parse_from([
            "ncfs",
            "call",
            "--user",
            "einstein",
            "--endpoint",
            "http://127.0.0.1:8080/apps/sciencemesh/",
            "set-metadata",
            "/subdir",
            "foo=bar",
        ])
        .unwrap();
        match cli.command {
            Command::Call { user, op, .. } => {
                assert_eq!(user.as_deref(), Some("einstein"));
                assert_eq!(
                    op,
                    Operation::SetMetadata {
                        path: "/subdir".into(),
                        pairs: vec![("foo".into(), "bar".into())],
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_set_metadata_needs_pairs() {
        assert!(Cli::try_parse_from(["ncfs", "call", "set-metadata", "/subdir"]).is_err());
    }

    #[test]
    fn test_every_table_builds() {
        for table in [Table::All, Table::Tester, Table::Einstein] {
            assert!(!table.build().unwrap().is_empty());
        }
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
