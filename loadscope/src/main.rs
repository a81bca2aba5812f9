//! # loadscope - Main Entry Point
//!
//! Replays a recorded host into a fresh registry and answers one management
//! query against it:
//! - **tree** (`--ping` to probe remote loaders, bounded by `--timeout`)
//! - **details** for one loader identity
//! - **type** resolution through one loader
//! - **operations** catalog

use anyhow::{bail, Result};
use clap::Parser;
use log::info;
use std::sync::Arc;
use std::time::Duration;

use loadscope::cli::{Args, Command};
use loadscope::hierarchy::HierarchyBuilder;
use loadscope::monitor::{describe_operations, LoaderMonitor};
use loadscope::registry::Registry;
use loadscope::replay::ReplayHost;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_TIMEOUT: i32 = 124;

fn main() {
    env_logger::init();
    let result = match tokio::runtime::Runtime::new() {
        Ok(runtime) => {
            let result = runtime.block_on(run());
            // A probe still hanging past its timeout must not hold up exit
            runtime.shutdown_background();
            result
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to start async runtime")),
    };
    std::process::exit(match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("timed out") {
        EXIT_TIMEOUT
    } else if msg.contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Observed host plus the monitor answering queries about it.
struct Session {
    /// Owns the loaders; the registry only holds weak handles
    _host: ReplayHost,
    monitor: Arc<LoaderMonitor>,
}

fn open_session(args: &Args) -> Result<Session> {
    let Some(host_path) = args.host.as_ref() else {
        bail!(
            "Missing required argument: --host <FILE>\n\n\
             Usage:\n  \
             loadscope --host host.json tree\n\n\
             Run 'loadscope --help' for more options"
        );
    };

    let host = ReplayHost::from_file(host_path)?;
    let registry = Arc::new(Registry::new());
    let observed = host.observe(&registry);

    let builder = if args.exclude_kinds.is_empty() {
        HierarchyBuilder::new()
    } else {
        HierarchyBuilder::with_excluded(&args.exclude_kinds)
    };

    if !args.quiet {
        eprintln!("loadscope v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("host: {}", host_path.display());
        eprintln!("loaders: {} ({observed} observed)", host.len());
        eprintln!("excluded kinds: {}", builder.excluded_kinds().join(", "));
    }

    let monitor = Arc::new(LoaderMonitor::new(registry).with_builder(builder));
    Ok(Session { _host: host, monitor })
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let output = match args.command {
        Command::Operations => describe_operations(),
        Command::Tree { ping: false, .. } => open_session(&args)?.monitor.show_tree()?,
        Command::Tree { ping: true, timeout } => {
            let session = open_session(&args)?;
            info!("Rendering with remote liveness probes (timeout {timeout}s)");
            Arc::clone(&session.monitor)
                .show_tree_with_remote_ping_within(Duration::from_secs(timeout))
                .await?
        }
        Command::Details { id } => open_session(&args)?.monitor.show_loader_details(id)?,
        Command::Type { ref name, id } => open_session(&args)?.monitor.show_type_details(name, id)?,
    };

    print!("{output}");
    Ok(())
}
