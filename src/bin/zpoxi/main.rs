#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]

use std::fs::{self, Permissions};
use std::io::{self, BufWriter, Write};
use std::net::{IpAddr, SocketAddr};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use log::info;
use tempfile::NamedTempFile;

use zpoxi::zpool::ZpoolCommand;
use zpoxi::{Collector, Exporter, PoolSnapshot};

mod cli;
mod server;

/// Mode of newly created output files, readable by unprivileged collectors.
const OUTPUT_MODE: u32 = 0o644;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let args = cli::args();

    match args.subcommand() {
        Some(("serve", args)) => run_serve(args),
        Some(("prometheus", args)) => run_prom(args),

        _ => Err(anyhow!("subcommand is required")),
    }
}

// ----------------------------------------------------------------------------
// runner
// ----------------------------------------------------------------------------

fn run_serve(args: &ArgMatches) -> Result<()> {
    let collector = collector(args);

    // UNWRAP has default
    let address = *args.get_one::<IpAddr>("address").unwrap();

    // UNWRAP has default
    let port = *args.get_one::<u16>("port").unwrap();

    // UNWRAP has default
    let endpoint = args.get_one::<String>("endpoint").unwrap();

    let config = server::Config {
        address: SocketAddr::new(address, port),
        endpoint: format!("/{}", endpoint.trim_start_matches('/')),
        exit_on_error: args.get_flag("exit-on-error"),
    };

    let pool = collector.pool().to_owned();

    let exporter = Exporter::new(collector)
        .with_context(|| format!("initial collection of pool {pool}"))?;

    info!("pool {pool} found, initial collection succeeded");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building async runtime")?;

    runtime.block_on(server::serve(exporter, config))
}

fn run_prom(args: &ArgMatches) -> Result<()> {
    let collector = collector(args);

    collector.check_exists()?;

    let mut snapshot = PoolSnapshot::new(collector.pool());
    collector
        .collect(&mut snapshot)
        .with_context(|| format!("collecting pool {}", collector.pool()))?;

    if let Some(output) = args.get_one::<PathBuf>("output") {
        write_atomically(output, &snapshot)
    } else {
        let mut output = BufWriter::new(io::stdout().lock());
        zpoxi::prom::write_metrics(&snapshot, &mut output)
            .context("converting internal data to prometheus")?;
        output.flush().context("flushing stdout")
    }
}

// ----------------------------------------------------------------------------
// helper
// ----------------------------------------------------------------------------

fn collector(args: &ArgMatches) -> Collector<ZpoolCommand> {
    // UNWRAP has default
    let pool = args.get_one::<String>("pool").unwrap();

    // UNWRAP has default
    let zpool = args.get_one::<PathBuf>("zpool").unwrap();

    Collector::new(ZpoolCommand::new(zpool), pool)
}

/// Writes to a temporary file next to `path` and renames it afterwards, so
/// readers never see a partially written file.
///
/// The mode of an existing file at `path` is kept, new files get
/// [`OUTPUT_MODE`].
fn write_atomically(path: &Path, snapshot: &PoolSnapshot) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mode = fs::metadata(path).map_or(OUTPUT_MODE, |metadata| {
        metadata.permissions().mode() & 0o7777
    });

    let file = NamedTempFile::new_in(dir).with_context(|| {
        format!("creating temporary file in: {}", dir.display())
    })?;

    file.as_file()
        .set_permissions(Permissions::from_mode(mode))
        .with_context(|| format!("setting mode {mode:o} of temporary file"))?;

    let mut output = BufWriter::new(file);

    zpoxi::prom::write_metrics(snapshot, &mut output)
        .context("converting internal data to prometheus")?;

    let file = output
        .into_inner()
        .map_err(io::IntoInnerError::into_error)
        .context("flushing temporary file")?;

    file.persist(path).with_context(|| {
        format!("replacing output file: {}", path.display())
    })?;

    Ok(())
}

// ----------------------------------------------------------------------------
// tests
// ----------------------------------------------------------------------------
