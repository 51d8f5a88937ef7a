//! Running `zpool`.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use bstr::ByteSlice;
use log::debug;

use crate::error::{Error, Result};

/// Default `zpool` binary, looked up in `PATH`.
pub const DEFAULT_ZPOOL: &str = "zpool";

/// Something that answers `zpool` invocations with their text output.
pub trait Zpool {
    /// Runs `zpool` with `args` and returns stdout and stderr combined.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool could not be run at all. A non-zero exit
    /// status is **not** an error, the output is returned regardless.
    fn run(&self, args: &[&str]) -> Result<String>;
}

/// Runs the real `zpool` binary.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ZpoolCommand {
    program: OsString,
}

impl ZpoolCommand {
    /// Returns a runner for the given `zpool` binary.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ZpoolCommand {
    fn default() -> Self {
        Self::new(DEFAULT_ZPOOL)
    }
}

impl Zpool for ZpoolCommand {
    fn run(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        cmd.stdin(Stdio::null());

        debug!("running: {cmd:?}");

        let output = cmd.output().map_err(|source| Error::ToolInvocation {
            command: format!("{cmd:?}"),
            source,
        })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        Ok(combined.to_str_lossy().into_owned())
    }
}

/// Checks that `pool` exists.
///
/// # Errors
///
/// Returns an error if running `zpool list <pool>` fails or if it reports
/// that there is no such pool.
pub fn check_exists<Z>(zpool: &Z, pool: &str) -> Result<()>
where
    Z: Zpool + ?Sized,
{
    let output = zpool.run(&["list", pool])?;

    if output.contains("no such pool") {
        Err(Error::PoolNotFound(pool.into()))
    } else {
        Ok(())
    }
}
