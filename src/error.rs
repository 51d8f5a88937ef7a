//! Error types.

use std::fmt;
use std::io;

/// The `zpool` report a parse error originates from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Report {
    /// `zpool status <pool>`
    Topology,

    /// `zpool list -H -o health <pool>`
    Health,

    /// `zpool list -H -o cap <pool>`
    Capacity,

    /// `zpool iostat <pool> 1 2`
    Iostat,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Topology => "topology",
            Self::Health => "health",
            Self::Capacity => "capacity",
            Self::Iostat => "iostat",
        };

        f.write_str(name)
    }
}

/// Errors of this library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A report did not have the expected shape.
    #[error("parsing {report} report: {reason}")]
    Parse {
        /// The report that failed to parse.
        report: Report,

        /// What was wrong with it.
        reason: String,
    },

    /// The `zpool` tool could not be run.
    #[error("error running: {command}")]
    ToolInvocation {
        /// The command line that failed.
        command: String,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The monitored pool does not exist.
    #[error("no such pool: {0}")]
    PoolNotFound(String),

    /// Writing metrics failed.
    #[error("writing metrics")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn parse(report: Report, reason: impl Into<String>) -> Self {
        Self::Parse {
            report,
            reason: reason.into(),
        }
    }
}

/// Result type of this library.
pub type Result<T, E = Error> = std::result::Result<T, E>;
