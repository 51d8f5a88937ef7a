//! `zpool iostat <pool> 1 2` parsing.

use crate::error::{Error, Report, Result};
use crate::util::decode_suffix;

/// Number of lines the report has at least: the sample line and whatever
/// trails it.
const MIN_LINES: usize = 2;

/// Number of fields of a sample line: pool, alloc, free, read ops,
/// write ops, read bandwidth, write bandwidth.
const MIN_FIELDS: usize = 7;

/// Pool-wide I/O rates of one sampling interval.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default,
)]
pub struct Rates {
    pub(crate) read_ops: u64,
    pub(crate) write_ops: u64,
    pub(crate) read_bytes: u64,
    pub(crate) write_bytes: u64,
}

impl Rates {
    /// Returns read operations per second.
    #[must_use]
    pub const fn read_ops(&self) -> u64 {
        self.read_ops
    }

    /// Returns write operations per second.
    #[must_use]
    pub const fn write_ops(&self) -> u64 {
        self.write_ops
    }

    /// Returns read bytes per second.
    #[must_use]
    pub const fn read_bytes(&self) -> u64 {
        self.read_bytes
    }

    /// Returns written bytes per second.
    #[must_use]
    pub const fn write_bytes(&self) -> u64 {
        self.write_bytes
    }
}

/// Parses a two sample `zpool iostat <pool> 1 2` report.
///
/// The first sample is the average since import and is skipped. The second
/// sample, on the second to last line, covers the last second.
///
/// # Errors
///
/// Returns an error if the report has fewer than two lines or the sample
/// line has fewer than seven fields.
pub fn parse(report: &str) -> Result<Rates> {
    let lines = report
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect::<Vec<_>>();

    if lines.len() < MIN_LINES {
        return Err(Error::parse(
            Report::Iostat,
            format!(
                "expected at least {MIN_LINES} lines, got {}",
                lines.len()
            ),
        ));
    }

    let sample = lines[lines.len() - 2];

    let tokens = sample.split_whitespace().collect::<Vec<_>>();

    if tokens.len() < MIN_FIELDS {
        return Err(Error::parse(
            Report::Iostat,
            format!(
                "expected at least {MIN_FIELDS} fields, got {}: {sample:?}",
                tokens.len()
            ),
        ));
    }

    Ok(Rates {
        read_ops: decode_suffix(tokens[3]),
        write_ops: decode_suffix(tokens[4]),
        read_bytes: decode_suffix(tokens[5]),
        write_bytes: decode_suffix(tokens[6]),
    })
}
