//! `zpool list -H -o <property>` parsing.

use crate::error::{Error, Report, Result};
use crate::status::PoolStatus;

/// Parses the output of `zpool list -H -o health <pool>`.
///
/// # Errors
///
/// Returns an error if the token is not one of `ONLINE`, `DEGRADED` or
/// `FAULTED`. A pool with an unknown health is never healthy, so callers get
/// [`PoolStatus::Unknown`] back along with the error.
pub fn parse_health(report: &str) -> Result<PoolStatus, (PoolStatus, Error)> {
    let token = report.trim_matches(['\r', '\n']);

    token.parse::<PoolStatus>().map_err(|reason| {
        (PoolStatus::Unknown, Error::parse(Report::Health, reason))
    })
}

/// Parses the output of `zpool list -H -o cap <pool>`, e.g. `57%`.
///
/// Anything after the first `%` is ignored.
///
/// # Errors
///
/// Returns an error if the part before the first `%` is not a small
/// non-negative integer.
pub fn parse_capacity(report: &str) -> Result<u8> {
    let number = report.split('%').next().unwrap_or_default().trim();

    number.parse::<u8>().map_err(|error| {
        Error::parse(
            Report::Capacity,
            format!("parsing capacity token {number:?} to u8: {error}"),
        )
    })
}
