//! Pool state snapshot.

use crate::error::Result;
use crate::iostat::{self, Rates};
use crate::list;
use crate::status::{self, Classify};

/// The last observed state of a pool.
///
/// Each `update_*` function consumes one `zpool` report and updates the
/// fields that report covers. Fields of other reports are left untouched.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct PoolSnapshot {
    name: String,
    capacity_percent: u8,
    healthy: bool,
    status_label: String,
    online: u64,
    faulted: u64,
    rates: Rates,
}

impl PoolSnapshot {
    /// Returns an empty snapshot for the named pool.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the pool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the used capacity in percent.
    #[must_use]
    pub const fn capacity_percent(&self) -> u8 {
        self.capacity_percent
    }

    /// Returns `true` if the pool health is `ONLINE`.
    #[must_use]
    pub const fn healthy(&self) -> bool {
        self.healthy
    }

    /// Returns the raw status token of the topology report.
    #[must_use]
    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    /// Returns the number of `ONLINE` devices.
    #[must_use]
    pub const fn online_devices(&self) -> u64 {
        self.online
    }

    /// Returns the number of `FAULTED` or `UNAVAIL` devices.
    #[must_use]
    pub const fn faulted_devices(&self) -> u64 {
        self.faulted
    }

    /// Returns the I/O rates of the most recent sample.
    #[must_use]
    pub const fn rates(&self) -> &Rates {
        &self.rates
    }

    /// Updates status label and device counts from `zpool status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the overall status is unknown. The counts are
    /// updated anyway, with at least one faulted device.
    pub fn update_providers<C>(
        &mut self,
        report: &str,
        classifier: &C,
    ) -> Result<()>
    where
        C: Classify + ?Sized,
    {
        let (providers, result) = match status::parse(report, classifier) {
            Ok(providers) => (providers, Ok(())),
            Err((providers, error)) => (providers, Err(error)),
        };

        self.status_label = providers.label;
        self.online = providers.online;
        self.faulted = providers.faulted;

        result
    }

    /// Updates health from `zpool list -H -o health`.
    ///
    /// # Errors
    ///
    /// Returns an error if the health token is unknown. The pool is marked
    /// unhealthy anyway.
    pub fn update_health(&mut self, report: &str) -> Result<()> {
        match list::parse_health(report) {
            Ok(status) => {
                self.healthy = status.is_healthy();
                Ok(())
            }

            Err((status, error)) => {
                self.healthy = status.is_healthy();
                Err(error)
            }
        }
    }

    /// Updates capacity from `zpool list -H -o cap`.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity can't be parsed, in which case the
    /// previous value is kept.
    pub fn update_capacity(&mut self, report: &str) -> Result<()> {
        self.capacity_percent = list::parse_capacity(report)?;
        Ok(())
    }

    /// Updates I/O rates from `zpool iostat <pool> 1 2`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report does not have the expected shape, in
    /// which case the previous rates are kept.
    pub fn update_iostat(&mut self, report: &str) -> Result<()> {
        self.rates = iostat::parse(report)?;
        Ok(())
    }
}
