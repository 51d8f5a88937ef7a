//! Collection cycles.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use log::{debug, warn};

use crate::error::Result;
use crate::prom;
use crate::snapshot::PoolSnapshot;
use crate::status::Classifier;
use crate::zpool::{self, Zpool};

/// Runs the `zpool` commands of one collection cycle.
#[derive(Debug)]
pub struct Collector<Z> {
    zpool: Z,
    pool: String,
    classifier: Classifier,
}

impl<Z: Zpool> Collector<Z> {
    /// Returns a collector for `pool`.
    #[must_use]
    pub fn new(zpool: Z, pool: impl Into<String>) -> Self {
        let pool = pool.into();
        let classifier = Classifier::new(&pool);

        Self {
            zpool,
            pool,
            classifier,
        }
    }

    /// Returns the pool name.
    #[must_use]
    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// Checks that the pool exists.
    ///
    /// # Errors
    ///
    /// Returns an error if `zpool` can't be run or the pool does not exist.
    pub fn check_exists(&self) -> Result<()> {
        zpool::check_exists(&self.zpool, &self.pool)
    }

    /// Runs one collection cycle, updating `snapshot` in place.
    ///
    /// Reports are fetched and parsed strictly in the order topology, health,
    /// capacity, iostat. The iostat sample blocks for one second.
    ///
    /// # Errors
    ///
    /// Returns the first error, without running the remaining steps. Steps
    /// that already ran have updated `snapshot`.
    pub fn collect(&self, snapshot: &mut PoolSnapshot) -> Result<()> {
        let pool = self.pool.as_str();

        let report = self.zpool.run(&["status", pool])?;
        let providers = snapshot.update_providers(&report, &self.classifier);
        if let Err(error) = providers {
            warn!(
                "pool {pool}: unknown status {:?}, reporting {} faulted",
                snapshot.status_label(),
                snapshot.faulted_devices()
            );
            return Err(error);
        }

        let report = self.zpool.run(&["list", "-H", "-o", "health", pool])?;
        snapshot.update_health(&report)?;

        let report = self.zpool.run(&["list", "-H", "-o", "cap", pool])?;
        snapshot.update_capacity(&report)?;

        let report = self.zpool.run(&["iostat", pool, "1", "2"])?;
        snapshot.update_iostat(&report)?;

        debug!("pool {pool}: collected {snapshot:?}");

        Ok(())
    }
}

/// Shares one [`PoolSnapshot`] between collection and metric output.
///
/// Scrapes are serialized: each scrape runs a full collection cycle and
/// writes the result while holding the lock.
#[derive(Debug)]
pub struct Exporter<Z> {
    collector: Collector<Z>,
    snapshot: Mutex<PoolSnapshot>,
}

impl<Z: Zpool> Exporter<Z> {
    /// Checks that the pool exists and collects the initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool does not exist, if `zpool` can't be run
    /// or if the first collection cycle fails.
    pub fn new(collector: Collector<Z>) -> Result<Self> {
        collector.check_exists()?;

        let mut snapshot = PoolSnapshot::new(collector.pool());
        collector.collect(&mut snapshot)?;

        Ok(Self {
            collector,
            snapshot: Mutex::new(snapshot),
        })
    }

    /// Runs a collection cycle and writes the metrics to `output`.
    ///
    /// The shared snapshot is only replaced if the whole cycle succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the cycle fails, in which case the previous
    /// snapshot is kept and nothing is written, or if writing fails.
    pub fn scrape<O: Write>(&self, output: &mut O) -> Result<()> {
        let mut snapshot = self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut next = snapshot.clone();
        self.collector.collect(&mut next)?;
        *snapshot = next;

        prom::write_metrics(&snapshot, output)
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PoolSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
