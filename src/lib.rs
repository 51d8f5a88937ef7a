//! ZFS pool library for prometheus metrics.

#![deny(clippy::all, missing_docs)]
#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]

pub mod collect;
pub mod error;
pub mod iostat;
pub mod list;
pub mod prom;
pub mod snapshot;
pub mod status;
pub mod util;
pub mod zpool;

pub use crate::collect::{Collector, Exporter};
pub use crate::error::{Error, Report, Result};
pub use crate::snapshot::PoolSnapshot;
