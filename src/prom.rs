//! Prometheus metrics.

use std::io::Write;

use crate::error::Result;
use crate::snapshot::PoolSnapshot;

/// Content type of the prometheus text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Writes the snapshot as prometheus metrics to `output`.
///
/// # Errors
///
/// This function uses [`writeln`] to write to `output`. It can only fail if
/// any of these [`writeln`] fails.
pub fn write_metrics<O>(snapshot: &PoolSnapshot, output: &mut O) -> Result<()>
where
    O: Write,
{
    let rates = snapshot.rates();

    let gauges: [(&str, &str, u64); 8] = [
        (
            "zpool_capacity_percentage",
            "Current zpool capacity level",
            snapshot.capacity_percent().into(),
        ),
        (
            "zpool_healthy",
            "Whether the zpool health is ONLINE",
            snapshot.healthy().into(),
        ),
        (
            "zpool_online_providers_count",
            "Number of ONLINE zpool providers (disks)",
            snapshot.online_devices(),
        ),
        (
            "zpool_faulted_providers_count",
            "Number of FAULTED/UNAVAIL zpool providers (disks)",
            snapshot.faulted_devices(),
        ),
        (
            "zpool_operations_read",
            "Pool-wide read operations in the last second",
            rates.read_ops(),
        ),
        (
            "zpool_operations_write",
            "Pool-wide write operations in the last second",
            rates.write_ops(),
        ),
        (
            "zpool_bandwidth_read",
            "Pool-wide read bandwidth in the last second",
            rates.read_bytes(),
        ),
        (
            "zpool_bandwidth_write",
            "Pool-wide write bandwidth in the last second",
            rates.write_bytes(),
        ),
    ];

    for (name, help, value) in gauges {
        writeln!(output, "# HELP {name} {help}")?;
        writeln!(output, "# TYPE {name} gauge")?;
        writeln!(output, "{name}{{pool=\"{}\"}} {value}", snapshot.name())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Classifier;

    #[test]
    fn prometheus() {
        let mut snapshot = PoolSnapshot::new("tank");

        snapshot
            .update_providers(
                include_str!("status-degraded.in"),
                &Classifier::new("tank"),
            )
            .unwrap();
        snapshot.update_health("DEGRADED\n").unwrap();
        snapshot.update_capacity("57%\n").unwrap();
        snapshot
            .update_iostat(include_str!("iostat-example.in"))
            .unwrap();

        let mut output = vec![];
        write_metrics(&snapshot, &mut output).unwrap();

        let metrics = std::str::from_utf8(output.as_slice()).unwrap();

        let expected = include_str!("snapshot-example.prom");
        assert_eq!(metrics, expected);
    }
}
