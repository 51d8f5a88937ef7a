//! `zpool status` parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Report, Result};

// ----------------------------------------------------------------------------
// pool status
// ----------------------------------------------------------------------------

/// Overall pool status as reported by `zpool`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum PoolStatus {
    /// All devices are working.
    Online,

    /// Redundancy is reduced but the pool still serves data.
    Degraded,

    /// The pool can not serve data.
    Faulted,

    /// Anything else, including reports that could not be parsed.
    #[default]
    Unknown,
}

impl PoolStatus {
    /// Returns `true` if this is [`PoolStatus::Online`].
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl FromStr for PoolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(Self::Online),
            "DEGRADED" => Ok(Self::Degraded),
            "FAULTED" => Ok(Self::Faulted),
            unknown => Err(format!("unknown status: {unknown:?}")),
        }
    }
}

impl fmt::Display for PoolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Online => "ONLINE",
            Self::Degraded => "DEGRADED",
            Self::Faulted => "FAULTED",
            Self::Unknown => "UNKNOWN",
        };

        f.write_str(s)
    }
}

// ----------------------------------------------------------------------------
// line classification
// ----------------------------------------------------------------------------

/// What a single line of the topology report represents.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Line {
    /// Headers, keywords, the pool itself and vdev containers.
    Structural,

    /// A leaf device that is `ONLINE`.
    Online,

    /// A leaf device that is `FAULTED` or `UNAVAIL`.
    Faulted,

    /// A leaf device in any other state, or a line without a state.
    Other,
}

/// Decides what a line of the topology report is.
///
/// Device counting only depends on this, so format changes of `zpool status`
/// can be handled by swapping the classifier.
pub trait Classify {
    /// Classifies a single line.
    fn classify(&self, line: &str) -> Line;
}

impl<F> Classify for F
where
    F: Fn(&str) -> Line,
{
    fn classify(&self, line: &str) -> Line {
        self(line)
    }
}

const KEYWORDS: &[&str] = &[
    "pool:", "state:", "status:", "action:", "see:", "scan:", "config:",
    "errors", "errors:", "NAME",
];

const CONTAINERS: &[&str] =
    &["mirror-", "raid0-", "raid10-", "spare-", "replacing-"];

/// Default classifier for OpenZFS `zpool status` output.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Classifier {
    pool: String,
}

impl Classifier {
    /// Returns a classifier for the given pool.
    #[must_use]
    pub fn new(pool: impl Into<String>) -> Self {
        Self { pool: pool.into() }
    }
}

impl Classify for Classifier {
    fn classify(&self, line: &str) -> Line {
        let mut tokens = line.split_whitespace();

        let Some(name) = tokens.next() else {
            return Line::Other;
        };

        if name == self.pool
            || KEYWORDS.contains(&name)
            || is_container(name)
        {
            return Line::Structural;
        }

        let mut line_kind = Line::Other;

        for token in tokens {
            match token {
                "FAULTED" | "UNAVAIL" => return Line::Faulted,
                "ONLINE" => line_kind = Line::Online,
                _ => {}
            }
        }

        line_kind
    }
}

/// Returns `true` for vdev labels like `mirror-0`, `raidz2-1` or
/// `draid1:4d:8c:0s-0`.
fn is_container(name: &str) -> bool {
    if CONTAINERS.iter().any(|prefix| name.starts_with(prefix)) {
        return true;
    }

    ["raidz", "draid"].iter().any(|kind| {
        name.strip_prefix(kind).is_some_and(|rest| {
            rest.rsplit_once('-').is_some_and(|(level, index)| {
                !index.is_empty()
                    && index.bytes().all(|b| b.is_ascii_digit())
                    && (kind == &"draid"
                        || level.bytes().all(|b| b.is_ascii_digit()))
            })
        })
    })
}

// ----------------------------------------------------------------------------
// topology report
// ----------------------------------------------------------------------------

/// Device counts parsed from `zpool status`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Providers {
    pub(crate) label: String,
    pub(crate) online: u64,
    pub(crate) faulted: u64,
}

impl Providers {
    /// Returns the raw status token of the `state:` line.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the number of `ONLINE` leaf devices.
    #[must_use]
    pub const fn online(&self) -> u64 {
        self.online
    }

    /// Returns the number of `FAULTED` or `UNAVAIL` leaf devices.
    #[must_use]
    pub const fn faulted(&self) -> u64 {
        self.faulted
    }
}

/// Parses a `zpool status` report.
///
/// The overall status is the third space separated field of the second line,
/// i.e. ` state: ONLINE`. All other lines are counted according to
/// `classifier`.
///
/// # Errors
///
/// Returns an error if the overall status is not one of `ONLINE`, `DEGRADED`
/// or `FAULTED`. The [`Providers`] are still returned alongside the error,
/// with at least one faulted device, so that a caller can report the pool as
/// broken instead of healthy.
pub fn parse<C>(
    report: &str,
    classifier: &C,
) -> Result<Providers, (Providers, Error)>
where
    C: Classify + ?Sized,
{
    let mut lines = report.lines().map(|line| line.trim_end_matches('\r'));

    let _header = lines.next();

    let label = lines
        .next()
        .and_then(|line| line.split(' ').nth(2))
        .unwrap_or_default()
        .to_owned();

    let mut providers = Providers {
        label,
        ..Providers::default()
    };

    for line in lines {
        match classifier.classify(line) {
            Line::Online => providers.online += 1,
            Line::Faulted => providers.faulted += 1,
            Line::Structural | Line::Other => {}
        }
    }

    match providers.label.parse::<PoolStatus>() {
        Ok(_) => Ok(providers),
        Err(reason) => {
            providers.faulted = providers.faulted.max(1);
            let error = Error::parse(Report::Topology, reason);
            Err((providers, error))
        }
    }
}

// ----------------------------------------------------------------------------
// tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online() {
        let input = include_str!("status-online.in");

        let providers = parse(input, &Classifier::new("tank")).unwrap();

        assert_eq!(
            providers,
            Providers {
                label: "ONLINE".into(),
                online: 4,
                faulted: 0,
            }
        );
    }

    #[test]
    fn degraded() {
        let input = include_str!("status-degraded.in");

        let providers = parse(input, &Classifier::new("tank")).unwrap();

        assert_eq!(
            providers,
            Providers {
                label: "DEGRADED".into(),
                online: 5,
                faulted: 2,
            }
        );
    }

    #[test]
    fn unknown_status_forces_faulted() {
        let input = include_str!("status-suspended.in");

        let (providers, error) =
            parse(input, &Classifier::new("tank")).unwrap_err();

        assert_eq!(providers.label(), "SUSPENDED");
        assert_eq!(providers.online(), 2);
        assert_eq!(providers.faulted(), 1);

        assert!(matches!(
            error,
            Error::Parse {
                report: Report::Topology,
                ..
            }
        ));
    }

    #[test]
    fn garbage() {
        let input = "cannot open 'tank': no such pool\n";

        let (providers, _error) =
            parse(input, &Classifier::new("tank")).unwrap_err();

        assert_eq!(providers.label(), "");
        assert_eq!(providers.online(), 0);
        assert_eq!(providers.faulted(), 1);
    }

    #[test]
    fn crlf() {
        let input = "  pool: tank\r\n state: ONLINE\r\n\ttank ONLINE 0 0 0\r\n\
                     \t  sda ONLINE 0 0 0\r\n";

        let providers = parse(input, &Classifier::new("tank")).unwrap();

        assert_eq!(providers.label(), "ONLINE");
        assert_eq!(providers.online(), 1);
    }

    #[test]
    fn classify_corpus() {
        let classifier = Classifier::new("tank");

        let corpus = [
            ("  pool: tank", Line::Structural),
            (" state: ONLINE", Line::Structural),
            ("  scan: scrub repaired 0B with 0 errors", Line::Structural),
            ("config:", Line::Structural),
            ("\tNAME STATE READ WRITE CKSUM", Line::Structural),
            ("\ttank ONLINE 0 0 0", Line::Structural),
            ("\t  mirror-0 ONLINE 0 0 0", Line::Structural),
            ("\t  raidz-0 ONLINE 0 0 0", Line::Structural),
            ("\t  raidz1-0 DEGRADED 0 0 0", Line::Structural),
            ("\t  raidz3-12 ONLINE 0 0 0", Line::Structural),
            ("\t  raid10-1 ONLINE 0 0 0", Line::Structural),
            ("\t  draid2:4d:10c:1s-0 ONLINE 0 0 0", Line::Structural),
            ("\t    spare-1 ONLINE 0 0 0", Line::Structural),
            ("errors: No known data errors", Line::Structural),
            ("\t    sda ONLINE 0 0 0", Line::Online),
            ("\t    sdb FAULTED 3 117 0  too many errors", Line::Faulted),
            ("\t    sdc UNAVAIL 0 0 0  cannot open", Line::Faulted),
            ("\t    sdd OFFLINE 0 0 0", Line::Other),
            ("\t    sde AVAIL", Line::Other),
            ("\t    raidzfoo ONLINE 0 0 0", Line::Online),
            ("", Line::Other),
        ];

        for (line, expected) in corpus {
            assert_eq!(classifier.classify(line), expected, "line: {line:?}");
        }
    }

    #[test]
    fn closure_classifier() {
        let input = include_str!("status-online.in");

        let everything_online = |line: &str| {
            if line.trim().is_empty() {
                Line::Other
            } else {
                Line::Online
            }
        };

        let providers = parse(input, &everything_online).unwrap();
        assert_eq!(providers.online(), 11);
        assert_eq!(providers.faulted(), 0);
    }

    #[test]
    fn status() {
        assert_eq!("ONLINE".parse(), Ok(PoolStatus::Online));
        assert_eq!("DEGRADED".parse(), Ok(PoolStatus::Degraded));
        assert_eq!("FAULTED".parse(), Ok(PoolStatus::Faulted));
        assert!("online".parse::<PoolStatus>().is_err());
        assert!(PoolStatus::Online.is_healthy());
        assert!(!PoolStatus::Degraded.is_healthy());
        assert!(!PoolStatus::Unknown.is_healthy());
    }
}
