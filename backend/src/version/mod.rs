//! Version and timestamp resolution.
//!
//! | previous | changed | version              | updatedAt          |
//! |----------|---------|----------------------|--------------------|
//! | absent   | -       | `1.0`                | now                |
//! | present  | no      | previous             | previous           |
//! | present  | yes     | previous, minor + 1  | now                |
//!
//! The major component is never bumped here.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::{VersionError, VersionResult};
use crate::models::PublishedArtifact;

static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\.([0-9]+)$").expect("valid version pattern"));

/// A `<major>.<minor>` API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
}

impl Version {
    /// First version ever published.
    pub const INITIAL: Version = Version { major: 1, minor: 0 };

    pub fn bump_minor(self) -> VersionResult<Version> {
        let minor = self
            .minor
            .checked_add(1)
            .ok_or_else(|| VersionError::OutOfRange(self.to_string()))?;
        Ok(Version { minor, ..self })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_PATTERN
            .captures(s)
            .ok_or_else(|| VersionError::Malformed(s.to_string()))?;

        let component = |i: usize| {
            caps[i]
                .parse::<u64>()
                .map_err(|_| VersionError::OutOfRange(s.to_string()))
        };

        Ok(Version {
            major: component(1)?,
            minor: component(2)?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Version metadata for the artifact about to be published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: String,
    pub updated_at: String,
}

/// Format a timestamp the way the artifact stores it (`2024-01-01T00:00:00.000Z`).
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decide the version and timestamp of the next artifact.
///
/// A stored version that isn't `<major>.<minor>` is an error whether or not
/// the content changed: nothing gets published on top of it.
pub fn resolve(
    previous: Option<&PublishedArtifact>,
    changed: bool,
    now: DateTime<Utc>,
) -> VersionResult<Release> {
    let Some(previous) = previous else {
        return Ok(Release {
            version: Version::INITIAL.to_string(),
            updated_at: format_timestamp(now),
        });
    };

    let current: Version = previous.version.parse()?;

    if !changed {
        return Ok(Release {
            version: previous.version.clone(),
            updated_at: previous.updated_at.clone(),
        });
    }

    Ok(Release {
        version: current.bump_minor()?.to_string(),
        updated_at: format_timestamp(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dataset;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 3, 4, 5).unwrap()
    }

    fn previous(version: &str) -> PublishedArtifact {
        PublishedArtifact::new(
            version.to_string(),
            "2023-01-01T00:00:00.000Z".to_string(),
            Dataset::default(),
        )
    }

    #[test]
    fn test_no_previous_starts_at_1_0() {
        let release = resolve(None, true, now()).unwrap();
        assert_eq!(release.version, "1.0");
        assert_eq!(release.updated_at, "2024-09-01T03:04:05.000Z");

        let release = resolve(None, false, now()).unwrap();
        assert_eq!(release.version, "1.0");
    }

    #[test]
    fn test_unchanged_keeps_version_and_timestamp() {
        let release = resolve(Some(&previous("1.4")), false, now()).unwrap();
        assert_eq!(release.version, "1.4");
        assert_eq!(release.updated_at, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_changed_bumps_minor() {
        let release = resolve(Some(&previous("1.9")), true, now()).unwrap();
        assert_eq!(release.version, "1.10");
        assert_eq!(release.updated_at, "2024-09-01T03:04:05.000Z");

        let release = resolve(Some(&previous("2.0")), true, now()).unwrap();
        assert_eq!(release.version, "2.1");
    }

    #[test]
    fn test_monotonic_sequence() {
        let mut artifact = previous("1.0");
        for expected in ["1.1", "1.2", "1.3"] {
            let release = resolve(Some(&artifact), true, now()).unwrap();
            assert_eq!(release.version, expected);
            artifact.version = release.version;
        }
    }

    #[test]
    fn test_malformed_versions_fail() {
        for bad in ["abc", "1", "1.2.3", "v1.0", "1.", ".1", " 1.0", "1.0 ", "-1.0", ""] {
            let err = resolve(Some(&previous(bad)), true, now()).unwrap_err();
            assert!(matches!(err, VersionError::Malformed(_)), "{bad}");
            assert!(err.to_string().contains(&format!("\"{bad}\"")));

            // Unchanged content doesn't excuse a broken lineage
            assert!(resolve(Some(&previous(bad)), false, now()).is_err());
        }
    }

    #[test]
    fn test_out_of_range_component() {
        let err = "1.99999999999999999999999".parse::<Version>().unwrap_err();
        assert!(matches!(err, VersionError::OutOfRange(_)));

        let max = Version { major: 1, minor: u64::MAX };
        assert!(max.bump_minor().is_err());
    }

    #[test]
    fn test_leading_zeros_are_normalized_on_bump() {
        let release = resolve(Some(&previous("01.09")), true, now()).unwrap();
        assert_eq!(release.version, "1.10");
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(ts), "2024-01-01T00:00:00.123Z");
    }
}
