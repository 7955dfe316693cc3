//! Version ranges in interval notation, plus conversion from Cargo requirements.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use semver::{BuildMetadata, Comparator, Op, Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// A dependency constraint onto a package id.
///
/// The minimum is always present; `0.0.0` inclusive stands for "no lower
/// bound". A missing maximum means the range is open above.
///
/// Pre-release versions follow Cargo's rule: one is admitted only when its
/// `major.minor.patch` is listed in `pre_release`, which holds the releases
/// named with a pre-release tag by a bound or a requirement comparator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: Version,
    pub min_inclusive: bool,
    pub max: Option<Version>,
    pub max_inclusive: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub pre_release: BTreeSet<(u64, u64, u64)>,
}

type Bound = Option<(Version, bool)>;

fn release_of(version: &Version) -> (u64, u64, u64) {
    (version.major, version.minor, version.patch)
}

fn next_major(major: u64) -> Option<Version> {
    major.checked_add(1).map(|major| Version::new(major, 0, 0))
}

fn next_minor(major: u64, minor: u64) -> Option<Version> {
    match minor.checked_add(1) {
        Some(minor) => Some(Version::new(major, minor, 0)),
        None => next_major(major),
    }
}

fn next_patch(major: u64, minor: u64, patch: u64) -> Option<Version> {
    match patch.checked_add(1) {
        Some(patch) => Some(Version::new(major, minor, patch)),
        None => next_minor(major, minor),
    }
}

impl VersionRange {
    pub fn new(
        min: Version,
        min_inclusive: bool,
        max: Option<Version>,
        max_inclusive: bool,
    ) -> Self {
        let pre_release = std::iter::once(&min)
            .chain(max.as_ref())
            .filter(|bound| !bound.pre.is_empty())
            .map(release_of)
            .collect();
        Self {
            min,
            min_inclusive,
            max,
            max_inclusive,
            pre_release,
        }
    }

    /// `[min, )`
    pub fn at_least(min: Version) -> Self {
        Self::new(min, true, None, false)
    }

    /// `[min, max)`
    pub fn between(min: Version, max: Version) -> Self {
        Self::new(min, true, Some(max), false)
    }

    /// `[version]`
    pub fn exact(version: Version) -> Self {
        Self::new(version.clone(), true, Some(version), true)
    }

    pub fn any() -> Self {
        Self::at_least(Version::new(0, 0, 0))
    }

    pub fn contains(&self, version: &Version) -> bool {
        if !version.pre.is_empty() && !self.pre_release.contains(&release_of(version)) {
            return false;
        }
        let above = if self.min_inclusive {
            *version >= self.min
        } else {
            *version > self.min
        };
        let below = match &self.max {
            None => true,
            Some(max) if self.max_inclusive => version <= max,
            Some(max) => version < max,
        };
        above && below
    }

    /// The smallest version this range could admit without consulting a registry.
    ///
    /// An exclusive lower bound moves to the release of a pre-release minimum,
    /// or to the next patch release otherwise.
    pub fn lowest_candidate(&self) -> Version {
        if self.min_inclusive {
            return self.min.clone();
        }
        let (major, minor, patch) = release_of(&self.min);
        if self.min.pre.is_empty() {
            next_patch(major, minor, patch).unwrap_or_else(|| self.min.clone())
        } else {
            Version::new(major, minor, patch)
        }
    }

    fn narrowed(mut self, lower: Bound, upper: Bound) -> Self {
        if let Some((min, inclusive)) = lower {
            if min > self.min || (min == self.min && !inclusive) {
                self.min = min;
                self.min_inclusive = inclusive;
            }
        }
        if let Some((max, inclusive)) = upper {
            let tighter = match &self.max {
                None => true,
                Some(current) => max < *current || (max == *current && !inclusive),
            };
            if tighter {
                self.max = Some(max);
                self.max_inclusive = inclusive;
            }
        }
        self
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min_inclusive && self.max_inclusive && self.max.as_ref() == Some(&self.min) {
            return write!(f, "[{}]", self.min);
        }
        let open = if self.min_inclusive { '[' } else { '(' };
        match &self.max {
            Some(max) => {
                let close = if self.max_inclusive { ']' } else { ')' };
                write!(f, "{}{}, {}{}", open, self.min, max, close)
            }
            None => write!(f, "{}{}, )", open, self.min),
        }
    }
}

/// Parse a version, padding missing minor/patch components with zeros.
///
/// `1` and `1.0` both become `1.0.0`; anything `semver` accepts is passed through.
pub fn parse_version_lenient(text: &str) -> Result<Version, RangeError> {
    let text = text.trim();
    if let Ok(version) = Version::parse(text) {
        return Ok(version);
    }

    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() > 3 {
        return Err(RangeError::InvalidVersion(text.to_string()));
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| RangeError::InvalidVersion(text.to_string()))?;
    }
    Ok(Version::new(numbers[0], numbers[1], numbers[2]))
}

impl FromStr for VersionRange {
    type Err = RangeError;

    /// Accepts interval notation (`[1.0, 2.0)`, `(1.0, )`, `(, 2.0]`, `[1.0]`)
    /// or a bare version, which means "at least".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || RangeError::InvalidRange(text.to_string());

        let Some(open) = text.chars().next() else {
            return Err(invalid());
        };
        if open != '[' && open != '(' {
            return Ok(Self::at_least(parse_version_lenient(text)?));
        }

        let close = text.chars().last().ok_or_else(invalid)?;
        if text.len() < 2 || (close != ']' && close != ')') {
            return Err(invalid());
        }
        let inner = &text[1..text.len() - 1];

        let Some((lower, upper)) = inner.split_once(',') else {
            if open != '[' || close != ']' {
                return Err(invalid());
            }
            return Ok(Self::exact(parse_version_lenient(inner)?));
        };

        let (lower, upper) = (lower.trim(), upper.trim());
        let (min, min_inclusive) = if lower.is_empty() {
            (Version::new(0, 0, 0), true)
        } else {
            (parse_version_lenient(lower)?, open == '[')
        };
        let max = if upper.is_empty() {
            None
        } else {
            Some(parse_version_lenient(upper)?)
        };

        Ok(Self::new(min, min_inclusive, max, close == ']'))
    }
}

impl TryFrom<&VersionReq> for VersionRange {
    type Error = RangeError;

    /// Intersect every comparator of a Cargo requirement into one range.
    fn try_from(req: &VersionReq) -> Result<Self, Self::Error> {
        let mut range = req
            .comparators
            .iter()
            .try_fold(Self::any(), |range, comparator| {
                let (lower, upper) = comparator_bounds(comparator)?;
                Ok::<_, RangeError>(range.narrowed(lower, upper))
            })?;
        range.pre_release = req
            .comparators
            .iter()
            .filter(|comparator| !comparator.pre.is_empty())
            .map(|comparator| {
                (
                    comparator.major,
                    comparator.minor.unwrap_or(0),
                    comparator.patch.unwrap_or(0),
                )
            })
            .collect();
        Ok(range)
    }
}

/// Lower and upper bound of one comparator. An upper bound past `u64::MAX`
/// leaves the range open above.
fn comparator_bounds(comparator: &Comparator) -> Result<(Bound, Bound), RangeError> {
    let major = comparator.major;
    let floor = Version {
        major,
        minor: comparator.minor.unwrap_or(0),
        patch: comparator.patch.unwrap_or(0),
        pre: comparator.pre.clone(),
        build: BuildMetadata::EMPTY,
    };
    let below = |version: Option<Version>| version.map(|version| (version, false));
    let above = |version: Option<Version>| {
        version
            .map(|version| Some((version, true)))
            .ok_or_else(|| RangeError::UnsupportedComparator(comparator.to_string()))
    };

    let bounds = match (comparator.op, comparator.minor, comparator.patch) {
        (Op::Exact, Some(_), Some(_)) => (Some((floor.clone(), true)), Some((floor, true))),
        (Op::Exact | Op::Tilde | Op::Wildcard, Some(minor), None) => {
            (Some((floor, true)), below(next_minor(major, minor)))
        }
        (Op::Exact | Op::Tilde | Op::Wildcard | Op::Caret, None, _) => {
            (Some((floor, true)), below(next_major(major)))
        }
        (Op::Tilde, Some(minor), Some(_)) => (Some((floor, true)), below(next_minor(major, minor))),
        (Op::Caret, Some(minor), patch) => {
            let upper = if major > 0 {
                next_major(major)
            } else if minor > 0 {
                next_minor(major, minor)
            } else {
                match patch {
                    Some(patch) => next_patch(major, minor, patch),
                    None => next_minor(major, minor),
                }
            };
            (Some((floor, true)), below(upper))
        }
        (Op::Greater, Some(_), Some(_)) => (Some((floor, false)), None),
        (Op::Greater, Some(minor), None) => (above(next_minor(major, minor))?, None),
        (Op::Greater, None, _) => (above(next_major(major))?, None),
        (Op::GreaterEq, _, _) => (Some((floor, true)), None),
        (Op::Less, _, _) => (None, Some((floor, false))),
        (Op::LessEq, Some(_), Some(_)) => (None, Some((floor, true))),
        (Op::LessEq, Some(minor), None) => (None, below(next_minor(major, minor))),
        (Op::LessEq, None, _) => (None, below(next_major(major))),
        _ => return Err(RangeError::UnsupportedComparator(comparator.to_string())),
    };
    Ok(bounds)
}
