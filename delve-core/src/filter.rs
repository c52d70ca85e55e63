// Include/exclude filters over status codes and body sizes

use crate::error::{FuzzError, Result};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Exact values plus inclusive ranges, parsed from strings like `"403,500-599"`.
///
/// An empty spec matches every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    exact: BTreeSet<u64>,
    ranges: Vec<(u64, u64)>,
}

impl FilterSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let malformed = |reason: String| FuzzError::MalformedFilterSpec {
            spec: spec.to_string(),
            reason,
        };

        let mut filter = FilterSpec::default();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(malformed("empty entry".to_string()));
            }

            if let Some((low, high)) = part.split_once('-') {
                let low = parse_bound(low).map_err(&malformed)?;
                let high = parse_bound(high).map_err(&malformed)?;
                if low > high {
                    return Err(malformed(format!(
                        "range '{}' has its lower bound above its upper bound",
                        part
                    )));
                }
                filter.ranges.push((low, high));
            } else {
                filter.exact.insert(parse_bound(part).map_err(&malformed)?);
            }
        }

        Ok(filter)
    }

    pub fn matches(&self, value: u64) -> bool {
        if self.is_empty() {
            return true;
        }
        self.exact.contains(&value)
            || self
                .ranges
                .iter()
                .any(|&(low, high)| low <= value && value <= high)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.ranges.is_empty()
    }

    pub fn exact(&self) -> impl Iterator<Item = u64> + '_ {
        self.exact.iter().copied()
    }

    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }
}

impl FromStr for FilterSpec {
    type Err = FuzzError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_bound(raw: &str) -> std::result::Result<u64, String> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .map_err(|_| format!("'{}' is not a non-negative integer", raw))
}

/// The four filter stages, in the order they are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    IncludeStatus,
    IncludeSize,
    ExcludeStatus,
    ExcludeSize,
}

impl FilterStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterStage::IncludeStatus => "include-status",
            FilterStage::IncludeSize => "include-size",
            FilterStage::ExcludeStatus => "exclude-status",
            FilterStage::ExcludeSize => "exclude-size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(FilterStage),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Configured filters. A `None` stage is skipped entirely, so an unset exclude
/// filter never rejects anything.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    pub include_status: Option<FilterSpec>,
    pub include_size: Option<FilterSpec>,
    pub exclude_status: Option<FilterSpec>,
    pub exclude_size: Option<FilterSpec>,
}

impl FilterChain {
    /// Parse the four raw spec strings. Absent or blank strings leave the stage unset.
    pub fn from_specs(
        include_status: Option<&str>,
        include_size: Option<&str>,
        exclude_status: Option<&str>,
        exclude_size: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            include_status: parse_optional(include_status)?,
            include_size: parse_optional(include_size)?,
            exclude_status: parse_optional(exclude_status)?,
            exclude_size: parse_optional(exclude_size)?,
        })
    }

    /// First failing stage wins.
    pub fn evaluate(&self, status: u16, size: u64) -> Verdict {
        let status = u64::from(status);

        if let Some(spec) = &self.include_status
            && !spec.matches(status)
        {
            return Verdict::Rejected(FilterStage::IncludeStatus);
        }
        if let Some(spec) = &self.include_size
            && !spec.matches(size)
        {
            return Verdict::Rejected(FilterStage::IncludeSize);
        }
        if let Some(spec) = &self.exclude_status
            && spec.matches(status)
        {
            return Verdict::Rejected(FilterStage::ExcludeStatus);
        }
        if let Some(spec) = &self.exclude_size
            && spec.matches(size)
        {
            return Verdict::Rejected(FilterStage::ExcludeSize);
        }

        Verdict::Accepted
    }

    pub fn is_empty(&self) -> bool {
        self.include_status.is_none()
            && self.include_size.is_none()
            && self.exclude_status.is_none()
            && self.exclude_size.is_none()
    }
}

fn parse_optional(spec: Option<&str>) -> Result<Option<FilterSpec>> {
    match spec.map(str::trim) {
        None | Some("") => Ok(None),
        Some(spec) => FilterSpec::parse(spec).map(Some),
    }
}
