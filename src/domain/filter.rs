//! Filter specification for a single extraction run.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from constructing an invalid filter specification.
///
/// All variants are detected before any store access.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("extraction limit must be at least 1")]
    ZeroLimit,

    #[error("from-date {from} is after to-date {to}")]
    InvertedRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("invalid date token: {0}")]
    InvalidDate(String),
}

/// The date-bound query mode a filter specification resolves to.
///
/// The four modes are disjoint and each maps to its own complete query
/// template in the store adapter. Combining both bounds as independent
/// clauses of a single template is exactly the construction that
/// produced off-range results in the past, so the distinction is kept
/// explicit in the type rather than as branches inside one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// No bounds: the most recently modified notes.
    Latest,
    /// Notes modified on or after the bound.
    Forward(DateTime<Utc>),
    /// Notes modified on or before the bound.
    Backward(DateTime<Utc>),
    /// Notes modified within the inclusive range.
    Range(DateTime<Utc>, DateTime<Utc>),
}

/// An immutable description of which notes one invocation selects.
///
/// Constructed once per run through [`FilterSpec::new`], which rejects
/// invalid combinations up front.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    limit: usize,
    from_bound: Option<DateTime<Utc>>,
    to_bound: Option<DateTime<Utc>>,
    text_filter: Option<String>,
    exclude_marked: bool,
}

impl FilterSpec {
    /// Builds a validated filter specification.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::ZeroLimit` if `limit` is zero, and
    /// `FilterError::InvertedRange` if both bounds are set with
    /// `from_bound > to_bound`. Neither is silently corrected.
    pub fn new(
        limit: usize,
        from_bound: Option<DateTime<Utc>>,
        to_bound: Option<DateTime<Utc>>,
        text_filter: Option<String>,
        exclude_marked: bool,
    ) -> Result<Self, FilterError> {
        if limit == 0 {
            return Err(FilterError::ZeroLimit);
        }
        if let (Some(from), Some(to)) = (from_bound, to_bound)
            && from > to
        {
            return Err(FilterError::InvertedRange { from, to });
        }
        let text_filter = text_filter.filter(|t| !t.trim().is_empty());
        Ok(Self {
            limit,
            from_bound,
            to_bound,
            text_filter,
            exclude_marked,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn from_bound(&self) -> Option<DateTime<Utc>> {
        self.from_bound
    }

    pub fn to_bound(&self) -> Option<DateTime<Utc>> {
        self.to_bound
    }

    pub fn text_filter(&self) -> Option<&str> {
        self.text_filter.as_deref()
    }

    pub fn exclude_marked(&self) -> bool {
        self.exclude_marked
    }

    /// Resolves the date bounds into one of the four disjoint query modes.
    pub fn mode(&self) -> QueryMode {
        match (self.from_bound, self.to_bound) {
            (None, None) => QueryMode::Latest,
            (Some(from), None) => QueryMode::Forward(from),
            (None, Some(to)) => QueryMode::Backward(to),
            (Some(from), Some(to)) => QueryMode::Range(from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn zero_limit_rejected() {
        let err = FilterSpec::new(0, None, None, None, false).unwrap_err();
        assert!(matches!(err, FilterError::ZeroLimit));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = FilterSpec::new(
            5,
            Some(ts(2025, 5, 1)),
            Some(ts(2025, 4, 1)),
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::InvertedRange { .. }));
    }

    #[test]
    fn equal_bounds_are_a_valid_range() {
        let spec = FilterSpec::new(
            5,
            Some(ts(2025, 4, 1)),
            Some(ts(2025, 4, 1)),
            None,
            false,
        )
        .unwrap();
        assert!(matches!(spec.mode(), QueryMode::Range(_, _)));
    }

    #[test]
    fn bounds_resolve_to_disjoint_modes() {
        let latest = FilterSpec::new(1, None, None, None, false).unwrap();
        assert_eq!(latest.mode(), QueryMode::Latest);

        let forward = FilterSpec::new(1, Some(ts(2025, 4, 1)), None, None, false).unwrap();
        assert_eq!(forward.mode(), QueryMode::Forward(ts(2025, 4, 1)));

        let backward = FilterSpec::new(1, None, Some(ts(2025, 4, 30)), None, false).unwrap();
        assert_eq!(backward.mode(), QueryMode::Backward(ts(2025, 4, 30)));

        let range = FilterSpec::new(
            1,
            Some(ts(2025, 4, 1)),
            Some(ts(2025, 4, 30)),
            None,
            false,
        )
        .unwrap();
        assert_eq!(range.mode(), QueryMode::Range(ts(2025, 4, 1), ts(2025, 4, 30)));
    }

    #[test]
    fn blank_text_filter_is_dropped() {
        let spec = FilterSpec::new(1, None, None, Some("   ".to_string()), false).unwrap();
        assert!(spec.text_filter().is_none());
    }
}
