// 👷 Employment Ranges - Granularity reconciliation
//
// The registry publishes the latest employee-count interval three times over:
// per year, per quarter and per month. Each observation is a coded range
// ("<PREFIX>_10_19") with an as-of date implied by its year/quarter/month.
// The newest observation wins; on equal dates the coarser one is kept.

use crate::entities::EmploymentRange;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Range-code prefix used when nothing else is configured
pub const DEFAULT_CODE_PREFIX: &str = "ANY";

// ============================================================================
// GRANULARITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Yearly,
    Quarterly,
    Monthly,
}

impl Granularity {
    /// Fixed evaluation order for reconciliation
    pub const ORDER: [Granularity; 3] = [
        Granularity::Yearly,
        Granularity::Quarterly,
        Granularity::Monthly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Yearly => "yearly",
            Granularity::Quarterly => "quarterly",
            Granularity::Monthly => "monthly",
        }
    }
}

// ============================================================================
// OBSERVATION
// ============================================================================

/// One published employment figure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentObservation {
    pub granularity: Granularity,
    pub year: i32,

    /// Quarter (1-4) or month (1-12); ignored for yearly figures
    pub sub_period: Option<u32>,

    /// Raw interval code, e.g. "ANY_10_19"
    pub range_code: Option<String>,
}

impl EmploymentObservation {
    pub fn yearly(year: i32, range_code: Option<String>) -> Self {
        EmploymentObservation {
            granularity: Granularity::Yearly,
            year,
            sub_period: None,
            range_code,
        }
    }

    pub fn quarterly(year: i32, quarter: u32, range_code: Option<String>) -> Self {
        EmploymentObservation {
            granularity: Granularity::Quarterly,
            year,
            sub_period: Some(quarter),
            range_code,
        }
    }

    pub fn monthly(year: i32, month: u32, range_code: Option<String>) -> Self {
        EmploymentObservation {
            granularity: Granularity::Monthly,
            year,
            sub_period: Some(month),
            range_code,
        }
    }

    /// Synthesized as-of date: Jan 1st, first day of the quarter's last month,
    /// or first day of the month. None for out-of-range quarters/months.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        let month = match self.granularity {
            Granularity::Yearly => 1,
            Granularity::Quarterly => self.sub_period?.checked_mul(3)?,
            Granularity::Monthly => self.sub_period?,
        };
        NaiveDate::from_ymd_opt(self.year, month, 1)
    }
}

// ============================================================================
// RANGE CODE PARSER
// ============================================================================

/// Parser for "<PREFIX>_<from>_<to>" interval codes
#[derive(Debug, Clone)]
pub struct RangeCodeParser {
    pattern: Regex,
}

impl RangeCodeParser {
    pub fn new(prefix: &str) -> Self {
        let source = format!(r"^{}_(?P<from>\d+)_(?P<to>\d+)$", regex::escape(prefix));
        let pattern = Regex::new(&source).expect("escaped range-code pattern is always valid");
        RangeCodeParser { pattern }
    }

    /// Parse a code into a range; None on any mismatch or integer overflow
    pub fn parse(&self, code: &str) -> Option<EmploymentRange> {
        let captures = self.pattern.captures(code)?;
        let from = captures.name("from")?.as_str().parse().ok()?;
        let to = captures.name("to")?.as_str().parse().ok()?;
        Some(EmploymentRange { from, to })
    }
}

impl Default for RangeCodeParser {
    fn default() -> Self {
        RangeCodeParser::new(DEFAULT_CODE_PREFIX)
    }
}

// ============================================================================
// RECONCILIATION
// ============================================================================

/// Pick the range from the newest matching observation
///
/// Observations are evaluated in the order given; a later one replaces the
/// running choice only when its effective date is strictly newer.
pub fn reconcile<'a, I>(observations: I, parser: &RangeCodeParser) -> Option<EmploymentRange>
where
    I: IntoIterator<Item = &'a EmploymentObservation>,
{
    let mut chosen: Option<(NaiveDate, EmploymentRange)> = None;

    for observation in observations {
        let Some(date) = observation.effective_date() else {
            debug!(
                granularity = observation.granularity.as_str(),
                year = observation.year,
                sub_period = ?observation.sub_period,
                "discarding employment figure with invalid period"
            );
            continue;
        };

        let Some(range) = observation.range_code.as_deref().and_then(|c| parser.parse(c)) else {
            debug!(
                granularity = observation.granularity.as_str(),
                code = ?observation.range_code,
                "discarding employment figure with unrecognised range code"
            );
            continue;
        };

        match chosen {
            Some((latest, _)) if date <= latest => {}
            _ => chosen = Some((date, range)),
        }
    }

    chosen.map(|(_, range)| range)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_range_code() {
        let parser = RangeCodeParser::default();

        assert_eq!(parser.parse("ANY_10_19"), Some(EmploymentRange { from: 10, to: 19 }));
        assert_eq!(parser.parse("ANY_X_19"), None);
        assert_eq!(parser.parse("ANTALL_10_19"), None);
        assert_eq!(parser.parse("ANY_10_19_extra"), None);
        assert_eq!(parser.parse(""), None);
    }

    #[test]
    fn test_custom_prefix() {
        let parser = RangeCodeParser::new("ANTAL");

        assert_eq!(parser.parse("ANTAL_1_4"), Some(EmploymentRange { from: 1, to: 4 }));
        assert_eq!(parser.parse("ANY_1_4"), None);
    }

    #[test]
    fn test_prefix_is_literal() {
        // Regex metacharacters in the prefix must not widen the match
        let parser = RangeCodeParser::new("A.Y");

        assert!(parser.parse("A.Y_1_4").is_some());
        assert!(parser.parse("ANY_1_4").is_none());
    }

    #[test]
    fn test_effective_dates() {
        assert_eq!(
            EmploymentObservation::yearly(2020, None).effective_date(),
            Some(date(2020, 1, 1))
        );
        assert_eq!(
            EmploymentObservation::quarterly(2020, 2, None).effective_date(),
            Some(date(2020, 6, 1))
        );
        assert_eq!(
            EmploymentObservation::monthly(2020, 11, None).effective_date(),
            Some(date(2020, 11, 1))
        );
        assert_eq!(EmploymentObservation::quarterly(2020, 0, None).effective_date(), None);
        assert_eq!(EmploymentObservation::quarterly(2020, 5, None).effective_date(), None);
        assert_eq!(EmploymentObservation::monthly(2020, 13, None).effective_date(), None);
    }

    #[test]
    fn test_newer_granularity_wins() {
        let parser = RangeCodeParser::default();
        let observations = vec![
            EmploymentObservation::yearly(2019, Some("ANY_5_9".to_string())),
            EmploymentObservation::quarterly(2020, 1, Some("ANY_10_19".to_string())),
            EmploymentObservation::monthly(2020, 7, Some("ANY_20_49".to_string())),
        ];

        assert_eq!(
            reconcile(&observations, &parser),
            Some(EmploymentRange { from: 20, to: 49 })
        );
    }

    #[test]
    fn test_later_candidate_must_be_strictly_newer() {
        // yearly 2020-01-01, quarterly 2020-12-01, monthly 2020-03-01:
        // monthly is evaluated last but is older than quarterly → quarterly kept
        let parser = RangeCodeParser::default();
        let observations = vec![
            EmploymentObservation::yearly(2020, Some("ANY_1_4".to_string())),
            EmploymentObservation::quarterly(2020, 4, Some("ANY_10_19".to_string())),
            EmploymentObservation::monthly(2020, 3, Some("ANY_50_99".to_string())),
        ];

        assert_eq!(
            reconcile(&observations, &parser),
            Some(EmploymentRange { from: 10, to: 19 })
        );
    }

    #[test]
    fn test_equal_dates_keep_earlier_candidate() {
        // Q1 → March 1st, same as the monthly March figure
        let parser = RangeCodeParser::default();
        let observations = vec![
            EmploymentObservation::quarterly(2020, 1, Some("ANY_10_19".to_string())),
            EmploymentObservation::monthly(2020, 3, Some("ANY_20_49".to_string())),
        ];

        assert_eq!(
            reconcile(&observations, &parser),
            Some(EmploymentRange { from: 10, to: 19 })
        );
    }

    #[test]
    fn test_mismatching_codes_fall_through() {
        let parser = RangeCodeParser::default();
        let observations = vec![
            EmploymentObservation::yearly(2018, Some("ANY_2_4".to_string())),
            EmploymentObservation::quarterly(2020, 1, Some("ANY_X_19".to_string())),
            EmploymentObservation::monthly(2020, 5, None),
        ];

        assert_eq!(
            reconcile(&observations, &parser),
            Some(EmploymentRange { from: 2, to: 4 })
        );
    }

    #[test]
    fn test_no_candidates() {
        let parser = RangeCodeParser::default();
        let observations: Vec<EmploymentObservation> = Vec::new();

        assert_eq!(reconcile(&observations, &parser), None);
    }
}
