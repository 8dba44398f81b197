// ⏰ Temporal Model - Period Selector
// Every registry fact is a value plus the interval during which it was true.
//
// Two times matter here:
// 1. Valid Time: when the registry says the value was/is true (gyldigFra/gyldigTil)
// 2. Reference Time: the date we ask "what was true then?" for (as_of)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// VALIDITY PERIOD
// ============================================================================

/// ValidityPeriod - When a value was authoritative
///
/// Both bounds are inclusive. `valid_to = None` means the value is still valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityPeriod {
    valid_from: NaiveDate,
    valid_to: Option<NaiveDate>,
}

impl ValidityPeriod {
    /// Create a period, rejecting inverted intervals (`valid_to < valid_from`)
    pub fn new(valid_from: NaiveDate, valid_to: Option<NaiveDate>) -> Option<Self> {
        match valid_to {
            Some(to) if to < valid_from => None,
            _ => Some(ValidityPeriod { valid_from, valid_to }),
        }
    }

    /// Open-ended period starting at `valid_from`
    pub fn open(valid_from: NaiveDate) -> Self {
        ValidityPeriod {
            valid_from,
            valid_to: None,
        }
    }

    pub fn valid_from(&self) -> NaiveDate {
        self.valid_from
    }

    pub fn valid_to(&self) -> Option<NaiveDate> {
        self.valid_to
    }

    /// Still valid (no end date recorded)
    pub fn is_open(&self) -> bool {
        self.valid_to.is_none()
    }

    /// Check if this period contains the reference date
    pub fn is_current_at(&self, as_of: NaiveDate) -> bool {
        self.valid_from <= as_of && self.valid_to.map_or(true, |to| to >= as_of)
    }
}

// ============================================================================
// VERSIONED FACT
// ============================================================================

/// VersionedFact - One value of a field, tagged with its validity period
///
/// Example: a company's phone number over time
/// ```text
///   Fact 1 (valid 2010-01-01 → 2015-03-31): "33 11 22 33"
///   Fact 2 (valid 2015-04-01 → open):       "70 20 30 40"  (hidden)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedFact<T> {
    pub period: ValidityPeriod,
    pub value: T,

    /// False when the registry marks the value as hidden/unlisted
    pub visible: bool,
}

impl<T> VersionedFact<T> {
    pub fn new(value: T, period: ValidityPeriod) -> Self {
        VersionedFact {
            period,
            value,
            visible: true,
        }
    }

    /// Builder: mark as hidden
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_current_at(&self, as_of: NaiveDate) -> bool {
        self.period.is_current_at(as_of)
    }
}

// ============================================================================
// PERIOD SELECTOR
// ============================================================================

/// Return the FIRST fact whose period contains `as_of`
///
/// Order is significant: facts are scanned in the order given, so overlapping
/// periods resolve to whichever the source listed first, not to the latest start.
pub fn select_current<'a, T, I>(facts: I, as_of: NaiveDate) -> Option<&'a VersionedFact<T>>
where
    T: 'a,
    I: IntoIterator<Item = &'a VersionedFact<T>>,
{
    facts.into_iter().find(|fact| fact.is_current_at(as_of))
}

/// Select the current fact, then let `filter` accept it and produce the value
///
/// `filter` returns None to reject. Returns `default` when nothing is current
/// or the selected fact is rejected; a rejected fact does not fall through to
/// later facts.
pub fn select_current_value<'a, T, U, I, F>(facts: I, filter: F, as_of: NaiveDate, default: U) -> U
where
    T: 'a,
    I: IntoIterator<Item = &'a VersionedFact<T>>,
    F: Fn(&VersionedFact<T>) -> Option<U>,
{
    select_current(facts, as_of).and_then(filter).unwrap_or(default)
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

    fn fact(value: &str, from: NaiveDate, to: Option<NaiveDate>) -> VersionedFact<String> {
        VersionedFact::new(value.to_string(), ValidityPeriod::new(from, to).unwrap())
    }

    #[test]
    fn test_period_rejects_inverted_bounds() {
        assert!(ValidityPeriod::new(date(2020, 1, 2), Some(date(2020, 1, 1))).is_none());
        assert!(ValidityPeriod::new(date(2020, 1, 1), Some(date(2020, 1, 1))).is_some());
    }

    #[test]
    fn test_period_bounds_are_inclusive() {
        let period = ValidityPeriod::new(date(2020, 1, 1), Some(date(2020, 12, 31))).unwrap();

        assert!(period.is_current_at(date(2020, 1, 1)));
        assert!(period.is_current_at(date(2020, 12, 31)));
        assert!(!period.is_current_at(date(2019, 12, 31)));
        assert!(!period.is_current_at(date(2021, 1, 1)));
    }

    #[test]
    fn test_open_period_is_current_forever() {
        let period = ValidityPeriod::open(date(2000, 1, 1));

        assert!(period.is_open());
        assert!(period.is_current_at(date(2999, 1, 1)));
        assert!(!period.is_current_at(date(1999, 12, 31)));
    }

    #[test]
    fn test_select_current_empty_input() {
        let facts: Vec<VersionedFact<String>> = Vec::new();
        assert!(select_current(&facts, date(2020, 1, 1)).is_none());
    }

    #[test]
    fn test_select_current_picks_containing_period() {
        let facts = vec![
            fact("old", date(2010, 1, 1), Some(date(2014, 12, 31))),
            fact("new", date(2015, 1, 1), None),
        ];

        assert_eq!(select_current(&facts, date(2012, 6, 1)).unwrap().value, "old");
        assert_eq!(select_current(&facts, date(2020, 6, 1)).unwrap().value, "new");
        assert!(select_current(&facts, date(2009, 6, 1)).is_none());
    }

    #[test]
    fn test_select_current_first_match_wins_on_overlap() {
        // Second fact starts later but must not win: first match, not latest start
        let facts = vec![
            fact("first", date(2010, 1, 1), None),
            fact("second", date(2018, 1, 1), None),
        ];

        let selected = select_current(&facts, date(2019, 1, 1)).unwrap();
        assert_eq!(selected.value, "first");

        // Nothing earlier in the sequence is also current
        let position = facts.iter().position(|f| f == selected).unwrap();
        assert!(facts[..position].iter().all(|f| !f.is_current_at(date(2019, 1, 1))));
    }

    #[test]
    fn test_select_current_never_selects_future_or_expired() {
        let facts = vec![
            fact("expired", date(2000, 1, 1), Some(date(2004, 12, 31))),
            fact("future", date(2030, 1, 1), None),
        ];

        assert!(select_current(&facts, date(2020, 1, 1)).is_none());
    }

    #[test]
    fn test_select_current_value_filter_rejects() {
        let facts = vec![
            fact("secret@example.dk", date(2010, 1, 1), None).hidden(),
            fact("public@example.dk", date(2010, 1, 1), None),
        ];

        // First current fact is hidden → default, no fall-through to the second
        let value = select_current_value(
            &facts,
            |f| f.visible.then(|| f.value.clone()),
            date(2020, 1, 1),
            "none".to_string(),
        );
        assert_eq!(value, "none");
    }

    #[test]
    fn test_select_current_value_returns_selected() {
        let facts = vec![fact("info@example.dk", date(2010, 1, 1), None)];

        let value = select_current_value(&facts, |f| f.visible.then(|| f.value.clone()), date(2020, 1, 1), String::new());
        assert_eq!(value, "info@example.dk");

        let missing = select_current_value(&facts, |f| Some(f.value.clone()), date(2000, 1, 1), "default".to_string());
        assert_eq!(missing, "default");
    }

    #[test]
    fn test_select_current_over_chained_sequences() {
        let group_a = vec![fact("a", date(2010, 1, 1), Some(date(2011, 1, 1)))];
        let group_b = vec![fact("b", date(2012, 1, 1), None)];

        let selected = select_current(group_a.iter().chain(group_b.iter()), date(2015, 1, 1));
        assert_eq!(selected.unwrap().value, "b");
    }
}
