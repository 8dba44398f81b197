// 🧭 Resolution Policies - How each record field finds its current value
//
// A closed set of strategies, applied uniformly by the record builder:
//   SnapshotThenPeriod  → registry's "latest" shortcut first, history second
//   PeriodOnly          → history only (optionally visible values only)
//   MergeTagsThenPeriod → several histories flattened in order, then selected

use crate::temporal::{select_current, select_current_value, VersionedFact};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub enum ResolutionPolicy<'a, T> {
    SnapshotThenPeriod {
        snapshot: Option<&'a T>,
        history: &'a [VersionedFact<T>],
    },
    PeriodOnly {
        history: &'a [VersionedFact<T>],
        visible_only: bool,
    },
    MergeTagsThenPeriod {
        groups: Vec<&'a [VersionedFact<T>]>,
    },
}

impl<'a, T: Clone> ResolutionPolicy<'a, T> {
    /// Value of the field as of `as_of`, None when nothing is current
    pub fn resolve(&self, as_of: NaiveDate) -> Option<T> {
        match self {
            ResolutionPolicy::SnapshotThenPeriod { snapshot, history } => snapshot
                .cloned()
                .or_else(|| select_current(*history, as_of).map(|f| f.value.clone())),

            ResolutionPolicy::PeriodOnly { history, visible_only } => {
                let visible_only = *visible_only;
                select_current_value(
                    *history,
                    |fact| (!visible_only || fact.visible).then(|| Some(fact.value.clone())),
                    as_of,
                    None,
                )
            }

            ResolutionPolicy::MergeTagsThenPeriod { groups } => {
                let merged = groups.iter().flat_map(|group| group.iter());
                select_current(merged, as_of).map(|f| f.value.clone())
            }
        }
    }

    /// Like `resolve`, but the current value must also pass `accept`
    ///
    /// A rejected value resolves to None; later facts are not consulted.
    pub fn resolve_where<F>(&self, as_of: NaiveDate, accept: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.resolve(as_of).filter(|value| accept(value))
    }
}
