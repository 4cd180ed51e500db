//! The view predicate applied to every file group.

use serde::{Deserialize, Serialize};

use crate::trans_unit::TransUnit;

/// Which units are visible.
///
/// `Filter::default()` (empty search, all units) shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Filter {
    /// Case-insensitive substring looked up in source, target and note.
    #[serde(default)]
    pub search_string: String,
    /// Only keep units without a target or with an empty one.
    #[serde(default)]
    pub only_non_translated: bool,
}

impl Filter {
    pub fn new(search_string: impl Into<String>, only_non_translated: bool) -> Self {
        Self {
            search_string: search_string.into(),
            only_non_translated,
        }
    }

    /// Whether this filter would hide nothing.
    pub fn is_empty(&self) -> bool {
        self.search_string.is_empty() && !self.only_non_translated
    }

    pub fn matches(&self, unit: &TransUnit) -> bool {
        if self.only_non_translated && unit.is_translated() {
            return false;
        }
        if self.search_string.is_empty() {
            return true;
        }

        let needle = self.search_string.to_lowercase();
        let contains = |field: Option<&str>| {
            field.is_some_and(|value| value.to_lowercase().contains(&needle))
        };
        contains(Some(unit.source())) || contains(unit.target()) || contains(unit.note())
    }

    /// Indices into `units` of the visible units, in order.
    pub fn apply(&self, units: &[TransUnit]) -> Vec<usize> {
        units
            .iter()
            .enumerate()
            .filter(|(_, unit)| self.matches(unit))
            .map(|(index, _)| index)
            .collect()
    }
}
