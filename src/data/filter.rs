use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter sets
// ---------------------------------------------------------------------------

/// Canonical snapshot of every active filter dimension.
///
/// Produced by [`super::resolve::resolve`]; every field is valid against the
/// dataset it was resolved for.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSet {
    pub year: i32,
    pub continents: BTreeSet<String>,
    pub countries: BTreeSet<String>,
    /// Inclusive (lower, upper) GDP per capita.
    pub gdp_range: (f64, f64),
    /// Inclusive (lower, upper) life expectancy.
    pub life_exp_range: (f64, f64),
}

/// A filter request where every field may be missing.
///
/// `None` means "use the dataset default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialFilterSet {
    pub year: Option<i32>,
    pub continents: Option<BTreeSet<String>>,
    pub countries: Option<BTreeSet<String>>,
    pub gdp_min: Option<f64>,
    pub gdp_max: Option<f64>,
    pub life_exp_min: Option<f64>,
    pub life_exp_max: Option<f64>,
}

impl FilterSet {
    /// Every field set, so resolving it only re-validates.
    pub fn to_partial(&self) -> PartialFilterSet {
        PartialFilterSet {
            year: Some(self.year),
            continents: Some(self.continents.clone()),
            countries: Some(self.countries.clone()),
            gdp_min: Some(self.gdp_range.0),
            gdp_max: Some(self.gdp_range.1),
            life_exp_min: Some(self.life_exp_range.0),
            life_exp_max: Some(self.life_exp_range.1),
        }
    }

    /// Whether `record` passes all five predicates.
    pub fn matches(&self, record: &Record) -> bool {
        record.year == self.year
            && self.continents.contains(&record.continent)
            && self.countries.contains(&record.country)
            && in_range(record.gdp_per_capita, self.gdp_range)
            && in_range(record.life_expectancy, self.life_exp_range)
    }
}

fn in_range(value: f64, (lower, upper): (f64, f64)) -> bool {
    lower <= value && value <= upper
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Return indices of records that pass every filter.
///
/// An empty result is a normal outcome.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterSet) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| filters.matches(rec))
        .map(|(i, _)| i)
        .collect()
}
