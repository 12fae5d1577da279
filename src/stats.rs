//! KPI summary of the derived subset.

use std::collections::BTreeSet;

use crate::data::model::Dataset;

#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    /// Distinct countries in the subset.
    pub countries: usize,
    /// `None` when the subset is empty.
    pub median_life_expectancy: Option<f64>,
    pub total_population: u64,
}

impl Kpis {
    pub fn compute(dataset: &Dataset, indices: &[usize]) -> Self {
        let rows = || indices.iter().map(|&i| &dataset.records[i]);

        let countries = rows()
            .map(|r| r.country.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let life_exp: Vec<f64> = rows().map(|r| r.life_expectancy).collect();
        let total_population = rows().map(|r| r.population).fold(0, u64::saturating_add);

        Self {
            countries,
            median_life_expectancy: median(&life_exp),
            total_population,
        }
    }

    pub fn median_label(&self) -> String {
        match self.median_life_expectancy {
            Some(m) => format!("{m:.1} yrs"),
            None => "–".to_string(),
        }
    }

    pub fn population_label(&self) -> String {
        format_thousands(self.total_population)
    }
}

/// Median with the midpoint of the two central values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
