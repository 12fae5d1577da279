use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One (country, year) observation.
///
/// Field order is the export column order. The aliases accept the column
/// names used by the original Gapminder extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub continent: String,
    pub year: i32,
    #[serde(alias = "gdpPercap")]
    pub gdp_per_capita: f64,
    #[serde(alias = "lifeExp")]
    pub life_expectancy: f64,
    #[serde(alias = "pop")]
    pub population: u64,
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("dataset contains no records")]
    Empty,
    #[error("duplicate record for {country} in {year}")]
    DuplicateRecord { country: String, year: i32 },
    #[error("{country} ({year}): {field} must be {expected}, got {value}")]
    InvalidValue {
        country: String,
        year: i32,
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full validated dataset with pre-computed indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All records, in load order.
    pub records: Vec<Record>,
    /// Sorted distinct years.
    pub years: Vec<i32>,
    /// Sorted distinct continents across all years.
    pub continents: BTreeSet<String>,
    /// Global (min, max) GDP per capita.
    pub gdp_bounds: (f64, f64),
    /// Global (min, max) life expectancy.
    pub life_exp_bounds: (f64, f64),
}

impl Dataset {
    /// Validate the records and build the indices.
    pub fn from_records(records: Vec<Record>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut keys: BTreeSet<(&str, i32)> = BTreeSet::new();
        let mut years = BTreeSet::new();
        let mut continents = BTreeSet::new();
        let mut gdp_bounds = (f64::INFINITY, f64::NEG_INFINITY);
        let mut life_exp_bounds = (f64::INFINITY, f64::NEG_INFINITY);

        for rec in &records {
            if !keys.insert((rec.country.as_str(), rec.year)) {
                return Err(DatasetError::DuplicateRecord {
                    country: rec.country.clone(),
                    year: rec.year,
                });
            }
            if !rec.gdp_per_capita.is_finite() || rec.gdp_per_capita <= 0.0 {
                let value = rec.gdp_per_capita;
                return Err(rec.invalid("gdp_per_capita", "finite and positive", value));
            }
            if !rec.life_expectancy.is_finite() || rec.life_expectancy < 0.0 {
                let value = rec.life_expectancy;
                return Err(rec.invalid("life_expectancy", "finite and non-negative", value));
            }

            years.insert(rec.year);
            continents.insert(rec.continent.clone());
            gdp_bounds.0 = gdp_bounds.0.min(rec.gdp_per_capita);
            gdp_bounds.1 = gdp_bounds.1.max(rec.gdp_per_capita);
            life_exp_bounds.0 = life_exp_bounds.0.min(rec.life_expectancy);
            life_exp_bounds.1 = life_exp_bounds.1.max(rec.life_expectancy);
        }

        Ok(Dataset {
            years: years.into_iter().collect(),
            continents,
            gdp_bounds,
            life_exp_bounds,
            records,
        })
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty. Always false for a validated dataset.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest year.
    pub fn year_span(&self) -> (i32, i32) {
        // `from_records` rejects empty input, so `years` is never empty.
        let first = self.years.first().copied().unwrap_or_default();
        let last = self.years.last().copied().unwrap_or_default();
        (first, last)
    }

    /// Records observed in `year`.
    pub fn records_in_year(&self, year: i32) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.year == year)
    }
}

impl Record {
    fn invalid(&self, field: &'static str, expected: &'static str, value: f64) -> DatasetError {
        DatasetError::InvalidValue {
            country: self.country.clone(),
            year: self.year,
            field,
            expected,
            value,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(
        country: &str,
        continent: &str,
        year: i32,
        gdp: f64,
        lex: f64,
        pop: u64,
    ) -> Record {
        Record {
            country: country.to_string(),
            continent: continent.to_string(),
            year,
            gdp_per_capita: gdp,
            life_expectancy: lex,
            population: pop,
        }
    }

    /// Small hand-made table: Oceania only appears in 2007, Germany only in 2002.
    pub fn small_dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Japan", "Asia", 2002, 28604.6, 82.0, 127_065_841),
            record("Japan", "Asia", 2007, 31656.1, 82.6, 127_467_972),
            record("China", "Asia", 2002, 3119.3, 72.0, 1_280_400_000),
            record("China", "Asia", 2007, 4959.1, 73.0, 1_318_683_096),
            record("Germany", "Europe", 2002, 30035.8, 78.7, 82_350_671),
            record("France", "Europe", 2002, 28926.0, 79.6, 59_925_035),
            record("France", "Europe", 2007, 30470.0, 80.7, 61_083_916),
            record("Australia", "Oceania", 2007, 34435.4, 81.2, 20_434_176),
            record("Kenya", "Africa", 2007, 1463.2, 54.1, 35_610_177),
        ])
        .unwrap()
    }
}
