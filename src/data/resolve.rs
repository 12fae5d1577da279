//! Reconciles requested filter state with what the dataset can offer.
//!
//! Continents are narrowed to the selected year and countries to the
//! selected (year, continents). Choices that are no longer offered are
//! dropped; a selection that ends up empty falls back to every offered
//! option.

use std::collections::BTreeSet;

use super::filter::{FilterSet, PartialFilterSet};
use super::model::Dataset;

/// Continents that have at least one record in `year`.
pub fn available_continents(dataset: &Dataset, year: i32) -> BTreeSet<String> {
    dataset
        .records_in_year(year)
        .map(|r| r.continent.clone())
        .collect()
}

/// Countries that have a record in `year` on one of `continents`.
pub fn available_countries(
    dataset: &Dataset,
    year: i32,
    continents: &BTreeSet<String>,
) -> BTreeSet<String> {
    dataset
        .records_in_year(year)
        .filter(|r| continents.contains(&r.continent))
        .map(|r| r.country.clone())
        .collect()
}

/// Latest year, everything selected, full global ranges.
pub fn defaults(dataset: &Dataset) -> FilterSet {
    resolve(dataset, &PartialFilterSet::default())
}

/// Produce the canonical filter set for `request`.
pub fn resolve(dataset: &Dataset, request: &PartialFilterSet) -> FilterSet {
    let year = match request.year {
        Some(year) => nearest_year(dataset, year),
        None => dataset.year_span().1,
    };

    let continents = narrow(
        request.continents.as_ref(),
        available_continents(dataset, year),
    );
    let countries = narrow(
        request.countries.as_ref(),
        available_countries(dataset, year, &continents),
    );

    let gdp_range = ordered(
        request.gdp_min.unwrap_or(dataset.gdp_bounds.0),
        request.gdp_max.unwrap_or(dataset.gdp_bounds.1),
    );
    let life_exp_range = ordered(
        request.life_exp_min.unwrap_or(dataset.life_exp_bounds.0),
        request.life_exp_max.unwrap_or(dataset.life_exp_bounds.1),
    );

    FilterSet {
        year,
        continents,
        countries,
        gdp_range,
        life_exp_range,
    }
}

/// Closest year present in the dataset; ties go to the earlier year.
fn nearest_year(dataset: &Dataset, year: i32) -> i32 {
    dataset
        .years
        .iter()
        .copied()
        .min_by_key(|y| ((*y as i64 - year as i64).abs(), *y))
        .unwrap_or(year)
}

fn narrow(requested: Option<&BTreeSet<String>>, options: BTreeSet<String>) -> BTreeSet<String> {
    let Some(requested) = requested else {
        return options;
    };
    let kept: BTreeSet<String> = requested.intersection(&options).cloned().collect();
    if kept.is_empty() {
        options
    } else {
        kept
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
