//! Shareable filter state, encoded as a URL query string.
//!
//! ```text
//! year=2007&continents=Asia&continents=Europe&countries=Japan&...
//! &gdp_min=241.16&gdp_max=49357.19&lex_min=23.5&lex_max=82.7
//! ```
//!
//! Missing keys mean "dataset default". Range bounds are written with a
//! fixed number of decimals; lower bounds round down and upper bounds round
//! up, so a decoded range always contains the encoded one.

use std::collections::BTreeSet;

use crate::data::filter::{FilterSet, PartialFilterSet};

/// Prefix of the links produced by [`share_link`].
pub const LINK_PREFIX: &str = "gapminder-explorer://view";

const YEAR: &str = "year";
const CONTINENTS: &str = "continents";
const COUNTRIES: &str = "countries";
const GDP_MIN: &str = "gdp_min";
const GDP_MAX: &str = "gdp_max";
const LEX_MIN: &str = "lex_min";
const LEX_MAX: &str = "lex_max";

/// Decimals kept for GDP per capita (monetary).
pub const GDP_DECIMALS: usize = 2;
/// Decimals kept for life expectancy (years).
pub const LIFE_EXP_DECIMALS: usize = 1;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `filters` as a query string (without the leading `?`).
pub fn encode(filters: &FilterSet) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());
    out.append_pair(YEAR, &filters.year.to_string());
    for continent in &filters.continents {
        out.append_pair(CONTINENTS, continent);
    }
    for country in &filters.countries {
        out.append_pair(COUNTRIES, country);
    }
    let (gdp_min, gdp_max) = filters.gdp_range;
    let (lex_min, lex_max) = filters.life_exp_range;
    out.append_pair(GDP_MIN, &round_down(gdp_min, GDP_DECIMALS));
    out.append_pair(GDP_MAX, &round_up(gdp_max, GDP_DECIMALS));
    out.append_pair(LEX_MIN, &round_down(lex_min, LIFE_EXP_DECIMALS));
    out.append_pair(LEX_MAX, &round_up(lex_max, LIFE_EXP_DECIMALS));
    out.finish()
}

/// Full link for the clipboard.
pub fn share_link(filters: &FilterSet) -> String {
    format!("{LINK_PREFIX}?{}", encode(filters))
}

/// Largest `decimals`-place number not above `value`.
fn round_down(value: f64, decimals: usize) -> String {
    round_toward(value, decimals, -1.0)
}

/// Smallest `decimals`-place number not below `value`.
fn round_up(value: f64, decimals: usize) -> String {
    round_toward(value, decimals, 1.0)
}

/// Round to `decimals` places, stepping in `direction` until the decimal
/// no longer lies on the wrong side of `value`.
fn round_toward(value: f64, decimals: usize, direction: f64) -> String {
    let scale = 10f64.powi(decimals as i32);
    let mut steps = (value * scale).round();
    // Past 2^53 every f64 is an integer and stepping by one is a no-op.
    if !steps.is_finite() || steps.abs() >= 9_007_199_254_740_992.0 {
        return format!("{:.*}", decimals, value);
    }
    while (steps / scale - value) * direction < 0.0 {
        steps += direction;
    }
    format!("{:.*}", decimals, steps / scale)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Result of a best-effort decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedState {
    pub filters: PartialFilterSet,
    /// Keys that were unknown or carried an unusable value, in input order.
    pub ignored: Vec<String>,
}

/// Decode a query string, a `?query`, or a full link.
///
/// Never fails: anything that cannot be used is listed in
/// [`DecodedState::ignored`] and left at its default.
pub fn decode(input: &str) -> DecodedState {
    let query = match input.find('?') {
        Some(pos) => &input[pos + 1..],
        None => input,
    };
    let query = query.trim();

    let mut state = DecodedState::default();
    let mut continents = BTreeSet::new();
    let mut countries = BTreeSet::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.trim();
        let accepted = match key.as_ref() {
            YEAR => set_parsed(&mut state.filters.year, value.parse().ok()),
            CONTINENTS => insert_name(&mut continents, value),
            COUNTRIES => insert_name(&mut countries, value),
            GDP_MIN => set_parsed(&mut state.filters.gdp_min, parse_finite(value)),
            GDP_MAX => set_parsed(&mut state.filters.gdp_max, parse_finite(value)),
            LEX_MIN => set_parsed(&mut state.filters.life_exp_min, parse_finite(value)),
            LEX_MAX => set_parsed(&mut state.filters.life_exp_max, parse_finite(value)),
            _ => false,
        };
        if !accepted {
            state.ignored.push(key.into_owned());
        }
    }

    if !continents.is_empty() {
        state.filters.continents = Some(continents);
    }
    if !countries.is_empty() {
        state.filters.countries = Some(countries);
    }
    if !state.ignored.is_empty() {
        log::warn!("Ignored shareable state keys: {:?}", state.ignored);
    }
    state
}

fn set_parsed<T>(slot: &mut Option<T>, parsed: Option<T>) -> bool {
    match parsed {
        Some(v) => {
            *slot = Some(v);
            true
        }
        None => false,
    }
}

fn insert_name(names: &mut BTreeSet<String>, value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    names.insert(value.to_string());
    true
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::loader::DatasetSource;
    use crate::data::model::fixtures::small_dataset;
    use crate::data::resolve::{defaults, resolve};

    #[test]
    fn test_encode_layout() {
        let ds = small_dataset();
        let mut f = defaults(&ds);
        f.continents = ["Asia".to_string()].into();
        f.countries = ["Japan".to_string(), "China".to_string()].into();
        f.gdp_range = (1463.2, 34435.4);
        f.life_exp_range = (54.1, 82.6);
        assert_eq!(
            encode(&f),
            "year=2007&continents=Asia&countries=China&countries=Japan\
             &gdp_min=1463.20&gdp_max=34435.40&lex_min=54.1&lex_max=82.6"
        );
    }

    #[test]
    fn test_rounding_direction() {
        assert_eq!(round_down(241.1658, 2), "241.16");
        assert_eq!(round_up(241.1658, 2), "241.17");
        assert_eq!(round_down(23.599, 1), "23.5");
        assert_eq!(round_up(82.603, 1), "82.7");
        assert_eq!(round_up(82.6, 1), "82.6");
    }

    #[test]
    fn test_names_with_commas_and_spaces_survive() {
        let ds = DatasetSource::Bundled.load().unwrap();
        let mut f = defaults(&ds);
        f.countries = ["Korea, Rep.".to_string()].into();
        let f = resolve(&ds, &f.to_partial());
        let back = decode(&share_link(&f));
        assert!(back.ignored.is_empty());
        assert_eq!(back.filters.countries, Some(f.countries));
    }

    #[test]
    fn test_malformed_fields_are_ignored_field_by_field() {
        let decoded =
            decode("?year=twenty&continents=Asia&gdp_min=abc&gdp_max=NaN&lex_min=40&foo=1");
        assert_eq!(decoded.filters.year, None);
        assert_eq!(decoded.filters.gdp_min, None);
        assert_eq!(decoded.filters.gdp_max, None);
        assert_eq!(decoded.filters.life_exp_min, Some(40.0));
        let asia: BTreeSet<String> = ["Asia".to_string()].into();
        assert_eq!(decoded.filters.continents, Some(asia));
        assert_eq!(decoded.ignored, vec!["year", "gdp_min", "gdp_max", "foo"]);
    }

    #[test]
    fn test_empty_input_means_defaults() {
        assert_eq!(decode(""), DecodedState::default());
        let ds = small_dataset();
        assert_eq!(resolve(&ds, &decode("").filters), defaults(&ds));
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_precision(
            year_idx in 0usize..12,
            continent_mask in 0u8..32,
            gdp in (200.0f64..60000.0, 200.0f64..60000.0),
            lex in (25.0f64..85.0, 25.0f64..85.0),
        ) {
            let ds = DatasetSource::Bundled.load().unwrap();
            let continents = ds
                .continents
                .iter()
                .enumerate()
                .filter(|(i, _)| continent_mask & (1 << i) != 0)
                .map(|(_, c)| c.clone())
                .collect();
            let original = resolve(&ds, &PartialFilterSet {
                year: Some(ds.years[year_idx]),
                continents: Some(continents),
                gdp_min: Some(gdp.0),
                gdp_max: Some(gdp.1),
                life_exp_min: Some(lex.0),
                life_exp_max: Some(lex.1),
                ..Default::default()
            });

            let decoded = decode(&encode(&original));
            prop_assert!(decoded.ignored.is_empty());
            let restored = resolve(&ds, &decoded.filters);

            prop_assert_eq!(restored.year, original.year);
            prop_assert_eq!(&restored.continents, &original.continents);
            prop_assert_eq!(&restored.countries, &original.countries);

            let (g0, g1) = original.gdp_range;
            let (r0, r1) = restored.gdp_range;
            prop_assert!(r0 <= g0 && g0 - r0 < 0.01 + 1e-9);
            prop_assert!(r1 >= g1 && r1 - g1 < 0.01 + 1e-9);

            let (l0, l1) = original.life_exp_range;
            let (s0, s1) = restored.life_exp_range;
            prop_assert!(s0 <= l0 && l0 - s0 < 0.1 + 1e-9);
            prop_assert!(s1 >= l1 && s1 - l1 < 0.1 + 1e-9);

            // A second trip is exact.
            let again = resolve(&ds, &decode(&encode(&restored)).filters);
            prop_assert_eq!(encode(&restored), encode(&again));
        }
    }
}
