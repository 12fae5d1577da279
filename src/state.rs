use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::color::ColorMap;
use crate::data::cache::DatasetCache;
use crate::data::filter::{filtered_indices, FilterSet, PartialFilterSet};
use crate::data::loader::DatasetSource;
use crate::data::model::Dataset;
use crate::data::resolve::{available_continents, available_countries, defaults, resolve};
use crate::share;
use crate::stats::Kpis;
use crate::ui::table::{sorted_rows, TableColumn, TableSort};
use crate::views::SavedViews;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Chart,
    Table,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// Every filter change goes through [`AppState::apply_request`], which
/// resolves the canonical [`FilterSet`], recomputes the derived subset and
/// rewrites the shareable link.
pub struct AppState {
    pub source: DatasetSource,
    cache: DatasetCache,

    /// Current dataset snapshot.
    pub dataset: Arc<Dataset>,

    /// Canonical filters for the current render.
    pub filters: FilterSet,

    /// Indices of records passing the current filters, in dataset order.
    pub visible_indices: Vec<usize>,

    /// `visible_indices` in table order.
    pub table_rows: Vec<usize>,
    pub table_sort: TableSort,

    pub kpis: Kpis,

    /// Continent colours over the whole dataset.
    pub color_map: ColorMap,

    pub saved_views: SavedViews,

    /// Shareable link for the current filters.
    pub share_link: String,

    /// Text typed into the "open link" box.
    pub link_input: String,

    /// Text typed into the "save view" box.
    pub view_name: String,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set once a periodic reload fails; no further reloads are attempted.
    pub reload_error: Option<String>,
}

impl AppState {
    /// Load the dataset and resolve the initial filters from `initial_view`.
    ///
    /// A load failure here is fatal and returned to the caller.
    pub fn new(source: DatasetSource, ttl: Duration, initial_view: Option<&str>) -> Result<Self> {
        let mut cache = DatasetCache::new(ttl);
        let dataset = cache.get_or_load(|| source.load())?;
        log::info!(
            "Loaded {} records ({} years) from {}",
            dataset.len(),
            dataset.years.len(),
            source.label()
        );

        let filters = defaults(&dataset);
        let mut state = Self {
            source,
            cache,
            color_map: ColorMap::new(&dataset.continents),
            kpis: Kpis::compute(&dataset, &[]),
            dataset,
            filters,
            visible_indices: Vec::new(),
            table_rows: Vec::new(),
            table_sort: TableSort::default(),
            saved_views: SavedViews::new(),
            share_link: String::new(),
            link_input: String::new(),
            view_name: String::new(),
            tab: Tab::default(),
            status_message: None,
            reload_error: None,
        };

        match initial_view {
            Some(view) => state.open_link(view),
            None => state.apply_request(&PartialFilterSet::default()),
        }
        Ok(state)
    }

    // -- Filter changes --

    /// Resolve `request` and refresh everything derived from it.
    pub fn apply_request(&mut self, request: &PartialFilterSet) {
        self.filters = resolve(&self.dataset, request);
        self.refilter();
        self.share_link = share::share_link(&self.filters);
    }

    /// Recompute the derived subset, KPIs and table order.
    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset, &self.filters);
        self.kpis = Kpis::compute(&self.dataset, &self.visible_indices);
        self.table_rows = sorted_rows(&self.dataset, &self.visible_indices, self.table_sort);
    }

    /// Current filters as a request in which "everything offered" stays
    /// `None`, so it keeps meaning "everything" after the options change.
    fn tracking_request(&self) -> PartialFilterSet {
        let f = &self.filters;
        let continent_options = available_continents(&self.dataset, f.year);
        let country_options = available_countries(&self.dataset, f.year, &f.continents);
        PartialFilterSet {
            continents: tracked(&f.continents, &continent_options),
            countries: tracked(&f.countries, &country_options),
            ..f.to_partial()
        }
    }

    pub fn set_year(&mut self, year: i32) {
        if year == self.filters.year {
            return;
        }
        let request = PartialFilterSet {
            year: Some(year),
            ..self.tracking_request()
        };
        self.apply_request(&request);
    }

    pub fn set_continent(&mut self, continent: &str, selected: bool) {
        let mut request = self.tracking_request();
        let mut continents = self.filters.continents.clone();
        if selected {
            continents.insert(continent.to_string());
        } else {
            continents.remove(continent);
        }
        request.continents = Some(continents);
        self.apply_request(&request);
    }

    pub fn set_country(&mut self, country: &str, selected: bool) {
        let mut countries = self.filters.countries.clone();
        if selected {
            countries.insert(country.to_string());
        } else {
            countries.remove(country);
        }
        let request = PartialFilterSet {
            countries: Some(countries),
            ..self.filters.to_partial()
        };
        self.apply_request(&request);
    }

    pub fn select_all_continents(&mut self) {
        let request = PartialFilterSet {
            continents: None,
            ..self.tracking_request()
        };
        self.apply_request(&request);
    }

    pub fn select_all_countries(&mut self) {
        let request = PartialFilterSet {
            countries: None,
            ..self.filters.to_partial()
        };
        self.apply_request(&request);
    }

    pub fn set_gdp_range(&mut self, lower: f64, upper: f64) {
        let request = PartialFilterSet {
            gdp_min: Some(lower),
            gdp_max: Some(upper),
            ..self.filters.to_partial()
        };
        self.apply_request(&request);
    }

    pub fn set_life_exp_range(&mut self, lower: f64, upper: f64) {
        let request = PartialFilterSet {
            life_exp_min: Some(lower),
            life_exp_max: Some(upper),
            ..self.filters.to_partial()
        };
        self.apply_request(&request);
    }

    pub fn reset_filters(&mut self) {
        self.apply_request(&PartialFilterSet::default());
        self.status_message = None;
    }

    // -- Shareable state --

    /// Replace the filters with the state encoded in `link`.
    pub fn open_link(&mut self, link: &str) {
        let decoded = share::decode(link);
        self.apply_request(&decoded.filters);
        self.status_message = if decoded.ignored.is_empty() {
            None
        } else {
            Some(format!("Ignored link fields: {}", decoded.ignored.join(", ")))
        };
    }

    // -- Saved views --

    pub fn save_view(&mut self) {
        let name = std::mem::take(&mut self.view_name);
        match self.saved_views.save(&name, &self.filters) {
            Ok(saved) => self.status_message = Some(format!("Saved view '{saved}'")),
            Err(e) => {
                self.view_name = name;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Restore a saved view; replaces the filters and the shareable link.
    pub fn load_view(&mut self, name: &str) {
        match self.saved_views.get(name) {
            Ok(snapshot) => {
                let request = snapshot.to_partial();
                log::info!("Loading saved view '{name}'");
                self.apply_request(&request);
                self.status_message = Some(format!("Loaded view '{name}'"));
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    pub fn delete_view(&mut self, name: &str) {
        self.status_message = Some(match self.saved_views.delete(name) {
            Ok(_) => format!("Deleted view '{name}'"),
            Err(e) => e.to_string(),
        });
    }

    // -- Table --

    pub fn sort_table_by(&mut self, column: TableColumn) {
        self.table_sort = self.table_sort.toggled(column);
        self.table_rows = sorted_rows(&self.dataset, &self.visible_indices, self.table_sort);
    }

    // -- Dataset --

    /// Pull the dataset through the cache; re-resolves when it was reloaded.
    pub fn refresh_dataset(&mut self) {
        if self.reload_error.is_some() {
            return;
        }
        let source = &self.source;
        match self.cache.get_or_load(|| source.load()) {
            Ok(dataset) => {
                if !Arc::ptr_eq(&dataset, &self.dataset) {
                    let label = source.label();
                    log::info!("Reloaded {} records from {label}", dataset.len());
                    self.replace_dataset(dataset);
                }
            }
            Err(e) => {
                log::error!("Failed to reload dataset: {e:#}");
                self.reload_error = Some(format!("Dataset reload failed: {e:#}"));
            }
        }
    }

    /// How often [`Self::refresh_dataset`] needs to run.
    pub fn reload_interval(&self) -> Duration {
        self.cache.ttl()
    }

    /// Switch to another dataset file. The current dataset stays on failure.
    pub fn open_source(&mut self, source: DatasetSource) {
        let mut cache = DatasetCache::new(self.cache.ttl());
        match cache.get_or_load(|| source.load()) {
            Ok(dataset) => {
                log::info!("Loaded {} records from {}", dataset.len(), source.label());
                self.source = source;
                self.cache = cache;
                self.reload_error = None;
                self.status_message = None;
                self.replace_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", source.label());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    fn replace_dataset(&mut self, dataset: Arc<Dataset>) {
        let request = self.tracking_request();
        self.color_map = ColorMap::new(&dataset.continents);
        self.dataset = dataset;
        self.apply_request(&request);
    }
}

fn tracked(selected: &BTreeSet<String>, options: &BTreeSet<String>) -> Option<BTreeSet<String>> {
    if selected == options {
        None
    } else {
        Some(selected.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(DatasetSource::Bundled, Duration::from_secs(600), None).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_initial_state_uses_defaults() {
        let st = state();
        assert_eq!(st.filters, defaults(&st.dataset));
        assert_eq!(st.visible_indices.len(), 32);
        assert_eq!(st.table_rows.len(), 32);
        assert_eq!(st.kpis.countries, 32);
        assert!(st.share_link.starts_with(share::LINK_PREFIX));
    }

    #[test]
    fn test_initial_view_from_link() {
        let st = AppState::new(
            DatasetSource::Bundled,
            Duration::from_secs(600),
            Some("?year=1977&continents=Oceania&bogus=1"),
        )
        .unwrap();
        assert_eq!(st.filters.year, 1977);
        assert_eq!(st.filters.continents, set(&["Oceania"]));
        assert_eq!(st.filters.countries, set(&["Australia", "New Zealand"]));
        assert_eq!(
            st.status_message.as_deref(),
            Some("Ignored link fields: bogus")
        );
    }

    #[test]
    fn test_year_change_keeps_all_selected() {
        let mut st = state();
        st.set_year(1952);
        assert_eq!(st.filters.year, 1952);
        assert_eq!(st.filters.continents, st.dataset.continents);
        assert_eq!(st.visible_indices.len(), 32);
    }

    #[test]
    fn test_adding_continent_extends_full_country_selection() {
        let mut st = state();
        st.set_continent("Africa", false);
        st.set_continent("Americas", false);
        st.set_continent("Europe", false);
        st.set_continent("Oceania", false);
        assert_eq!(st.filters.continents, set(&["Asia"]));
        assert_eq!(st.filters.countries.len(), 8);

        st.set_continent("Oceania", true);
        assert_eq!(st.filters.countries.len(), 10);
        assert!(st.filters.countries.contains("Australia"));
    }

    #[test]
    fn test_deselecting_last_country_falls_back_to_all() {
        let mut st = state();
        st.set_continent("Africa", false);
        st.set_continent("Americas", false);
        st.set_continent("Asia", false);
        st.set_continent("Europe", false);
        st.select_all_countries();
        st.set_country("Australia", false);
        assert_eq!(st.filters.countries, set(&["New Zealand"]));
        st.set_country("New Zealand", false);
        assert_eq!(st.filters.countries, set(&["Australia", "New Zealand"]));
    }

    #[test]
    fn test_no_match_yields_empty_subset() {
        let mut st = state();
        st.set_gdp_range(500.0, 60000.0);
        st.set_life_exp_range(83.0, 85.0);
        assert!(st.visible_indices.is_empty());
        assert!(st.table_rows.is_empty());
        assert_eq!(st.kpis.median_life_expectancy, None);
    }

    #[test]
    fn test_save_change_load_restores_view() {
        let mut st = state();
        st.set_continent("Africa", false);
        st.set_continent("Americas", false);
        st.set_continent("Europe", false);
        st.set_continent("Oceania", false);
        st.set_gdp_range(1000.0, 30000.0);
        let saved = st.filters.clone();

        st.view_name = "Asia-2007".to_string();
        st.save_view();
        assert!(st.view_name.is_empty());

        st.set_year(1962);
        st.select_all_continents();
        st.set_life_exp_range(40.0, 60.0);
        assert_ne!(st.filters, saved);

        st.load_view("Asia-2007");
        assert_eq!(st.filters, saved);
        assert_eq!(st.share_link, share::share_link(&saved));
    }

    #[test]
    fn test_save_without_name_keeps_input() {
        let mut st = state();
        st.view_name = "  ".to_string();
        st.save_view();
        assert!(st.saved_views.is_empty());
        assert_eq!(st.view_name, "  ");
        assert!(st.status_message.is_some());
    }

    #[test]
    fn test_shared_link_reproduces_view() {
        let mut st = state();
        st.set_year(1987);
        st.set_continent("Europe", false);
        st.set_gdp_range(1234.567, 20000.0);
        let link = st.share_link.clone();

        let mut other = state();
        other.open_link(&link);
        assert_eq!(other.filters.year, 1987);
        assert_eq!(other.filters.continents, st.filters.continents);
        assert_eq!(other.filters.countries, st.filters.countries);
        assert_eq!(other.visible_indices, st.visible_indices);
    }

    #[test]
    fn test_open_missing_source_keeps_dataset() {
        let mut st = state();
        let before = Arc::clone(&st.dataset);
        st.open_source(DatasetSource::File("/nonexistent/data.csv".into()));
        assert!(Arc::ptr_eq(&before, &st.dataset));
        let status = st.status_message.as_deref().unwrap_or("");
        assert!(status.starts_with("Error"));
    }

    #[test]
    fn test_sort_toggles_table_order() {
        let mut st = state();
        st.sort_table_by(TableColumn::Population);
        let first = st.dataset.records[st.table_rows[0]].population;
        let last_row = *st.table_rows.last().unwrap();
        let last = st.dataset.records[last_row].population;
        assert!(first <= last);

        st.sort_table_by(TableColumn::Population);
        let first = st.dataset.records[st.table_rows[0]].population;
        assert!(first >= last);
    }
}
