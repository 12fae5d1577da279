use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::DatasetSource;
use crate::data::resolve::{available_continents, available_countries};
use crate::export;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            year_slider(ui, state);
            ui.separator();

            continent_picker(ui, state);
            country_picker(ui, state);
            ui.separator();

            range_sliders(ui, state);
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
            ui.separator();

            saved_views(ui, state);
        });
}

fn year_slider(ui: &mut Ui, state: &mut AppState) {
    let years = state.dataset.years.clone();
    let Some(last) = years.len().checked_sub(1) else {
        return;
    };
    // The slider walks the dataset's distinct years rather than a fixed step.
    let mut idx = years
        .iter()
        .position(|&y| y == state.filters.year)
        .unwrap_or(last);
    ui.strong("Year");
    let response = ui.add(
        egui::Slider::new(&mut idx, 0..=last)
            .custom_formatter(|v, _| years[(v as usize).min(last)].to_string()),
    );
    if response.changed() {
        state.set_year(years[idx.min(last)]);
    }
}

fn continent_picker(ui: &mut Ui, state: &mut AppState) {
    let options = available_continents(&state.dataset, state.filters.year);
    let selected = state.filters.continents.clone();

    let header = format!("Continent(s)  ({}/{})", selected.len(), options.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("continents")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                state.select_all_continents();
            }
            for continent in &options {
                let text = RichText::new(continent).color(state.color_map.color_for(continent));
                let mut checked = selected.contains(continent);
                if ui.checkbox(&mut checked, text).changed() {
                    state.set_continent(continent, checked);
                }
            }
        });
}

fn country_picker(ui: &mut Ui, state: &mut AppState) {
    let filters = &state.filters;
    let options = available_countries(&state.dataset, filters.year, &filters.continents);
    let selected = state.filters.countries.clone();

    let header = format!("Country(ies)  ({}/{})", selected.len(), options.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("countries")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                state.select_all_countries();
            }
            for country in &options {
                let mut checked = selected.contains(country);
                if ui.checkbox(&mut checked, country.as_str()).changed() {
                    state.set_country(country, checked);
                }
            }
        });
}

fn range_sliders(ui: &mut Ui, state: &mut AppState) {
    let (gdp_lo, gdp_hi) = state.dataset.gdp_bounds;
    let (mut lower, mut upper) = state.filters.gdp_range;
    ui.strong("GDP per capita");
    let lo = ui.add(
        egui::Slider::new(&mut lower, gdp_lo..=gdp_hi)
            .logarithmic(true)
            .text("min")
            .fixed_decimals(2),
    );
    let hi = ui.add(
        egui::Slider::new(&mut upper, gdp_lo..=gdp_hi)
            .logarithmic(true)
            .text("max")
            .fixed_decimals(2),
    );
    if lo.changed() || hi.changed() {
        state.set_gdp_range(lower, upper);
    }

    let (lex_lo, lex_hi) = state.dataset.life_exp_bounds;
    let (mut lower, mut upper) = state.filters.life_exp_range;
    ui.strong("Life expectancy");
    let lo = ui.add(
        egui::Slider::new(&mut lower, lex_lo..=lex_hi)
            .text("min")
            .fixed_decimals(1),
    );
    let hi = ui.add(
        egui::Slider::new(&mut upper, lex_lo..=lex_hi)
            .text("max")
            .fixed_decimals(1),
    );
    if lo.changed() || hi.changed() {
        state.set_life_exp_range(lower, upper);
    }
}

fn saved_views(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Saved views");
    ui.horizontal(|ui: &mut Ui| {
        let edit = ui.add(
            egui::TextEdit::singleline(&mut state.view_name)
                .hint_text("View name")
                .desired_width(120.0),
        );
        let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Save").clicked() || submitted {
            state.save_view();
        }
    });

    if state.saved_views.is_empty() {
        ui.label(RichText::new("No saved views yet.").weak());
        return;
    }

    let names: Vec<String> = state.saved_views.names().map(str::to_string).collect();
    for name in names {
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Load").clicked() {
                state.load_view(&name);
            }
            let delete = ui.small_button("🗑").on_hover_text("Delete view");
            if delete.clicked() {
                state.delete_view(&name);
            }
            ui.label(&name);
        });
    }
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let kpis = &state.kpis;
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Countries", &kpis.countries.to_string());
        metric(&mut cols[1], "Median life expectancy", &kpis.median_label());
        metric(&mut cols[2], "Total population", &kpis.population_label());
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.heading(value);
    });
}

/// Chart / Table selector.
pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.tab, Tab::Chart, "📈 Chart");
        ui.selectable_value(&mut state.tab, Tab::Table, "📋 Table");
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Use bundled dataset").clicked() {
                state.open_source(DatasetSource::Bundled);
                ui.close_menu();
            }
            if ui.button("Export filtered data…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!(
            "{} records loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));
        ui.separator();

        if ui.button("Copy link").clicked() {
            ui.ctx().copy_text(state.share_link.clone());
            state.status_message = Some("Link copied to clipboard".to_string());
        }
        ui.add(
            egui::TextEdit::singleline(&mut state.link_input)
                .hint_text("Paste a shared link")
                .desired_width(220.0),
        );
        if ui.button("Open link").clicked() {
            let link = std::mem::take(&mut state.link_input);
            state.open_link(&link);
        }

        if let Some(err) = &state.reload_error {
            ui.label(RichText::new(err).color(Color32::RED));
        } else if let Some(msg) = &state.status_message {
            ui.label(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_source(DatasetSource::File(path));
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name(export::default_file_name(state.filters.year))
        .add_filter("CSV", &["csv"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    match export::save_csv(&state.dataset, &state.visible_indices, &path) {
        Ok(()) => {
            state.status_message = Some(format!(
                "Exported {} rows to {}",
                state.visible_indices.len(),
                path.display()
            ));
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
