use eframe::egui::Ui;
use egui_plot::{GridMark, Legend, Plot, PlotPoint, Points};

use crate::data::model::Record;
use crate::state::AppState;
use crate::stats::format_thousands;

/// Message shown instead of an empty chart.
pub const EMPTY_MESSAGE: &str = "No data for the current filter selection.";

const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 30.0;

/// Squared [`distance`] within which hovering names a country.
const HOVER_RADIUS_SQ: f64 = 9.0;

// ---------------------------------------------------------------------------
// Scatter plot (central panel, "Chart" tab)
// ---------------------------------------------------------------------------

/// Life expectancy against GDP per capita on a log10 axis. Marker area
/// follows population, colour follows continent.
pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    if let Some(message) = chart_message(state) {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(message);
        });
        return;
    }

    let dataset = &state.dataset;
    let max_population = dataset
        .records
        .iter()
        .map(|r| r.population)
        .max()
        .unwrap_or(1);
    let visible: Vec<&Record> = state
        .visible_indices
        .iter()
        .map(|&i| &dataset.records[i])
        .collect();

    let hover_records = visible.iter().map(|r| (*r).clone()).collect::<Vec<_>>();

    Plot::new("gapminder_scatter")
        .legend(Legend::default())
        .x_axis_label("GDP per capita (log scale)")
        .y_axis_label("Life expectancy")
        .x_axis_formatter(|mark: GridMark, _range| format_gdp(10f64.powf(mark.value)))
        .label_formatter(move |_name, value| hover_label(&hover_records, value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for rec in &visible {
                // One item per country; items sharing a continent name share
                // a legend entry.
                let point = [rec.gdp_per_capita.log10(), rec.life_expectancy];
                let points = Points::new(vec![point])
                    .name(&rec.continent)
                    .color(state.color_map.color_for(&rec.continent))
                    .radius(marker_radius(rec.population, max_population))
                    .filled(true);
                plot_ui.points(points);
            }
        });
}

/// Text to show in place of the chart, if any.
pub fn chart_message(state: &AppState) -> Option<&'static str> {
    if state.visible_indices.is_empty() {
        Some(EMPTY_MESSAGE)
    } else {
        None
    }
}

/// Radius such that marker area is proportional to population.
pub fn marker_radius(population: u64, max_population: u64) -> f32 {
    if max_population == 0 {
        return MIN_RADIUS;
    }
    let share = (population as f64 / max_population as f64).sqrt() as f32;
    MIN_RADIUS + (MAX_RADIUS - MIN_RADIUS) * share
}

/// Tick label for a GDP value in dollars.
pub fn format_gdp(value: f64) -> String {
    if value >= 1000.0 {
        format!("{}k", format_thousands((value / 1000.0).round() as u64))
    } else {
        format!("{value:.0}")
    }
}

/// Name the country closest to the cursor, in plot coordinates. Empty when
/// no country is near.
fn hover_label(records: &[Record], cursor: &PlotPoint) -> String {
    let nearest = records
        .iter()
        .map(|rec| (distance(rec, cursor), rec))
        .min_by(|a, b| a.0.total_cmp(&b.0));
    match nearest {
        Some((dist, rec)) if dist <= HOVER_RADIUS_SQ => format!(
            "{} ({})\nGDP per capita: {:.0}\nLife expectancy: {:.1}\nPopulation: {}",
            rec.country,
            rec.continent,
            rec.gdp_per_capita,
            rec.life_expectancy,
            format_thousands(rec.population)
        ),
        _ => String::new(),
    }
}

fn distance(rec: &Record, cursor: &PlotPoint) -> f64 {
    // Life expectancy spans ~60 units, log GDP ~3; scale so both count.
    let dx = (rec.gdp_per_capita.log10() - cursor.x) * 20.0;
    let dy = rec.life_expectancy - cursor.y;
    dx * dx + dy * dy
}
