use std::cmp::Ordering;

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Dataset, Record};
use crate::state::AppState;
use crate::stats::format_thousands;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableColumn {
    Country,
    Continent,
    Year,
    GdpPerCapita,
    LifeExpectancy,
    Population,
}

impl TableColumn {
    pub const ALL: [TableColumn; 6] = [
        TableColumn::Country,
        TableColumn::Continent,
        TableColumn::Year,
        TableColumn::GdpPerCapita,
        TableColumn::LifeExpectancy,
        TableColumn::Population,
    ];

    pub fn title(self) -> &'static str {
        match self {
            TableColumn::Country => "Country",
            TableColumn::Continent => "Continent",
            TableColumn::Year => "Year",
            TableColumn::GdpPerCapita => "GDP per capita",
            TableColumn::LifeExpectancy => "Life expectancy",
            TableColumn::Population => "Population",
        }
    }

    fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            TableColumn::Country => a.country.cmp(&b.country),
            TableColumn::Continent => a.continent.cmp(&b.continent),
            TableColumn::Year => a.year.cmp(&b.year),
            TableColumn::GdpPerCapita => a.gdp_per_capita.total_cmp(&b.gdp_per_capita),
            TableColumn::LifeExpectancy => a.life_expectancy.total_cmp(&b.life_expectancy),
            TableColumn::Population => a.population.cmp(&b.population),
        }
    }

    fn cell(self, rec: &Record) -> String {
        match self {
            TableColumn::Country => rec.country.clone(),
            TableColumn::Continent => rec.continent.clone(),
            TableColumn::Year => rec.year.to_string(),
            TableColumn::GdpPerCapita => format!("{:.2}", rec.gdp_per_capita),
            TableColumn::LifeExpectancy => format!("{:.1}", rec.life_expectancy),
            TableColumn::Population => format_thousands(rec.population),
        }
    }
}

/// `column: None` is the default continent, then country order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    pub column: Option<TableColumn>,
    pub ascending: bool,
}

impl Default for TableSort {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }
}

impl TableSort {
    /// Clicking a new column sorts ascending; clicking it again flips.
    pub fn toggled(self, column: TableColumn) -> Self {
        if self.column == Some(column) {
            Self {
                column: Some(column),
                ascending: !self.ascending,
            }
        } else {
            Self {
                column: Some(column),
                ascending: true,
            }
        }
    }
}

/// Return `indices` in table order. Ties fall back to continent, country.
pub fn sorted_rows(dataset: &Dataset, indices: &[usize], sort: TableSort) -> Vec<usize> {
    let mut rows = indices.to_vec();
    rows.sort_by(|&a, &b| {
        let (ra, rb) = (&dataset.records[a], &dataset.records[b]);
        let primary = match sort.column {
            Some(col) => {
                let ord = col.compare(ra, rb);
                if sort.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
            None => Ordering::Equal,
        };
        primary
            .then_with(|| ra.continent.cmp(&rb.continent))
            .then_with(|| ra.country.cmp(&rb.country))
            .then_with(|| ra.year.cmp(&rb.year))
    });
    rows
}

// ---------------------------------------------------------------------------
// Table view (central panel, "Table" tab)
// ---------------------------------------------------------------------------

/// Render the filtered records with sortable headers and the export button.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Download filtered data (CSV)").clicked() {
            panels::export_dialog(state);
        }
        ui.label(format!("{} rows", state.table_rows.len()));
    });
    ui.separator();

    let text_height = egui::TextStyle::Body.resolve(ui.style()).size * 1.5;
    let mut clicked = None;
    let sort = state.table_sort;
    let column = Column::auto().at_least(90.0).clip(true);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(column, TableColumn::ALL.len())
        .min_scrolled_height(0.0)
        .header(22.0, |mut header| {
            for col in TableColumn::ALL {
                header.col(|ui: &mut Ui| {
                    let arrow = match sort.column {
                        Some(c) if c == col && sort.ascending => " ⏶",
                        Some(c) if c == col => " ⏷",
                        _ => "",
                    };
                    let label = RichText::new(format!("{}{arrow}", col.title())).strong();
                    if ui.button(label).clicked() {
                        clicked = Some(col);
                    }
                });
            }
        })
        .body(|body| {
            body.rows(text_height, state.table_rows.len(), |mut row| {
                let rec = &state.dataset.records[state.table_rows[row.index()]];
                for col in TableColumn::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(col.cell(rec));
                    });
                }
            });
        });

    if let Some(col) = clicked {
        state.sort_table_by(col);
    }
}
