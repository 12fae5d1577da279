use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GapminderApp {
    pub state: AppState,
}

impl GapminderApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for GapminderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.refresh_dataset();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, chart / table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Life Expectancy vs GDP per Capita");
            panels::kpi_row(ui, &self.state);
            ui.separator();
            panels::tab_bar(ui, &mut self.state);
            match self.state.tab {
                Tab::Chart => plot::scatter_plot(ui, &self.state),
                Tab::Table => table::data_table(ui, &mut self.state),
            }
        });

        // The cache TTL is checked once per frame; make sure a frame happens.
        ctx.request_repaint_after(self.state.reload_interval());
    }
}
