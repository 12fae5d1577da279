use anyhow::Context;
use clap::Parser;
use eframe::egui;
use gapminder_explorer::app::GapminderApp;
use gapminder_explorer::cli::CliArgs;
use gapminder_explorer::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let state = AppState::new(args.source(), args.ttl(), args.view.as_deref())
        .context("loading dataset")
        .inspect_err(|e| log::error!("{e:#}"))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gapminder Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(GapminderApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))
}
