//! Gapminder explorer: filter a country/year demographic table and view it
//! as a scatter chart, KPI summary and exportable table.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod export;
pub mod share;
pub mod state;
pub mod stats;
pub mod ui;
pub mod views;
