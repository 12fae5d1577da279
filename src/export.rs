//! CSV export of the derived subset.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::data::model::Dataset;

/// Default file name offered by the save dialog.
pub fn default_file_name(year: i32) -> String {
    format!("gapminder_{year}.csv")
}

/// Write the header and one row per index, in the given order.
///
/// Columns: country, continent, year, gdp_per_capita, life_expectancy,
/// population.
pub fn write_csv<W: Write>(dataset: &Dataset, indices: &[usize], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    if indices.is_empty() {
        // `serialize` only emits the header together with the first row.
        writer.write_record(HEADER)?;
    }
    for &i in indices {
        writer
            .serialize(&dataset.records[i])
            .with_context(|| format!("writing row for {}", dataset.records[i].country))?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

const HEADER: [&str; 6] = [
    "country",
    "continent",
    "year",
    "gdp_per_capita",
    "life_expectancy",
    "population",
];

/// Export to an in-memory UTF-8 string.
pub fn to_csv_string(dataset: &Dataset, indices: &[usize]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(dataset, indices, &mut buf)?;
    String::from_utf8(buf).context("CSV output is not UTF-8")
}

/// Export to `path`, replacing any existing file.
pub fn save_csv(dataset: &Dataset, indices: &[usize], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, indices, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", indices.len(), path.display());
    Ok(())
}
