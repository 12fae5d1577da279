use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use gapminder_explorer::data::loader::DatasetSource;

/// Write the bundled extract as Parquet (default `gapminder.parquet`).
fn main() -> Result<()> {
    env_logger::init();
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("gapminder.parquet"));

    let dataset = DatasetSource::Bundled.load()?;
    let records = &dataset.records;

    let population = records
        .iter()
        .map(|r| i64::try_from(r.population).context("population exceeds i64"))
        .collect::<Result<Vec<_>>>()?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("gdp_per_capita", DataType::Float64, false),
        Field::new("life_expectancy", DataType::Float64, false),
        Field::new("population", DataType::Int64, false),
    ]));

    let country = StringArray::from_iter_values(records.iter().map(|r| &r.country));
    let continent = StringArray::from_iter_values(records.iter().map(|r| &r.continent));
    let year = Int32Array::from_iter_values(records.iter().map(|r| r.year));
    let gdp = Float64Array::from_iter_values(records.iter().map(|r| r.gdp_per_capita));
    let lex = Float64Array::from_iter_values(records.iter().map(|r| r.life_expectancy));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(country),
        Arc::new(continent),
        Arc::new(year),
        Arc::new(gdp),
        Arc::new(lex),
        Arc::new(Int64Array::from(population)),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    let countries = records
        .iter()
        .map(|r| r.country.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    println!(
        "Wrote {} records ({} countries, {} years) to {}",
        dataset.len(),
        countries,
        dataset.years.len(),
        output_path.display()
    );
    Ok(())
}
