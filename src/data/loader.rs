use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, UInt64Array,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Dataset, Record};

/// Gapminder extract shipped inside the binary.
pub const BUNDLED_CSV: &str = include_str!("../../assets/gapminder.csv");

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    /// The embedded Gapminder extract.
    Bundled,
    /// A user supplied file, dispatched by extension.
    File(PathBuf),
}

impl DatasetSource {
    /// Load and validate the full dataset.
    pub fn load(&self) -> Result<Dataset> {
        match self {
            DatasetSource::Bundled => load_csv(BUNDLED_CSV.as_bytes()).context("bundled dataset"),
            DatasetSource::File(path) => load_file(path),
        }
    }

    /// Short description for the status bar.
    pub fn label(&self) -> String {
        match self {
            DatasetSource::Bundled => "bundled Gapminder extract".to_string(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }
}

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "country": ..., "continent": ..., ... }, ...]`
/// * `.parquet` – flat columns with the same names
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV file")?;
            load_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    };
    let name = path.display();
    dataset.with_context(|| format!("loading {name}"))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row naming the columns (snake_case or the original
/// `lifeExp` / `gdpPercap` / `pop`). Extra columns are ignored.
fn load_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let mut records = Vec::new();

    for (row_no, result) in reader.deserialize::<Record>().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        records.push(record);
    }

    Ok(Dataset::from_records(records)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "Japan", "continent": "Asia", "year": 2007,
///     "lifeExp": 82.603, "gdpPercap": 31656.07, "pop": 127467972 },
///   ...
/// ]
/// ```
fn load_json(text: &str) -> Result<Dataset> {
    let records: Vec<Record> = serde_json::from_str(text).context("parsing JSON records")?;
    Ok(Dataset::from_records(records)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per record field.
///
/// Works with files written by **Pandas**, **Polars** and the
/// `generate_sample` binary.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, &mut records)?;
    }

    Ok(Dataset::from_records(records)?)
}

fn append_batch(batch: &RecordBatch, records: &mut Vec<Record>) -> Result<()> {
    let country = column(batch, &["country"])?;
    let continent = column(batch, &["continent"])?;
    let year = column(batch, &["year"])?;
    let gdp = column(batch, &["gdp_per_capita", "gdpPercap"])?;
    let lex = column(batch, &["life_expectancy", "lifeExp"])?;
    let pop = column(batch, &["population", "pop"])?;

    for row in 0..batch.num_rows() {
        let at = |field: &str| format!("row {row}: {field}");
        let year_value = int_at(year, row).with_context(|| at("year"))?;
        let pop_value = int_at(pop, row).with_context(|| at("population"))?;
        let rec = Record {
            country: string_at(country, row).with_context(|| at("country"))?,
            continent: string_at(continent, row).with_context(|| at("continent"))?,
            year: i32::try_from(year_value).with_context(|| at("year"))?,
            gdp_per_capita: float_at(gdp, row).with_context(|| at("gdp_per_capita"))?,
            life_expectancy: float_at(lex, row).with_context(|| at("life_expectancy"))?,
            population: u64::try_from(pop_value).with_context(|| at("population"))?,
        };
        records.push(rec);
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

/// Find the first column matching one of `names`.
fn column<'a>(batch: &'a RecordBatch, names: &[&str]) -> Result<&'a Arc<dyn Array>> {
    let schema = batch.schema();
    names
        .iter()
        .find_map(|name| schema.index_of(name).ok())
        .map(|idx| batch.column(idx))
        .with_context(|| format!("Parquet file missing '{}' column", names[0]))
}

fn string_at(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("expected a string column, got {other:?}"),
    }
}

fn int_at(col: &Arc<dyn Array>, row: usize) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Int32 => Ok(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => Ok(downcast::<Int64Array>(col)?.value(row)),
        DataType::UInt64 => {
            let v = downcast::<UInt64Array>(col)?.value(row);
            i64::try_from(v).context("integer out of range")
        }
        other => bail!("expected an integer column, got {other:?}"),
    }
}

fn float_at(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Float64 => Ok(downcast::<Float64Array>(col)?.value(row)),
        DataType::Float32 => Ok(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Int32 | DataType::Int64 | DataType::UInt64 => Ok(int_at(col, row)? as f64),
        other => bail!("expected a numeric column, got {other:?}"),
    }
}

fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array type {:?}", col.data_type()))
}
