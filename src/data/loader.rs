use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::model::{Dataset, Record};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Source column names for each record field. Defaults match the gapminder
/// table (`country`, `continent`, `year`, `lifeExp`, `pop`, `gdpPercap`,
/// `iso_alpha`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub entity: String,
    pub group: String,
    pub period: String,
    pub life_expectancy: String,
    pub population: String,
    pub gdp_per_capita: String,
    pub geo_code: String,
    /// Optional; rows get `None` when the column is absent.
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            entity: "country".into(),
            group: "continent".into(),
            period: "year".into(),
            life_expectancy: "lifeExp".into(),
            population: "pop".into(),
            gdp_per_capita: "gdpPercap".into(),
            geo_code: "iso_alpha".into(),
            latitude: "lat".into(),
            longitude: "lon".into(),
        }
    }
}

/// Column positions resolved against one file's header / schema.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    entity: usize,
    group: usize,
    period: usize,
    life_expectancy: usize,
    population: usize,
    gdp_per_capita: usize,
    geo_code: usize,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl ColumnMap {
    fn resolve(&self, position: impl Fn(&str) -> Option<usize>) -> Result<ColumnIndex> {
        let required = |name: &str| {
            position(name).with_context(|| format!("missing required column '{name}'"))
        };
        Ok(ColumnIndex {
            entity: required(&self.entity)?,
            group: required(&self.group)?,
            period: required(&self.period)?,
            life_expectancy: required(&self.life_expectancy)?,
            population: required(&self.population)?,
            gdp_per_capita: required(&self.gdp_per_capita)?,
            geo_code: required(&self.geo_code)?,
            latitude: position(&self.latitude),
            longitude: position(&self.longitude),
        })
    }
}

// ---------------------------------------------------------------------------
// Loader collaborator
// ---------------------------------------------------------------------------

/// Something that produces the dataset. Expected to be deterministic.
pub trait DatasetLoader {
    fn load(&self) -> Result<Dataset>;
}

impl<F> DatasetLoader for F
where
    F: Fn() -> Result<Dataset>,
{
    fn load(&self) -> Result<Dataset> {
        self()
    }
}

/// Loads a dataset file from disk.
#[derive(Debug, Clone)]
pub struct FileLoader {
    pub path: PathBuf,
    pub columns: ColumnMap,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMap) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }
}

impl DatasetLoader for FileLoader {
    fn load(&self) -> Result<Dataset> {
        let dataset = load_file(&self.path, &self.columns)
            .with_context(|| format!("loading {}", self.path.display()))?;
        log::info!(
            "Loaded {} records ({} entities, periods {:?}) from {}",
            dataset.len(),
            dataset.entities().len(),
            dataset.period_range(),
            self.path.display()
        );
        Ok(dataset)
    }
}

/// Load-once cache around a loader. The first successful non-empty load is
/// kept for the lifetime of the value; failures leave the cache empty.
#[derive(Debug)]
pub struct Memoized<L> {
    inner: L,
    cache: OnceLock<Arc<Dataset>>,
}

impl<L: DatasetLoader> Memoized<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: OnceLock::new(),
        }
    }

    /// Return the cached dataset, loading it on first use.
    ///
    /// Fails with [`AggregateError::EmptyDataset`] if the loader returns no records.
    pub fn get(&self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.cache.get() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = self.inner.load()?;
        if dataset.is_empty() {
            log::warn!("Loader returned an empty dataset");
            return Err(AggregateError::EmptyDataset.into());
        }

        let dataset = Arc::new(dataset);
        Ok(Arc::clone(self.cache.get_or_init(|| dataset)))
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one column per field (recommended)
/// * `.json`    – `[{ "country": "...", "year": 2007, ... }, ...]`
/// * `.csv`     – header row with column names
pub fn load_file(path: &Path, columns: &ColumnMap) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, columns)?,
        "json" => load_json(path, columns)?,
        "csv" => load_csv(path, columns)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    Ok(Dataset::from_records(records)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "country": "Norway", "continent": "Europe", "year": 2007,
///     "lifeExp": 80.196, "pop": 4627926, "gdpPercap": 49357.19, "iso_alpha": "NOR" },
///   ...
/// ]
/// ```
fn load_json(path: &Path, columns: &ColumnMap) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            json_record(obj, columns).with_context(|| format!("Row {i}"))
        })
        .collect()
}

fn json_record(obj: &Map<String, JsonValue>, columns: &ColumnMap) -> Result<Record> {
    let text = |col: &str| -> Result<String> {
        match obj.get(col) {
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(other) => bail!("'{col}': expected a string, got {other}"),
            None => bail!("missing '{col}'"),
        }
    };
    let number = |col: &str| -> Result<f64> {
        obj.get(col)
            .and_then(JsonValue::as_f64)
            .with_context(|| format!("'{col}': missing or not a number"))
    };
    let optional = |col: &str| -> Result<Option<f64>> {
        match obj.get(col) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .with_context(|| format!("'{col}': expected a number, got {value}")),
        }
    };

    Ok(Record {
        entity: text(&columns.entity)?,
        group: text(&columns.group)?,
        period: to_period(number(&columns.period)?)?,
        life_expectancy: number(&columns.life_expectancy)?,
        population: number(&columns.population)?,
        gdp_per_capita: number(&columns.gdp_per_capita)?,
        geo_code: text(&columns.geo_code)?,
        latitude: optional(&columns.latitude)?,
        longitude: optional(&columns.longitude)?,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per row.
/// Extra columns (e.g. `iso_num`) are ignored.
fn load_csv(path: &Path, columns: &ColumnMap) -> Result<Vec<Record>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let idx = columns.resolve(|name| headers.iter().position(|h| h == name))?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |i: usize| row.get(i).unwrap_or("").trim();
        let number = |i: usize| -> Result<f64> {
            let raw = cell(i);
            raw.parse::<f64>().with_context(|| {
                let column = &headers[i];
                format!("CSV row {row_no}, column {column}: '{raw}' is not a number")
            })
        };
        // Empty cells are missing coordinates; anything else must parse.
        let optional = |i: Option<usize>| -> Result<Option<f64>> {
            match i {
                Some(i) if !cell(i).is_empty() => number(i).map(Some),
                _ => Ok(None),
            }
        };

        records.push(Record {
            entity: cell(idx.entity).to_string(),
            group: cell(idx.group).to_string(),
            period: to_period(number(idx.period)?)
                .with_context(|| format!("CSV row {row_no}"))?,
            life_expectancy: number(idx.life_expectancy)?,
            population: number(idx.population)?,
            gdp_per_capita: number(idx.gdp_per_capita)?,
            geo_code: cell(idx.geo_code).to_string(),
            latitude: optional(idx.latitude)?,
            longitude: optional(idx.longitude)?,
        });
    }

    Ok(records)
}

fn to_period(value: f64) -> Result<i32> {
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        bail!("period {value} is not a whole year");
    }
    Ok(value as i32)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per record field.
///
/// Text columns may be Utf8 or LargeUtf8; numeric columns any of
/// Int32/Int64/Float32/Float64. Works with files written by both **Pandas**
/// and **Polars**.
fn load_parquet(path: &Path, columns: &ColumnMap) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let idx = columns.resolve(|name| schema.index_of(name).ok())?;

        for row in 0..batch.num_rows() {
            let text = |i: usize| -> Result<String> {
                extract_string(batch.column(i), row).with_context(|| {
                    let column = schema.field(i).name();
                    format!("Row {row}: failed to read '{column}'")
                })
            };
            let number = |i: usize| -> Result<f64> {
                let column = schema.field(i).name();
                extract_f64(batch.column(i), row)
                    .with_context(|| format!("Row {row}: failed to read '{column}'"))?
                    .with_context(|| format!("Row {row}: null in '{column}'"))
            };
            let optional = |i: Option<usize>| -> Result<Option<f64>> {
                match i {
                    Some(i) => extract_f64(batch.column(i), row).with_context(|| {
                        let column = schema.field(i).name();
                        format!("Row {row}: failed to read '{column}'")
                    }),
                    None => Ok(None),
                }
            };

            records.push(Record {
                entity: text(idx.entity)?,
                group: text(idx.group)?,
                period: to_period(number(idx.period)?)?,
                life_expectancy: number(idx.life_expectancy)?,
                population: number(idx.population)?,
                gdp_per_capita: number(idx.gdp_per_capita)?,
                geo_code: text(idx.geo_code)?,
                latitude: optional(idx.latitude)?,
                longitude: optional(idx.longitude)?,
            });
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in text column");
    }
    if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
        Ok(s.value(row).to_string())
    } else if let Some(s) = col.as_any().downcast_ref::<LargeStringArray>() {
        Ok(s.value(row).to_string())
    } else {
        bail!("Expected Utf8 or LargeUtf8 column, got {:?}", col.data_type())
    }
}

/// Numeric cell as `f64`; `Ok(None)` for nulls.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = if let Some(arr) = any.downcast_ref::<Float64Array>() {
        arr.value(row)
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        arr.value(row) as f64
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        arr.value(row) as f64
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        arr.value(row) as f64
    } else {
        bail!("Expected a numeric column, got {:?}", col.data_type())
    };
    Ok(Some(value))
}
