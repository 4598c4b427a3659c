use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use rusty_drill::data::loader::ColumnMap;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// (country, continent, iso code, latitude, longitude)
const COUNTRIES: &[(&str, &str, &str, f64, f64)] = &[
    ("Norway", "Europe", "NOR", 60.47, 8.47),
    ("Portugal", "Europe", "PRT", 39.40, -8.22),
    ("Chad", "Africa", "TCD", 15.45, 18.73),
    ("Kenya", "Africa", "KEN", -0.02, 37.91),
    ("Japan", "Asia", "JPN", 36.20, 138.25),
    ("Nepal", "Asia", "NPL", 28.39, 84.12),
    ("Peru", "Americas", "PER", -9.19, -75.02),
    ("Canada", "Americas", "CAN", 56.13, -106.35),
    ("New Zealand", "Oceania", "NZL", -40.90, 174.89),
];

struct Row {
    country: &'static str,
    continent: &'static str,
    year: i32,
    life_exp: f64,
    pop: i64,
    gdp_percap: f64,
    iso: &'static str,
    lat: f64,
    lon: f64,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let years: Vec<i32> = (1952..=2007).step_by(5).collect();
    let mut rows = Vec::with_capacity(COUNTRIES.len() * years.len());

    for &(country, continent, iso, lat, lon) in COUNTRIES {
        let mut life_exp = rng.range(35.0, 72.0);
        let mut pop = rng.range(2.0e6, 8.0e7);
        let mut gdp = rng.range(500.0, 12000.0);

        for &year in &years {
            rows.push(Row {
                country,
                continent,
                year,
                life_exp,
                pop: pop.round() as i64,
                gdp_percap: gdp,
                iso,
                lat,
                lon,
            });
            // Slow upward drift with noise, capped at plausible values.
            life_exp = (life_exp + rng.range(0.3, 2.5)).min(83.0);
            pop *= 1.0 + rng.range(0.01, 0.15);
            gdp *= 1.0 + rng.range(-0.05, 0.2);
        }
    }
    rows
}

fn write_parquet(rows: &[Row], columns: &ColumnMap, output_path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(&columns.entity, DataType::Utf8, false),
        Field::new(&columns.group, DataType::Utf8, false),
        Field::new(&columns.period, DataType::Int32, false),
        Field::new(&columns.life_expectancy, DataType::Float64, false),
        Field::new(&columns.population, DataType::Int64, false),
        Field::new(&columns.gdp_per_capita, DataType::Float64, false),
        Field::new(&columns.geo_code, DataType::Utf8, false),
        Field::new(&columns.latitude, DataType::Float64, true),
        Field::new(&columns.longitude, DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.continent))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.life_exp))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.pop))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.gdp_percap))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.iso))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.lat))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.lon))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(output_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(rows: &[Row], columns: &ColumnMap, output_path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path).context("creating CSV output")?;
    writer.write_record([
        &columns.entity,
        &columns.group,
        &columns.period,
        &columns.life_expectancy,
        &columns.population,
        &columns.gdp_per_capita,
        &columns.geo_code,
        &columns.latitude,
        &columns.longitude,
    ])?;
    for r in rows {
        writer.write_record([
            r.country.to_string(),
            r.continent.to_string(),
            r.year.to_string(),
            format!("{:.3}", r.life_exp),
            r.pop.to_string(),
            format!("{:.2}", r.gdp_percap),
            r.iso.to_string(),
            r.lat.to_string(),
            r.lon.to_string(),
        ])?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);
    let columns = ColumnMap::default();

    write_parquet(&rows, &columns, "sample_gapminder.parquet")?;
    write_csv(&rows, &columns, "sample_gapminder.csv")?;

    println!(
        "Wrote {} records ({} countries) to sample_gapminder.parquet and sample_gapminder.csv",
        rows.len(),
        COUNTRIES.len()
    );
    Ok(())
}
