use serde::Serialize;

use super::model::Record;

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

/// Headline numbers for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KpiSet {
    Overview {
        entity_count: usize,
        total_records: usize,
        /// `None` when the dataset has no records.
        max_life_expectancy: Option<f64>,
    },
    Entity {
        entity: String,
        max_life_expectancy: f64,
        population: f64,
        reference_period: i32,
    },
}

/// A labelled, display-formatted scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KpiTile {
    pub label: String,
    pub value: String,
}

impl KpiTile {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl KpiSet {
    /// The three tiles shown above the charts.
    pub fn tiles(&self) -> [KpiTile; 3] {
        match self {
            KpiSet::Overview {
                entity_count,
                total_records,
                max_life_expectancy,
            } => [
                KpiTile::new("Total Countries", entity_count.to_string()),
                KpiTile::new("Total Records", total_records.to_string()),
                KpiTile::new(
                    "Max Life Expectancy",
                    max_life_expectancy.map_or_else(|| "–".to_string(), |v| format!("{v:.1}")),
                ),
            ],
            KpiSet::Entity {
                entity,
                max_life_expectancy,
                population,
                reference_period,
            } => [
                KpiTile::new("Country", entity.clone()),
                KpiTile::new("Max Life Expectancy", format!("{max_life_expectancy:.1}")),
                KpiTile::new(
                    format!("Population ({reference_period})"),
                    format!("{}", population.round() as i64),
                ),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Geo series (map)
// ---------------------------------------------------------------------------

/// One map marker: located by geo code, sized by population, coloured by
/// life expectancy, framed by period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub entity: String,
    pub geo_code: String,
    pub period: i32,
    pub population: f64,
    pub life_expectancy: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&Record> for GeoPoint {
    fn from(rec: &Record) -> Self {
        GeoPoint {
            entity: rec.entity.clone(),
            geo_code: rec.geo_code.clone(),
            period: rec.period,
            population: rec.population,
            life_expectancy: rec.life_expectancy,
            latitude: rec.latitude,
            longitude: rec.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoSeries {
    pub title: String,
    /// Whether the renderer should scrub through periods.
    pub animated: bool,
    pub points: Vec<GeoPoint>,
}

impl GeoSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points belonging to one animation frame.
    pub fn frame(&self, period: i32) -> impl Iterator<Item = &GeoPoint> {
        self.points.iter().filter(move |p| p.period == period)
    }
}

// ---------------------------------------------------------------------------
// Comparison series (bar chart)
// ---------------------------------------------------------------------------

/// What the bar categories are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    Group,
    Entity,
}

/// A single bar segment: one record at the reference period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub entity: String,
    pub life_expectancy: f64,
}

/// One bar: a group (or the selected entity) with its member rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonCategory {
    pub label: String,
    /// `#rrggbb` colour for the bar.
    pub color: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonCategory {
    pub fn mean_life_expectancy(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let sum: f64 = self.rows.iter().map(|r| r.life_expectancy).sum();
        Some(sum / self.rows.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub title: String,
    pub keyed_by: CategoryKey,
    pub categories: Vec<ComparisonCategory>,
}

impl ComparisonSeries {
    /// Total number of rows across all categories.
    pub fn row_count(&self) -> usize {
        self.categories.iter().map(|c| c.rows.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

/// Display projection of a record for the data grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub entity: String,
    pub group: String,
    pub life_expectancy: f64,
    pub gdp_per_capita: f64,
    pub population: f64,
}

impl From<&Record> for TableRow {
    fn from(rec: &Record) -> Self {
        TableRow {
            entity: rec.entity.clone(),
            group: rec.group.clone(),
            life_expectancy: rec.life_expectancy,
            gdp_per_capita: rec.gdp_per_capita,
            population: rec.population,
        }
    }
}

// ---------------------------------------------------------------------------
// Trend series (analytics line charts)
// ---------------------------------------------------------------------------

/// One line chart: `(period, value)` points sorted by period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendLine {
    pub title: String,
    pub metric: String,
    pub points: Vec<(i32, f64)>,
}

/// The three per-entity line charts of the analytics view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub entity: String,
    pub life_expectancy: TrendLine,
    pub population: TrendLine,
    pub gdp_per_capita: TrendLine,
}

impl TrendSeries {
    pub fn lines(&self) -> [&TrendLine; 3] {
        [&self.life_expectancy, &self.population, &self.gdp_per_capita]
    }
}
