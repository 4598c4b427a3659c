//! Drill-down aggregation: everything the dashboard shows for one selection.
//!
//! Every function here is a pure function of the dataset, the selection and
//! (where relevant) the reference period. Point-in-time views (KPIs, bars,
//! table) look at [`REFERENCE_PERIOD`]; trend views (map, line charts) span
//! all periods.

use super::filter::select_rows;
use super::model::{Dataset, Record, Selection};
use super::views::{
    CategoryKey, ComparisonCategory, ComparisonRow, ComparisonSeries, GeoPoint, GeoSeries,
    KpiSet, TableRow, TrendLine, TrendSeries,
};
use crate::color::ColorMap;
use crate::error::AggregateError;

/// The fixed comparison year: the most recent year of the gapminder data.
pub const REFERENCE_PERIOD: i32 = 2007;

/// All records observed at `period`, in input order. Empty if none match.
pub fn latest_period_slice(dataset: &Dataset, period: i32) -> Dataset {
    let records = dataset
        .records()
        .iter()
        .filter(|rec| rec.period == period)
        .cloned()
        .collect();
    Dataset::from_trusted(records)
}

/// Headline numbers for the selection.
pub fn kpis(
    dataset: &Dataset,
    selection: &Selection,
    reference_period: i32,
) -> Result<KpiSet, AggregateError> {
    let rows = select_rows(dataset, selection, None)?;

    match selection {
        Selection::All => Ok(KpiSet::Overview {
            entity_count: dataset.entities().len(),
            total_records: rows.len(),
            max_life_expectancy: max_life_expectancy(&rows),
        }),
        Selection::Entity(name) => {
            let at_reference = rows
                .iter()
                .find(|rec| rec.period == reference_period)
                .ok_or_else(|| AggregateError::MissingData {
                    entity: name.clone(),
                    period: reference_period,
                })?;
            // A known entity always has at least the row found above.
            let max = max_life_expectancy(&rows).unwrap_or(at_reference.life_expectancy);

            Ok(KpiSet::Entity {
                entity: name.clone(),
                max_life_expectancy: max,
                population: at_reference.population,
                reference_period,
            })
        }
    }
}

/// Map markers. `All` covers every record; an entity covers its own
/// trajectory. Both are animated over period.
pub fn geo_series(dataset: &Dataset, selection: &Selection) -> Result<GeoSeries, AggregateError> {
    let rows = select_rows(dataset, selection, None)?;

    let title = match selection {
        Selection::All => match dataset.period_range() {
            Some((first, last)) => format!("Life Expectancy by Country ({first}–{last})"),
            None => "Life Expectancy by Country".to_string(),
        },
        Selection::Entity(name) => format!("Life Expectancy — {name}"),
    };

    Ok(GeoSeries {
        title,
        animated: true,
        points: rows.into_iter().map(GeoPoint::from).collect(),
    })
}

/// Bar chart at the reference period: one bar per group for `All`, a single
/// bar keyed by the entity name otherwise.
pub fn comparison_series(
    dataset: &Dataset,
    selection: &Selection,
    reference_period: i32,
) -> Result<ComparisonSeries, AggregateError> {
    let rows = select_rows(dataset, selection, Some(reference_period))?;

    let keyed_by = match selection {
        Selection::All => CategoryKey::Group,
        Selection::Entity(_) => CategoryKey::Entity,
    };
    let key_of = |rec: &Record| -> String {
        match keyed_by {
            CategoryKey::Group => rec.group.clone(),
            CategoryKey::Entity => rec.entity.clone(),
        }
    };

    let mut categories: Vec<(String, Vec<ComparisonRow>)> = Vec::new();
    for rec in rows {
        let key = key_of(rec);
        let row = ComparisonRow {
            entity: rec.entity.clone(),
            life_expectancy: rec.life_expectancy,
        };
        match categories.iter_mut().find(|(label, _)| *label == key) {
            Some((_, members)) => members.push(row),
            None => categories.push((key, vec![row])),
        }
    }

    let colors = ColorMap::new(categories.iter().map(|(label, _)| label.as_str()));
    let categories = categories
        .into_iter()
        .map(|(label, rows)| ComparisonCategory {
            color: colors.color_for(&label).to_string(),
            label,
            rows,
        })
        .collect();

    Ok(ComparisonSeries {
        title: format!("Life Expectancy ({reference_period})"),
        keyed_by,
        categories,
    })
}

/// The rows behind [`comparison_series`], projected for the data grid.
pub fn table_slice(
    dataset: &Dataset,
    selection: &Selection,
    reference_period: i32,
) -> Result<Vec<TableRow>, AggregateError> {
    let rows = select_rows(dataset, selection, Some(reference_period))?;
    Ok(rows.into_iter().map(TableRow::from).collect())
}

/// Per-entity line charts. `None` for `All`: there is nothing to drill into.
pub fn trend_series(
    dataset: &Dataset,
    selection: &Selection,
) -> Result<Option<TrendSeries>, AggregateError> {
    let mut rows = select_rows(dataset, selection, None)?;
    let Selection::Entity(name) = selection else {
        return Ok(None);
    };
    rows.sort_by_key(|rec| rec.period);

    let line = |label: &str, metric: &str, value: fn(&Record) -> f64| TrendLine {
        title: format!("{label} Over Time — {name}"),
        metric: metric.to_string(),
        points: rows.iter().map(|rec| (rec.period, value(rec))).collect(),
    };

    Ok(Some(TrendSeries {
        entity: name.clone(),
        life_expectancy: line("Life Expectancy", "life_expectancy", |r| r.life_expectancy),
        population: line("Population", "population", |r| r.population),
        gdp_per_capita: line("GDP Per Capita", "gdp_per_capita", |r| r.gdp_per_capita),
    }))
}

/// Options for the selector: `All`, then every entity in first-appearance order.
pub fn selection_options(dataset: &Dataset) -> Vec<Selection> {
    std::iter::once(Selection::All)
        .chain(dataset.entities().iter().cloned().map(Selection::Entity))
        .collect()
}

fn max_life_expectancy(rows: &[&Record]) -> Option<f64> {
    rows.iter()
        .map(|rec| rec.life_expectancy)
        .filter(|v| !v.is_nan())
        .max_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record("Chad", "Africa", 2002, 50.5, 9.0e6),
            record("Norway", "Europe", 2002, 79.0, 4.5e6),
            record("Kenya", "Africa", 2002, 50.9, 3.1e7),
            record("Chad", "Africa", 2007, 50.7, 1.0e7),
            record("Norway", "Europe", 2007, 80.2, 4.6e6),
            record("Kenya", "Africa", 2007, 54.1, 3.5e7),
        ])
        .unwrap()
    }

    #[test]
    fn test_latest_period_slice() {
        let ds = dataset();
        let slice = latest_period_slice(&ds, 2007);
        assert_eq!(slice.len(), 3);
        assert!(slice.records().iter().all(|r| r.period == 2007));
        assert!(latest_period_slice(&ds, 1952).is_empty());
    }

    #[test]
    fn test_overview_kpis() {
        let ds = dataset();
        let kpi = kpis(&ds, &Selection::All, REFERENCE_PERIOD).unwrap();
        assert_eq!(
            kpi,
            KpiSet::Overview {
                entity_count: 3,
                total_records: 6,
                max_life_expectancy: Some(80.2),
            }
        );
    }

    #[test]
    fn test_entity_kpis() {
        let ds = dataset();
        let kpi = kpis(&ds, &Selection::entity("Kenya"), REFERENCE_PERIOD).unwrap();
        assert_eq!(
            kpi,
            KpiSet::Entity {
                entity: "Kenya".into(),
                max_life_expectancy: 54.1,
                population: 3.5e7,
                reference_period: 2007,
            }
        );
        let tiles = kpi.tiles();
        assert_eq!(tiles[0].value, "Kenya");
        assert_eq!(tiles[1].value, "54.1");
        assert_eq!(tiles[2].label, "Population (2007)");
        assert_eq!(tiles[2].value, "35000000");
    }

    #[test]
    fn test_entity_kpis_missing_reference_period() {
        let ds = dataset();
        let err = kpis(&ds, &Selection::entity("Chad"), 1997).unwrap_err();
        assert_eq!(
            err,
            AggregateError::MissingData {
                entity: "Chad".into(),
                period: 1997
            }
        );
    }

    #[test]
    fn test_geo_series_branches() {
        let ds = dataset();
        let all = geo_series(&ds, &Selection::All).unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.animated);
        assert_eq!(all.title, "Life Expectancy by Country (2002–2007)");
        assert_eq!(all.frame(2002).count(), 3);

        let norway = geo_series(&ds, &Selection::entity("Norway")).unwrap();
        assert_eq!(norway.len(), 2);
        assert!(norway.points.iter().all(|p| p.entity == "Norway"));
        assert_eq!(norway.title, "Life Expectancy — Norway");
    }

    #[test]
    fn test_comparison_groups_by_continent() {
        let ds = dataset();
        let series = comparison_series(&ds, &Selection::All, REFERENCE_PERIOD).unwrap();
        assert_eq!(series.keyed_by, CategoryKey::Group);
        let labels: Vec<&str> = series.categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Africa", "Europe"]);
        assert_eq!(series.categories[0].rows.len(), 2);
        assert_eq!(series.row_count(), 3);
        assert_ne!(series.categories[0].color, series.categories[1].color);

        let mean = series.categories[0].mean_life_expectancy().unwrap();
        assert!((mean - (50.7 + 54.1) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_comparison_single_entity_bar() {
        let ds = dataset();
        let series = comparison_series(&ds, &Selection::entity("Chad"), REFERENCE_PERIOD).unwrap();
        assert_eq!(series.keyed_by, CategoryKey::Entity);
        assert_eq!(series.categories.len(), 1);
        assert_eq!(series.categories[0].label, "Chad");
        assert_eq!(series.title, "Life Expectancy (2007)");
    }

    #[test]
    fn test_table_slice_projection() {
        let ds = dataset();
        let rows = table_slice(&ds, &Selection::All, REFERENCE_PERIOD).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(names, ["Chad", "Norway", "Kenya"]);
        assert_eq!(rows[1].group, "Europe");
        assert!((rows[1].gdp_per_capita - 8020.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_series() {
        let ds = dataset();
        assert_eq!(trend_series(&ds, &Selection::All).unwrap(), None);

        let trend = trend_series(&ds, &Selection::entity("Norway"))
            .unwrap()
            .unwrap();
        assert_eq!(trend.life_expectancy.points, [(2002, 79.0), (2007, 80.2)]);
        assert_eq!(trend.population.points, [(2002, 4.5e6), (2007, 4.6e6)]);
        assert_eq!(trend.lines()[2].title, "GDP Per Capita Over Time — Norway");
    }

    #[test]
    fn test_selection_options() {
        let ds = dataset();
        let options = selection_options(&ds);
        assert_eq!(options.len(), 4);
        assert_eq!(options[0], Selection::All);
        assert_eq!(options[3], Selection::entity("Kenya"));
    }

    #[test]
    fn test_nan_is_ignored_in_max() {
        let ds = Dataset::from_records(vec![
            record("Chad", "Africa", 2007, f64::NAN, 1.0e7),
            record("Kenya", "Africa", 2007, 54.1, 3.5e7),
        ])
        .unwrap();
        let kpi = kpis(&ds, &Selection::All, REFERENCE_PERIOD).unwrap();
        assert!(matches!(
            kpi,
            KpiSet::Overview { max_life_expectancy: Some(v), .. } if v == 54.1
        ));
    }
}
