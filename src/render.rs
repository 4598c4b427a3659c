use std::fmt::Write;

use crate::data::views::{CategoryKey, ComparisonSeries, GeoSeries, TableRow, TrendSeries};
use crate::session::{Dashboard, Panel};

// ---------------------------------------------------------------------------
// Plain-text dashboard
// ---------------------------------------------------------------------------

/// Render a refreshed dashboard for the terminal.
pub fn render_text(dash: &Dashboard) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Global Data Dashboard  [{}]", dash.selection);
    rule(&mut out);

    match &dash.kpis {
        Panel::Ready(kpis) => {
            for tile in kpis.tiles() {
                let _ = writeln!(out, "{:<24}{}", tile.label, tile.value);
            }
        }
        Panel::Placeholder(msg) => placeholder(&mut out, msg),
    }
    rule(&mut out);

    section(&mut out, &dash.geo, geo_section);
    section(&mut out, &dash.comparison, comparison_section);
    let _ = writeln!(out, "Country Data Table ({})", dash.reference_period);
    section(&mut out, &dash.table, table_section);
    section(&mut out, &dash.trend, trend_section);

    out
}

fn section<T>(out: &mut String, panel: &Panel<T>, body: fn(&mut String, &T)) {
    match panel {
        Panel::Ready(value) => body(out, value),
        Panel::Placeholder(msg) => placeholder(out, msg),
    }
    rule(out);
}

fn rule(out: &mut String) {
    let _ = writeln!(out, "{}", "─".repeat(72));
}

fn placeholder(out: &mut String, msg: &str) {
    let _ = writeln!(out, "  ℹ {msg}");
}

fn geo_section(out: &mut String, geo: &GeoSeries) {
    let frames = geo
        .points
        .iter()
        .map(|p| p.period)
        .collect::<std::collections::BTreeSet<_>>();
    let _ = writeln!(
        out,
        "{}\n  {} points across {} frames",
        geo.title,
        geo.len(),
        frames.len()
    );
}

fn comparison_section(out: &mut String, series: &ComparisonSeries) {
    let _ = writeln!(out, "{}", series.title);
    let key = match series.keyed_by {
        CategoryKey::Group => "continent",
        CategoryKey::Entity => "country",
    };
    for cat in &series.categories {
        let mean = cat
            .mean_life_expectancy()
            .map_or_else(|| "–".to_string(), |v| format!("{v:.1}"));
        let _ = writeln!(
            out,
            "  {key} {:<20} mean {:>6}  ({} rows)  {}",
            cat.label,
            mean,
            cat.rows.len(),
            cat.color
        );
    }
}

fn table_section(out: &mut String, rows: &Vec<TableRow>) {
    let _ = writeln!(
        out,
        "  {:<24} {:<10} {:>8} {:>12} {:>14}",
        "country", "continent", "lifeExp", "gdpPercap", "pop"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<24} {:<10} {:>8.1} {:>12.2} {:>14.0}",
            row.entity, row.group, row.life_expectancy, row.gdp_per_capita, row.population
        );
    }
}

fn trend_section(out: &mut String, trend: &TrendSeries) {
    for line in trend.lines() {
        let _ = writeln!(out, "{}", line.title);
        let points: Vec<String> = line
            .points
            .iter()
            .map(|(period, value)| format!("{period}: {value:.1}"))
            .collect();
        let _ = writeln!(out, "  {}", points.join(", "));
    }
}
