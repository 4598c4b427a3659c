//! Command-line interface argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::data::model::Selection;

/// rusty-drill - country drill-down over demographic data
///
/// Loads a gapminder-style table and prints the KPI tiles, map series,
/// bar chart, data table and trend lines for one selection.
///
/// Examples:
///   rusty-drill --data gapminder.csv
///   rusty-drill --data gapminder.parquet --country Norway
///   rusty-drill --data gapminder.json --country Chad --format json
///   rusty-drill --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset file (.csv, .json, .parquet). Overrides [data].path in the config.
    #[arg(short, long, value_name = "FILE", env = "RUSTY_DRILL_DATA")]
    pub data: Option<PathBuf>,

    /// Country to drill into, or "All"
    #[arg(short, long, value_name = "NAME")]
    pub country: Option<Selection>,

    /// Reference year for KPIs, bar chart and table
    #[arg(short, long, value_name = "YEAR")]
    pub period: Option<i32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Configuration file (defaults to ./rusty-drill.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List the selectable countries and exit
    #[arg(long)]
    pub list: bool,

    /// Write a default rusty-drill.toml and exit
    #[arg(long)]
    pub init_config: bool,
}

/// How the dashboard is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_country_and_period() {
        let args = Args::try_parse_from([
            "rusty-drill",
            "--data",
            "gapminder.csv",
            "--country",
            "New Zealand",
            "--period",
            "2002",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.data, Some(PathBuf::from("gapminder.csv")));
        assert_eq!(args.country, Some(Selection::entity("New Zealand")));
        assert_eq!(args.period, Some(2002));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_all_selection_and_defaults() {
        let args = Args::try_parse_from(["rusty-drill", "-c", "All"]).unwrap();
        assert_eq!(args.country, Some(Selection::All));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.list);
    }

    #[test]
    fn test_bad_period_rejected() {
        assert!(Args::try_parse_from(["rusty-drill", "--period", "recent"]).is_err());
    }
}
