use std::path::Path;

use anyhow::{Context, Result};

use rusty_drill::cli::{Args, OutputFormat};
use rusty_drill::config::{Config, DEFAULT_CONFIG_FILE};
use rusty_drill::data::aggregate::selection_options;
use rusty_drill::data::loader::{FileLoader, Memoized};
use rusty_drill::render::render_text;
use rusty_drill::session::Session;

fn main() -> Result<()> {
    let args = Args::parse_args();

    if args.init_config {
        return init_config();
    }

    env_logger::init();

    let config = Config::load(args.config.as_deref())?;
    let path = args
        .data
        .clone()
        .or_else(|| config.data.path.clone())
        .context("No dataset given: pass --data FILE or set [data].path in the config")?;

    let loader = Memoized::new(FileLoader::new(path, config.columns.clone()));
    let dataset = loader.get()?;

    if args.list {
        for option in selection_options(&dataset) {
            println!("{option}");
        }
        return Ok(());
    }

    let mut session = Session::new(dataset, args.period.unwrap_or(config.view.reference_period));

    let selection = match args.country {
        Some(selection) => selection,
        None => config.view.selection.parse()?,
    };
    if let Err(e) = session.set_selection(selection) {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(2);
    }

    let dashboard = session.refresh();
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&dashboard)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&dashboard).context("serializing dashboard")?
        ),
    }

    Ok(())
}

/// Handle --init-config: write a default rusty-drill.toml.
fn init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    if path.exists() {
        anyhow::bail!("{DEFAULT_CONFIG_FILE} already exists. Remove it first or edit it manually.");
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {DEFAULT_CONFIG_FILE}"))?;
    println!("Created {DEFAULT_CONFIG_FILE} with default settings.");
    Ok(())
}
