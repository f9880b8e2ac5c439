//! Command dispatch
//!
//! Loads settings and data, runs one subcommand and prints its result.

use std::io;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::PricingGrid;
use crate::application::{ClassificationSession, CollapseSet, VersionCatalog};
use crate::cli::args::{Cli, Commands, CompareArgs, ConfigCommands};
use crate::cli::output;
use crate::cli::view::TreeNodeConvert;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{
    duration_text, mask_to_ranges, nights, price_text, reconstruct, scan, DisplayNode, PricingTable,
};
use crate::infrastructure::traits::RealFileSystem;
use crate::infrastructure::{DataLoader, InfraError};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    debug!(data_dir = %settings.data_dir.display(), "settings loaded");

    match &cli.command {
        Commands::Tree {
            at,
            file,
            start,
            collapse,
            reveal,
            json,
        } => {
            let start = start.unwrap_or(settings.tree.start_node);
            let view = TreeRequest {
                start,
                collapse,
                reveal: reveal.as_deref(),
                json: *json,
            };
            match file {
                Some(path) => cmd_tree_file(&settings, path, &view),
                None => cmd_tree(&settings, *at, &view),
            }
        }
        Commands::Price {
            root,
            ghs,
            duration,
            at,
            compare,
        } => cmd_price(&settings, root, *ghs, *duration, *at, compare),
        Commands::Grid {
            root,
            at,
            compare,
            max_duration,
            json,
        } => cmd_grid(&settings, root, *at, compare, *max_duration, *json),
        Commands::Ranges { mask } => {
            output::info(&mask_to_ranges(*mask));
            Ok(())
        }
        Commands::Links { text, json } => cmd_links(text, *json),
        Commands::Versions => cmd_versions(&settings),
        Commands::Config { command } => cmd_config(&settings, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

struct TreeRequest<'a> {
    start: usize,
    collapse: &'a [String],
    reveal: Option<&'a str>,
    json: bool,
}

fn loader(settings: &Settings) -> DataLoader {
    DataLoader::new(Arc::new(RealFileSystem), settings.data_dir.clone())
}

fn load_catalog(settings: &Settings) -> CliResult<VersionCatalog> {
    let catalog = loader(settings).load_catalog()?;
    if catalog.is_empty() {
        output::warning(&format!("no versions found in {}", settings.data_dir.display()));
    }
    Ok(catalog)
}

/// Selected version, or the latest one.
fn select(catalog: &VersionCatalog, at: Option<NaiveDate>) -> CliResult<&ClassificationSession> {
    match at {
        Some(date) => Ok(catalog.get(date)?),
        None => catalog
            .latest()
            .ok_or_else(|| CliError::InvalidArgs("no version available".into())),
    }
}

/// Version to compare against, if any.
fn comparison<'a>(
    catalog: &'a VersionCatalog,
    current: &ClassificationSession,
    compare: &CompareArgs,
) -> CliResult<Option<&'a ClassificationSession>> {
    if let Some(date) = compare.compare {
        return Ok(Some(catalog.get(date)?));
    }
    if compare.previous {
        let previous = catalog.neighbour(current.version(), -1)?;
        if previous.is_none() {
            output::warning(&format!("{} is the oldest version", current.info().label()));
        }
        return Ok(previous);
    }
    Ok(None)
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| InfraError::Json {
        context: "serializing output".into(),
        source: e,
    })?;
    output::info(&text);
    Ok(())
}

fn print_forest(forest: &[DisplayNode], version: NaiveDate, request: &TreeRequest) -> CliResult<()> {
    if request.json {
        return print_json(&forest);
    }
    let collapse = CollapseSet::new();
    for id in request.collapse {
        collapse.collapse(version, id);
    }
    if let Some(id) = request.reveal {
        if !collapse.reveal(version, forest, id) {
            output::warning(&format!("node {} not found", id));
        }
    }
    for node in forest {
        output::info(&node.to_collapsed_tree(version, &collapse));
    }
    Ok(())
}

#[instrument(skip(settings, request), fields(start = request.start))]
fn cmd_tree(settings: &Settings, at: Option<NaiveDate>, request: &TreeRequest) -> CliResult<()> {
    let catalog = load_catalog(settings)?;
    let session = select(&catalog, at)?;
    let forest = if session.nodes().is_empty() {
        Vec::new()
    } else {
        session.subtree(request.start)?
    };
    print_forest(&forest, session.version(), request)
}

#[instrument(skip(settings, request), fields(start = request.start))]
fn cmd_tree_file(settings: &Settings, path: &Path, request: &TreeRequest) -> CliResult<()> {
    let store = loader(settings).load_tree(path)?;
    let forest = if store.is_empty() {
        Vec::new()
    } else {
        reconstruct(&store, request.start, &[])?
    };
    print_forest(&forest, NaiveDate::MIN, request)
}

#[instrument(skip(settings, compare))]
fn cmd_price(
    settings: &Settings,
    root: &str,
    ghs: u32,
    duration: i64,
    at: Option<NaiveDate>,
    compare: &CompareArgs,
) -> CliResult<()> {
    let duration = nights(duration)?;
    let catalog = load_catalog(settings)?;
    let session = select(&catalog, at)?;
    let entry = session.entry(root, ghs)?;

    output::header(&format!(
        "{} GHS {} ({}) - {}",
        session.info().label(),
        ghs,
        entry.ghm,
        duration_text(duration)
    ));
    match comparison(&catalog, session, compare)? {
        None => match session.price(root, ghs, duration)? {
            Some(price) => output::detail(&format!("{} € ({:?})", price_text(price.cents), price.band)),
            None => output::detail(&"no tariff for this duration"),
        },
        Some(previous) => match session.delta(previous, root, ghs, duration)? {
            Some(delta) => output::detail(&format!(
                "{} € ({:?} since {})",
                price_text(delta.cents),
                delta.band,
                previous.info().label()
            )),
            None => output::detail(&"no tariff in either version"),
        },
    }
    Ok(())
}

#[instrument(skip(settings, compare))]
fn cmd_grid(
    settings: &Settings,
    root: &str,
    at: Option<NaiveDate>,
    compare: &CompareArgs,
    max_duration: Option<u32>,
    json: bool,
) -> CliResult<()> {
    let catalog = load_catalog(settings)?;
    let session = select(&catalog, at)?;
    let table = session.pricing_table(root)?;
    // a root missing from the compared version shows every GHS as added
    let previous = comparison(&catalog, session, compare)?.map(|s| {
        s.pricing_table(root)
            .cloned()
            .unwrap_or_else(|_| PricingTable::new(root, Vec::new()))
    });
    let grid = PricingGrid::build(
        table,
        previous.as_ref(),
        max_duration.unwrap_or(settings.pricing.max_duration),
        settings.pricing.merge_cells,
    );
    if json {
        return print_json(&grid);
    }

    output::header(&format!("{} {}", session.info().label(), grid.ghm_root));
    for row in &grid.header {
        let cells = row
            .cells
            .iter()
            .map(|c| match c.colspan {
                1 => c.text.clone(),
                n => format!("{} (x{})", c.text, n),
            })
            .join(" | ");
        output::detail(&format!("{:<14} {}", row.name, cells));
    }
    for row in &grid.rows {
        let cells = row
            .cells
            .iter()
            .map(|cell| match cell {
                Some(c) if c.warn => format!("{}!", output::amount(&c.text, c.band)),
                Some(c) => output::amount(&c.text, c.band).to_string(),
                None => "-".to_string(),
            })
            .join(" | ");
        output::detail(&format!("{:<14} {}", row.label, cells));
    }
    Ok(())
}

fn cmd_links(text: &str, json: bool) -> CliResult<()> {
    let segments = scan(text);
    if json {
        return print_json(&segments);
    }
    output::info(&output::segments(&segments));
    for token in segments.iter().filter_map(|s| s.token()) {
        output::detail(&format!("{:?} {}", token.kind, token.id));
    }
    Ok(())
}

fn cmd_versions(settings: &Settings) -> CliResult<()> {
    let catalog = load_catalog(settings)?;
    for session in catalog.versions() {
        let info = session.info();
        let marker = if info.changed_prices { " *" } else { "" };
        output::info(&format!(
            "{}{}  ({} nodes, {} GHM roots)",
            info.label(),
            marker,
            session.nodes().len(),
            session.ghm_roots().count()
        ));
    }
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning(&"no home directory, global config disabled"),
        },
    }
    Ok(())
}
