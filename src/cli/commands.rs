//! Command dispatch: turns parsed arguments into service calls and output.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, SearchOutcome, SearchQuery};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{BreedingNode, DomainError};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "breedpath", &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => config_command(cli, command),
        Commands::Search {
            start,
            goal,
            max_depth,
        } => search(cli, start, goal, *max_depth),
        Commands::Add {
            first_parent,
            second_parent,
            child,
        } => add(cli, first_parent, second_parent, child),
        Commands::Check => check(cli),
        Commands::Names => names(cli),
        Commands::Recipes { name } => recipes(cli, name),
    }
}

fn config_dir(cli: &Cli) -> Option<PathBuf> {
    cli.config_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
}

/// Layered settings with command-line flags on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(config_dir(cli).as_deref())?;
    if let Some(file) = &cli.file {
        settings.catalog_file = Some(file.clone());
    }
    if cli.strict {
        settings.strict = true;
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<(ServiceContainer, PathBuf)> {
    let settings = load_settings(cli)?;
    let path = settings
        .catalog_file
        .clone()
        .ok_or(ApplicationError::NoCatalog)?;
    Ok((ServiceContainer::new(settings), path))
}

#[instrument(skip(cli))]
fn search(cli: &Cli, start: &str, goal: &str, max_depth: Option<usize>) -> CliResult<()> {
    let (container, path) = container(cli)?;
    let query = SearchQuery::new(start, goal)
        .with_max_depth(max_depth.unwrap_or(container.settings.max_depth));

    let outcome = container.catalog.search(&path, &query)?;
    for line in outcome_lines(&outcome) {
        output::info(&line);
    }
    Ok(())
}

/// Numbered rendering of every path, or a single "not found" line.
pub fn outcome_lines(outcome: &SearchOutcome) -> Vec<String> {
    if outcome.is_empty() {
        return vec![format!(
            "no breeding path found from {} to {} within {} steps",
            outcome.query.start, outcome.query.goal, outcome.query.max_depth
        )];
    }
    let mut lines = Vec::new();
    for (i, path) in outcome.paths.iter().enumerate() {
        lines.push(format!("Path {}", i + 1));
        for (n, step) in path.iter().enumerate() {
            lines.push(format!("{}) {}", n + 1, step));
        }
        lines.push(String::new());
    }
    lines
}

#[instrument(skip(cli))]
fn add(cli: &Cli, first_parent: &str, second_parent: &str, child: &str) -> CliResult<()> {
    let (container, path) = container(cli)?;
    let record = container
        .catalog
        .formula(first_parent, second_parent, child)?;

    match container.catalog.append(&path, &record) {
        Ok(catalog) => {
            output::success(&format!(
                "added {} ({} formulas)",
                record,
                catalog.records.len()
            ));
            Ok(())
        }
        Err(e) => {
            if e.domain().is_some() {
                output::warning(&format!(
                    "{} was appended to {} but the catalog no longer loads; fix the file before searching",
                    record,
                    path.display()
                ));
            }
            Err(e.into())
        }
    }
}

#[instrument(skip(cli))]
fn check(cli: &Cli) -> CliResult<()> {
    let (container, path) = container(cli)?;
    let catalog = container.catalog.load(&path)?;

    output::action(
        "Loaded",
        &format!(
            "{}: {} formulas, {} entities, {} nodes, {} edges",
            path.display(),
            catalog.records.len(),
            catalog.names.len(),
            catalog.graph.len(),
            catalog.graph.edge_count()
        ),
    );
    if catalog.report.is_clean() {
        output::success("no skipped or duplicate lines");
        return Ok(());
    }
    if !catalog.report.skipped.is_empty() {
        output::header("Skipped lines");
        for skipped in &catalog.report.skipped {
            output::failure(&format!("line {}: {:?}", skipped.line, skipped.content));
        }
    }
    if !catalog.report.collapsed.is_empty() {
        output::header("Duplicate lines");
        for dup in &catalog.report.collapsed {
            output::detail(&format!(
                "line {} repeats line {}",
                dup.line, dup.duplicate_of
            ));
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn names(cli: &Cli) -> CliResult<()> {
    let (container, path) = container(cli)?;
    let catalog = container.catalog.load(&path)?;
    for name in catalog.names.iter() {
        output::info(name);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn recipes(cli: &Cli, name: &str) -> CliResult<()> {
    let (container, path) = container(cli)?;
    let catalog = container.catalog.load(&path)?;
    let node = catalog
        .graph
        .get(name.trim())
        .ok_or_else(|| ApplicationError::from(DomainError::UnknownEntityName(name.to_string())))?;

    if node.is_leaf() {
        output::info(&format!("{} is never a parent", node.name));
        return Ok(());
    }
    output::info(&recipe_tree(node));
    Ok(())
}

/// A node and its outgoing recipes as a tree.
pub fn recipe_tree(node: &BreedingNode) -> Tree<String> {
    Tree::new(node.name.clone()).with_leaves(
        node.edges
            .iter()
            .map(|edge| format!("+ {} = {}", edge.spouse, edge.child)),
    )
}

fn config_command(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let global = global_config_path();
            match &global {
                Some(p) => output::action("global", &marked(p)),
                None => output::action("global", "(no config directory)"),
            }
            if let Some(dir) = config_dir(cli) {
                output::action("local", &marked(&local_config_path(&dir)));
            }
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine the global config directory".to_string())
                })?
            } else {
                let dir = config_dir(cli).ok_or_else(|| {
                    CliError::Usage("cannot determine the current directory".to_string())
                })?;
                local_config_path(&dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

fn marked(path: &std::path::Path) -> String {
    let state = if path.exists() { "exists" } else { "missing" };
    format!("{} ({})", path.display(), state)
}
