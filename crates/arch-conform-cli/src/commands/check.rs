//! Check command implementation.

use anyhow::{bail, Context, Result};
use arch_conform_core::{Analyzer, CompiledUnitBox, Config, RuleKind, SymbolTable};
use arch_conform_rules::{rule_by_name, rules_from_config};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Arguments of the check command.
pub struct CheckArgs<'a> {
    /// Workspace root to analyze.
    pub path: &'a Path,
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes.
    pub rules_filter: Option<&'a str>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Symbol table directory given on the command line.
    pub symbols: Option<PathBuf>,
    /// Where the configuration comes from.
    pub source: &'a ConfigSource,
}

/// Runs the check command.
pub fn run(args: &CheckArgs<'_>) -> Result<()> {
    if !args.path.is_dir() {
        bail!("Workspace root does not exist: {}", args.path.display());
    }

    let config = load_config(args.source)?;
    let units = load_units(args.path, args.symbols.as_deref(), &config)?;

    let rules = match args.rules_filter {
        Some(filter) => filter_rules(&config, filter),
        None => rules_from_config(&config),
    };

    let mut builder = Analyzer::builder()
        .root(args.path)
        .rules(rules)
        .config(config);
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.as_str());
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules over {} symbol table(s)",
        args.path.display(),
        analyzer.rule_count(),
        units.len()
    );

    let report = analyzer.analyze_discovered(&units);

    super::output::print(&report, args.format)?;

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Loads symbol tables from the command line directory, else from
/// `analyzer.symbols` relative to the workspace root.
fn load_units(
    root: &Path,
    cli_dir: Option<&Path>,
    config: &Config,
) -> Result<BTreeMap<String, CompiledUnitBox>> {
    let dir = match (cli_dir, config.analyzer.symbols.as_deref()) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(dir)) => root.join(dir),
        (None, None) => {
            tracing::warn!("No symbol tables given; only project-level rules have input");
            return Ok(BTreeMap::new());
        }
    };

    SymbolTable::load_dir(&dir)
        .with_context(|| format!("Failed to load symbol tables from {}", dir.display()))
}

fn filter_rules(config: &Config, filter: &str) -> Vec<RuleKind> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let rule = rule_by_name(config, name);
            if rule.is_none() {
                tracing::warn!("Unknown rule: {}", name);
            }
            rule
        })
        .collect()
}
