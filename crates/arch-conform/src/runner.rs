//! Runner for `cargo test` integration.
//!
//! ```rust,ignore
//! // tests/architecture.rs
//! #[test]
//! fn architecture_conforms() {
//!     arch_conform::run_check(None, None);
//! }
//! ```

use arch_conform_core::{Analyzer, CompiledUnitBox, Config, Severity, SymbolTable};
use arch_conform_rules::rules_from_config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Config file names to search for, in priority order.
pub const CONFIG_CANDIDATES: &[&str] = &["arch-conform.toml", ".arch-conform.toml"];

/// Runs a conformance pass as part of `cargo test`.
///
/// The workspace root is the nearest directory, from `CARGO_MANIFEST_DIR`
/// upwards, holding a config file or a workspace descriptor. Symbol tables
/// are read from `analyzer.symbols` when configured; without them only the
/// project-level rules have input.
///
/// # Panics
///
/// Panics with a formatted report if violations at or above `fail_on` are
/// found, or if the config or the symbol tables cannot be loaded.
pub fn run_check(config_path: Option<&str>, fail_on: Option<&str>) {
    let base = find_workspace_root();
    let config = load_config(&base, config_path);
    let effective_fail_on = resolve_fail_on(fail_on, &config);

    let root = base.join(&config.analyzer.root);
    let units = load_units(&root, &config);

    let analyzer = Analyzer::builder()
        .root(&root)
        .rules(rules_from_config(&config))
        .config(config)
        .build()
        .unwrap_or_else(|e| panic!("arch-conform: failed to build analyzer: {e}"));

    let report = analyzer.analyze_discovered(&units);

    if report.has_violations_at(effective_fail_on) {
        panic!("{}", report.format_test_report(effective_fail_on));
    }
}

/// Loads the config from an explicit path, a candidate file, or defaults.
fn load_config(root: &Path, explicit_path: Option<&str>) -> Config {
    let path = match explicit_path {
        Some(path) if Path::new(path).is_absolute() => Some(PathBuf::from(path)),
        Some(path) => Some(root.join(path)),
        None => CONFIG_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.is_file()),
    };

    match path {
        Some(path) => Config::from_file(&path)
            .unwrap_or_else(|e| panic!("arch-conform: failed to load config: {e}")),
        None => Config::default(),
    }
}

fn load_units(root: &Path, config: &Config) -> BTreeMap<String, CompiledUnitBox> {
    let Some(dir) = config.analyzer.symbols.as_ref() else {
        tracing::debug!("No symbol tables configured, running project rules only");
        return BTreeMap::new();
    };
    SymbolTable::load_dir(&root.join(dir)).unwrap_or_else(|e| {
        panic!(
            "arch-conform: failed to load symbol tables from {}: {e}",
            dir.display()
        )
    })
}

/// Whether `dir` holds a config file or a workspace descriptor.
fn is_workspace_root(dir: &Path) -> bool {
    if CONFIG_CANDIDATES.iter().any(|c| dir.join(c).is_file()) {
        return true;
    }
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries.filter_map(Result::ok).any(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == arch_conform_core::topology::DESCRIPTOR_EXTENSION)
        })
    })
}

/// Finds the workspace root, walking up from `CARGO_MANIFEST_DIR`.
fn find_workspace_root() -> PathBuf {
    let start = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .or_else(|_| std::env::current_dir())
        .unwrap_or_else(|_| PathBuf::from("."));

    start
        .ancestors()
        .find(|dir| is_workspace_root(dir))
        .map_or_else(|| start.clone(), Path::to_path_buf)
}

/// Resolves the effective `fail_on` severity.
///
/// Priority: explicit argument > config file > default ("error").
fn resolve_fail_on(arg: Option<&str>, config: &Config) -> Severity {
    let Some(name) = arg else {
        return config.fail_on_severity();
    };
    Severity::parse(name).unwrap_or_else(|| {
        panic!("arch-conform: unknown severity `{name}`. Valid values: error, warning, info")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fail_on_defaults_to_error() {
        let config = Config::default();
        assert_eq!(resolve_fail_on(None, &config), Severity::Error);
    }

    #[test]
    fn resolve_fail_on_from_config() {
        let mut config = Config::default();
        config.fail_on = Some("warning".to_string());
        assert_eq!(resolve_fail_on(None, &config), Severity::Warning);
    }

    #[test]
    fn resolve_fail_on_argument_overrides_config() {
        let mut config = Config::default();
        config.fail_on = Some("info".to_string());
        assert_eq!(resolve_fail_on(Some("error"), &config), Severity::Error);
    }

    #[test]
    #[should_panic(expected = "unknown severity")]
    fn resolve_fail_on_invalid_panics() {
        resolve_fail_on(Some("critical"), &Config::default());
    }

    #[test]
    fn load_config_prefers_first_candidate() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("arch-conform.toml"), "fail_on = \"warning\"\n")
            .expect("write");
        std::fs::write(dir.path().join(".arch-conform.toml"), "fail_on = \"info\"\n")
            .expect("write");

        let config = load_config(dir.path(), None);
        assert_eq!(config.fail_on_severity(), Severity::Warning);
    }

    #[test]
    fn load_config_defaults_without_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(dir.path(), None);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn descriptor_marks_workspace_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!is_workspace_root(dir.path()));
        std::fs::write(dir.path().join("Backend.sln"), "").expect("write");
        assert!(is_workspace_root(dir.path()));
    }
}
