//! # arch-conform
//!
//! Architecture conformance checker for layered, bounded-context .NET
//! workspaces.
//!
//! This is the main facade crate that re-exports the core framework and the
//! rule catalog.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use arch_conform::SymbolTable;
//!
//! let units = SymbolTable::load_dir("artifacts/symbols".as_ref())?;
//! for result in arch_conform::analyze(&units, "./backend".as_ref()) {
//!     for violation in result.violations() {
//!         println!("{violation}");
//!     }
//! }
//! ```
//!
//! ## `cargo test` Integration
//!
//! ```rust,ignore
//! #[test]
//! fn architecture_conforms() {
//!     arch_conform::run_check(None, None);
//! }
//! ```
//!
//! Configure via `arch-conform.toml`.

#![forbid(unsafe_code)]

// Re-export core types and traits
pub use arch_conform_core::*;

/// Built-in rules and presets.
pub mod rules {
    pub use arch_conform_rules::*;
}

mod runner;

pub use runner::{run_check, CONFIG_CANDIDATES};

use std::collections::BTreeMap;
use std::path::Path;

/// Runs the whole rule catalog over the compiled projects of a workspace.
///
/// The pass covers exactly the projects in `compilations`. Manifests and the
/// workspace descriptor are read from `workspace_root`; when they are missing
/// the rules depending on them produce nothing. Result order is unspecified.
#[must_use]
pub fn analyze<U>(compilations: &BTreeMap<String, U>, workspace_root: &Path) -> Vec<RuleAnalysisResult>
where
    U: AsRef<dyn CompiledUnit> + Sync,
{
    let config = Config::default();
    let rules = arch_conform_rules::rules_from_config(&config);
    match Analyzer::builder()
        .root(workspace_root)
        .config(config)
        .rules(rules)
        .build()
    {
        Ok(analyzer) => analyzer.analyze(compilations).results,
        Err(e) => {
            tracing::warn!("Cannot resolve workspace root {}: {e}", workspace_root.display());
            Vec::new()
        }
    }
}
