//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# arch-conform configuration

# Lowest severity that fails `arch_conform::run_check` (error, warning, info)
# fail_on = "error"

[analyzer]
# Workspace root holding the .sln descriptor (default: current directory)
# root = "./backend"

# Glob patterns excluded from manifest discovery
exclude = [
    "**/bin/**",
    "**/obj/**",
]

# Directory of <Project>.symbols.json tables, relative to the root
# symbols = "artifacts/symbols"

# Run rules in parallel
parallel = true

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.layer-direction]
enabled = true
# severity = "warning"  # Override default severity
exempt_prefixes = ["Shared.BuildingBlocks"]

[rules.zero-external-dependency]
enabled = true
shared_prefixes = ["Shared.BuildingBlocks"]

# [rules.technology-marker-interface]
# markers_namespace = "Markers"
# root_marker = "ITechnologyMarker"

# [rules.sealed-technology-implementation]
# base_class = "TechnologyBase"
# root_marker = "ITechnologyMarker"

# [rules.data-namespace-completeness]
# base_class = "DataModelBase"
# namespaces = ["DataModels", "Factories", "Repositories"]

# [rules.bidirectional-factory]
# base_class = "DataModelBase"

# [rules.exclusive-registration-entry-point]
# entry_point = "DependencyInjection"
# container_type = "IServiceCollection"

[rules.workspace-placement]
enabled = true
# source_root = "src"
# require_bounded_context_folder = true
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("arch-conform.toml");
    write_config(config_path, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point analyzer.symbols at the exported symbol tables");
    println!("  2. Run: arch-conform check");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_conform_core::Config;

    #[test]
    fn template_parses_as_config() {
        let config = Config::parse(DEFAULT_CONFIG).unwrap();
        assert!(config.is_rule_enabled("layer-direction"));
        assert!(config.analyzer.parallel);
        assert_eq!(
            config
                .rule("layer-direction")
                .and_then(|r| r.get_str_array("exempt_prefixes")),
            Some(vec!["Shared.BuildingBlocks".to_string()])
        );
    }

    #[test]
    fn existing_config_needs_force() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("arch-conform.toml");
        std::fs::write(&path, "# mine").unwrap();

        assert!(write_config(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        write_config(&path, true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
