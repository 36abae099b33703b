//! Configuration file resolution with global fallback.
//!
//! The first hit wins:
//!
//! 1. `--config` flag (explicit path, trusted as-is)
//! 2. `arch-conform.toml` or `.arch-conform.toml` in the checked directory or
//!    one of its parents, stopping at the directory holding the `.sln`
//!    workspace descriptor
//! 3. `~/.arch-conform/config.toml` (global fallback)
//! 4. Defaults

use arch_conform_core::topology::DESCRIPTOR_EXTENSION;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the workspace.
    Workspace(PathBuf),
    /// Loaded from the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Workspace(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config came from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const WORKSPACE_CONFIG_NAMES: &[&str] = &["arch-conform.toml", ".arch-conform.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration for a check of `workspace_dir`.
#[must_use]
pub fn resolve(workspace_dir: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_inner(workspace_dir, explicit, global_config_dir())
}

fn resolve_inner(
    workspace_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for dir in workspace_dir.ancestors() {
        if let Some(found) = WORKSPACE_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            tracing::debug!("Found workspace config: {}", found.display());
            return ConfigSource::Workspace(found);
        }
        if holds_descriptor(dir) {
            break;
        }
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!("Found global config: {}", found.display());
            ConfigSource::Global(found)
        })
}

fn holds_descriptor(dir: &Path) -> bool {
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .filter_map(Result::ok)
            .any(|e| e.path().extension().is_some_and(|ext| ext == DESCRIPTOR_EXTENSION))
    })
}

/// Returns the global config directory.
///
/// `$ARCH_CONFORM_CONFIG_DIR` when set, else `~/.arch-conform/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("ARCH_CONFORM_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".arch-conform"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// `<tmp>/repo/Backend.sln` with the checked directory `<tmp>/repo/src`.
    fn nested_workspace() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let repo = tmp.path().join("repo");
        let src = repo.join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(repo.join("Backend.sln"), "").unwrap();
        (tmp, src)
    }

    #[test]
    fn explicit_wins_without_existence_check() {
        let (_tmp, src) = nested_workspace();
        fs::write(src.join("arch-conform.toml"), "").unwrap();

        let result = resolve_inner(&src, Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(result, ConfigSource::Explicit(PathBuf::from("/nonexistent.toml")));
    }

    #[test]
    fn config_in_checked_directory() {
        let (_tmp, src) = nested_workspace();
        fs::write(src.join(".arch-conform.toml"), "").unwrap();

        let result = resolve_inner(&src, None, None);
        assert_eq!(result, ConfigSource::Workspace(src.join(".arch-conform.toml")));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let (_tmp, src) = nested_workspace();
        fs::write(src.join("arch-conform.toml"), "").unwrap();
        fs::write(src.join(".arch-conform.toml"), "").unwrap();

        let result = resolve_inner(&src, None, None);
        assert_eq!(result, ConfigSource::Workspace(src.join("arch-conform.toml")));
    }

    #[test]
    fn config_next_to_descriptor_found_from_subdirectory() {
        let (_tmp, src) = nested_workspace();
        let repo = src.parent().unwrap().to_path_buf();
        fs::write(repo.join("arch-conform.toml"), "").unwrap();

        let result = resolve_inner(&src, None, None);
        assert_eq!(result, ConfigSource::Workspace(repo.join("arch-conform.toml")));
    }

    #[test]
    fn search_stops_at_descriptor_directory() {
        let (tmp, src) = nested_workspace();
        fs::write(tmp.path().join("arch-conform.toml"), "").unwrap();

        let result = resolve_inner(&src, None, None);
        assert_eq!(result, ConfigSource::Default);
    }

    #[test]
    fn global_fallback_when_workspace_has_none() {
        let (_tmp, src) = nested_workspace();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(&src, None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Global(global.path().join("config.toml")));
        assert!(result.is_global());
    }

    #[test]
    fn empty_global_dir_means_defaults() {
        let (_tmp, src) = nested_workspace();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(&src, None, Some(global.path().to_path_buf()));
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
    }
}
