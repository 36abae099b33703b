//! Context types for rule execution.

use crate::layer::Layer;
use crate::manifest::{discover_manifests, ProjectManifest};
use crate::symbols::{CompiledUnit, SymbolModel};
use crate::topology::Topology;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Immutable snapshot of the workspace shared by every rule of a pass.
///
/// Manifests and the topology are read once, before any rule runs.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceContext {
    /// Workspace root directory.
    pub root: PathBuf,
    /// Projects of the pass (the compiled units' names), sorted.
    pub projects: Vec<String>,
    /// Manifests of the projects that have one.
    pub manifests: BTreeMap<String, ProjectManifest>,
    /// Folder tree, if the workspace has a descriptor.
    pub topology: Option<Topology>,
}

impl WorkspaceContext {
    /// Loads the snapshot for the given projects.
    ///
    /// Projects without a manifest on disk simply have none; a missing
    /// descriptor leaves `topology` empty.
    #[must_use]
    pub fn load<I, S>(root: &Path, projects: I, exclude: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let discovered = discover_manifests(root, exclude);
        Self::from_discovered(root, projects.into_iter().map(Into::into).collect(), &discovered)
    }

    /// Loads the snapshot for every manifest under `root` plus `extra` projects.
    #[must_use]
    pub fn discover<I, S>(root: &Path, extra: I, exclude: &[String]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let discovered = discover_manifests(root, exclude);
        let projects = discovered
            .keys()
            .cloned()
            .chain(extra.into_iter().map(Into::into))
            .collect();
        Self::from_discovered(root, projects, &discovered)
    }

    fn from_discovered(
        root: &Path,
        mut projects: Vec<String>,
        discovered: &BTreeMap<String, PathBuf>,
    ) -> Self {
        projects.sort();
        projects.dedup();

        let manifests: BTreeMap<String, ProjectManifest> = projects
            .iter()
            .filter_map(|name| discovered.get(name))
            .map(|path| ProjectManifest::read(path))
            .map(|m| (m.name.clone(), m))
            .collect();

        debug!(
            "Workspace snapshot: {} projects, {} manifests",
            projects.len(),
            manifests.len()
        );

        Self {
            root: root.to_path_buf(),
            projects,
            manifests,
            topology: Topology::read(root),
        }
    }

    /// Builds a snapshot from already-read parts.
    #[must_use]
    pub fn from_parts(
        root: impl Into<PathBuf>,
        manifests: Vec<ProjectManifest>,
        topology: Option<Topology>,
    ) -> Self {
        let manifests: BTreeMap<String, ProjectManifest> = manifests
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();
        Self {
            root: root.into(),
            projects: manifests.keys().cloned().collect(),
            manifests,
            topology,
        }
    }

    /// Returns the manifest of a project.
    #[must_use]
    pub fn manifest(&self, project: &str) -> Option<&ProjectManifest> {
        self.manifests.get(project)
    }

    /// Iterates over the manifests of the pass's projects.
    pub fn project_manifests(&self) -> impl Iterator<Item = &ProjectManifest> {
        self.projects.iter().filter_map(|p| self.manifests.get(p))
    }
}

/// Context provided to type-level rules: one compiled project.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext<'a> {
    /// Project name.
    pub project: &'a str,
    /// Layer of the project.
    pub layer: Layer,
    /// Bounded-context prefix of the project, if any.
    pub bounded_context: Option<&'a str>,
    /// Symbol queries over the project's types.
    pub symbols: SymbolModel<'a>,
    /// The shared workspace snapshot.
    pub workspace: &'a WorkspaceContext,
}

impl<'a> UnitContext<'a> {
    /// Creates the context for one compiled unit.
    #[must_use]
    pub fn new(project: &'a str, unit: &'a dyn CompiledUnit, workspace: &'a WorkspaceContext) -> Self {
        Self {
            project,
            layer: Layer::classify(project),
            bounded_context: Layer::bc_prefix(project),
            symbols: SymbolModel::new(unit),
            workspace,
        }
    }

    /// The project's root namespace (the project name).
    #[must_use]
    pub fn root_namespace(&self) -> &'a str {
        self.project
    }

    /// A namespace directly below the root namespace.
    #[must_use]
    pub fn sub_namespace(&self, segment: &str) -> String {
        format!("{}.{segment}", self.project)
    }

    /// Manifest path of the project, when known.
    #[must_use]
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.workspace.manifest(self.project).map(|m| m.path.clone())
    }
}
