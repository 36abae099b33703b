//! Workspace topology: the solution descriptor (`*.sln`) folder tree.
//!
//! The descriptor lists every folder and project with an identifier, plus a
//! `NestedProjects` section mapping child identifiers to parent identifiers.
//! The tree is kept as that child -> parent index; navigation walks it
//! upwards on demand.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// File extension of the workspace descriptor.
pub const DESCRIPTOR_EXTENSION: &str = "sln";

/// Project type GUID of solution folders.
pub const FOLDER_TYPE_GUID: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

static PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*Project\("\{([0-9A-Fa-f-]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{([0-9A-Fa-f-]+)\}""#,
    )
    .unwrap_or_else(|_| panic!("Invalid Regex"))
});
static NESTING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\{([0-9A-Fa-f-]+)\}\s*=\s*\{([0-9A-Fa-f-]+)\}\s*$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Kind of a descriptor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A solution folder.
    Folder,
    /// A buildable project.
    Project,
}

/// A folder or project entry of the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceNode {
    /// Identifier (upper-cased GUID).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Folder or project.
    pub kind: NodeKind,
    /// Relative path as written in the descriptor, with `/` separators.
    pub path: String,
}

/// Where a project sits in the folder tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The project is not listed in the descriptor.
    NotFound,
    /// The project is listed but has no parent folder.
    Orphaned,
    /// Ancestor folder names, nearest first.
    Nested(Vec<String>),
}

/// Parsed workspace descriptor.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// Descriptor file.
    pub path: PathBuf,
    nodes: HashMap<String, WorkspaceNode>,
    parents: HashMap<String, String>,
    projects: HashMap<String, String>,
}

impl Topology {
    /// Reads the descriptor at the workspace root.
    ///
    /// Returns `None` when the root holds no descriptor or it cannot be read;
    /// topology-dependent rules are then simply not applicable.
    #[must_use]
    pub fn read(root: &Path) -> Option<Self> {
        let path = find_descriptor(root)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let mut topology = Self::parse(&content);
                debug!(
                    "Loaded topology {} with {} nodes",
                    path.display(),
                    topology.nodes.len()
                );
                topology.path = path;
                Some(topology)
            }
            Err(e) => {
                warn!("Cannot read workspace descriptor {}: {e}", path.display());
                None
            }
        }
    }

    /// Parses descriptor text. Unrecognized lines are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut topology = Self::default();
        let mut in_nesting = false;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("GlobalSection(NestedProjects)") {
                in_nesting = true;
                continue;
            }
            if trimmed.starts_with("EndGlobalSection") {
                in_nesting = false;
                continue;
            }

            if in_nesting {
                if let Some(caps) = NESTING_RE.captures(line) {
                    topology
                        .parents
                        .insert(caps[1].to_ascii_uppercase(), caps[2].to_ascii_uppercase());
                }
                continue;
            }

            if let Some(caps) = PROJECT_RE.captures(line) {
                let kind = if caps[1].eq_ignore_ascii_case(FOLDER_TYPE_GUID) {
                    NodeKind::Folder
                } else {
                    NodeKind::Project
                };
                let node = WorkspaceNode {
                    id: caps[4].to_ascii_uppercase(),
                    name: caps[2].to_string(),
                    kind,
                    path: caps[3].replace('\\', "/"),
                };
                if kind == NodeKind::Project {
                    topology
                        .projects
                        .entry(node.name.clone())
                        .or_insert_with(|| node.id.clone());
                }
                topology.nodes.insert(node.id.clone(), node);
            }
        }

        topology
    }

    /// Looks up a project entry by name.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&WorkspaceNode> {
        self.projects.get(name).and_then(|id| self.nodes.get(id))
    }

    /// Returns the parent node of a node.
    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&WorkspaceNode> {
        self.parents.get(id).and_then(|pid| self.nodes.get(pid))
    }

    /// Returns where a project sits in the folder tree.
    #[must_use]
    pub fn placement(&self, project: &str) -> Placement {
        let Some(node) = self.project(project) else {
            return Placement::NotFound;
        };

        let mut chain = Vec::new();
        let mut seen = HashSet::from([node.id.as_str()]);
        let mut current = node;
        while let Some(parent) = self.parent(&current.id) {
            if !seen.insert(parent.id.as_str()) {
                warn!("Nesting cycle at {} in workspace descriptor", parent.name);
                break;
            }
            chain.push(parent.name.clone());
            current = parent;
        }

        if chain.is_empty() {
            Placement::Orphaned
        } else {
            Placement::Nested(chain)
        }
    }

    /// Ancestor folder names of a project, nearest first.
    ///
    /// `None` if the project is not in the descriptor; an empty chain means
    /// the project is orphaned.
    #[must_use]
    pub fn ancestors(&self, project: &str) -> Option<Vec<String>> {
        match self.placement(project) {
            Placement::NotFound => None,
            Placement::Orphaned => Some(Vec::new()),
            Placement::Nested(chain) => Some(chain),
        }
    }

    /// Iterates over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &WorkspaceNode> {
        self.nodes.values()
    }

    /// Number of project entries.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}

impl WorkspaceNode {
    /// Returns true when the entry's path starts with the given segment.
    #[must_use]
    pub fn is_under(&self, segment: &str) -> bool {
        self.path
            .trim_start_matches("./")
            .split('/')
            .next()
            .is_some_and(|first| first.eq_ignore_ascii_case(segment))
    }
}

/// Locates the descriptor directly under `root`.
fn find_descriptor(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
        })
        .collect();
    candidates.sort();

    if candidates.len() > 1 {
        warn!(
            "Found {} workspace descriptors under {}, using {}",
            candidates.len(),
            root.display(),
            candidates[0].display()
        );
    }
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "src", "src", "{10000000-0000-0000-0000-000000000001}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Orders", "Orders", "{10000000-0000-0000-0000-000000000002}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Domain", "Domain", "{10000000-0000-0000-0000-000000000003}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Sales.Orders.Domain", "src\Orders\Domain\Sales.Orders.Domain\Sales.Orders.Domain.csproj", "{20000000-0000-0000-0000-000000000001}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "Sales.Orders.Api", "src\Sales.Orders.Api\Sales.Orders.Api.csproj", "{20000000-0000-0000-0000-000000000002}"
EndProject
Global
	GlobalSection(NestedProjects) = preSolution
		{10000000-0000-0000-0000-000000000002} = {10000000-0000-0000-0000-000000000001}
		{10000000-0000-0000-0000-000000000003} = {10000000-0000-0000-0000-000000000002}
		{20000000-0000-0000-0000-000000000001} = {10000000-0000-0000-0000-000000000003}
	EndGlobalSection
EndGlobal
"#;

    #[test]
    fn parses_nodes_and_nesting() {
        let topology = Topology::parse(SOLUTION);
        assert_eq!(topology.nodes().count(), 5);
        assert_eq!(topology.project_count(), 2);

        let domain = topology.project("Sales.Orders.Domain").expect("listed");
        assert_eq!(domain.kind, NodeKind::Project);
        assert!(domain.path.starts_with("src/Orders/Domain/"));
        assert!(domain.is_under("src"));
        assert!(!domain.is_under("tests"));
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let topology = Topology::parse(SOLUTION);
        assert_eq!(
            topology.ancestors("Sales.Orders.Domain"),
            Some(vec!["Domain".to_string(), "Orders".to_string(), "src".to_string()])
        );
    }

    #[test]
    fn unnested_project_is_orphaned() {
        let topology = Topology::parse(SOLUTION);
        assert_eq!(topology.placement("Sales.Orders.Api"), Placement::Orphaned);
        assert_eq!(topology.ancestors("Sales.Orders.Api"), Some(vec![]));
    }

    #[test]
    fn unknown_project_is_not_found() {
        let topology = Topology::parse(SOLUTION);
        assert_eq!(topology.placement("Other.Api"), Placement::NotFound);
        assert_eq!(topology.ancestors("Other.Api"), None);
    }

    #[test]
    fn nesting_cycle_terminates() {
        let content = r#"
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "A", "A", "{00000000-0000-0000-0000-00000000000A}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "B", "B", "{00000000-0000-0000-0000-00000000000B}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "X.Y.Api", "src\X.Y.Api.csproj", "{00000000-0000-0000-0000-00000000000C}"
EndProject
Global
	GlobalSection(NestedProjects) = preSolution
		{00000000-0000-0000-0000-00000000000C} = {00000000-0000-0000-0000-00000000000A}
		{00000000-0000-0000-0000-00000000000A} = {00000000-0000-0000-0000-00000000000B}
		{00000000-0000-0000-0000-00000000000B} = {00000000-0000-0000-0000-00000000000A}
	EndGlobalSection
EndGlobal
"#;
        let topology = Topology::parse(content);
        assert_eq!(
            topology.ancestors("X.Y.Api"),
            Some(vec!["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn missing_descriptor_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(Topology::read(dir.path()).is_none());
    }

    #[test]
    fn reads_descriptor_from_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("Sales.sln"), SOLUTION).expect("write");
        let topology = Topology::read(dir.path()).expect("descriptor present");
        assert!(topology.path.ends_with("Sales.sln"));
        assert!(topology.project("Sales.Orders.Api").is_some());
    }
}
