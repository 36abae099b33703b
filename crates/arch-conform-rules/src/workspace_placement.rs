//! Rule to check where projects sit in the workspace folder tree.
//!
//! Only projects listed in the workspace descriptor under the source root
//! (`src`) with a known layer and bounded context are checked; each gets
//! exactly one result. For a checked project:
//!
//! - the immediate parent folder must be the layer folder,
//! - two-level layers also need the expected grandparent folder,
//! - a folder named after the bounded context (the full prefix or its last
//!   segment) must appear among the ancestors.
//!
//! A project with no parent folder at all is reported as orphaned.
//!
//! # Configuration
//!
//! - `source_root`: first path segment in scope (default: `"src"`)
//! - `require_bounded_context_folder`: check the bounded-context folder (default: true)

use arch_conform_core::{
    Layer, Placement, ProjectRule, RuleCategory, RuleConfig, RuleInfo, Severity, Topology,
    TypeAnalysisResult, WorkspaceContext,
};

/// Rule code for workspace-placement.
pub const CODE: &str = "AC008";

/// Rule name for workspace-placement.
pub const NAME: &str = "workspace-placement";

/// Default source root segment.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Expected folder of each layer: `(layer, folder, required grandparent)`.
pub const LAYER_FOLDERS: &[(Layer, &str, Option<&str>)] = &[
    (Layer::Api, "Api", None),
    (Layer::Application, "Application", None),
    (Layer::Domain, "Domain", None),
    (Layer::DomainEntities, "Entities", Some("Domain")),
    (Layer::InfraData, "Data", Some("Infra")),
    (Layer::InfraDataTech, "Technology", Some("Data")),
    (Layer::Configuration, "CrossCutting", Some("Infra")),
    (Layer::Bootstrapper, "Bootstrapper", None),
];

/// Returns the expected `(folder, grandparent)` of a layer.
#[must_use]
pub fn layer_folder(layer: Layer) -> Option<(&'static str, Option<&'static str>)> {
    LAYER_FOLDERS
        .iter()
        .find(|(l, _, _)| *l == layer)
        .map(|(_, folder, grandparent)| (*folder, *grandparent))
}

/// Checks layer and bounded-context folders of every project.
#[derive(Debug, Clone)]
pub struct WorkspacePlacement {
    /// Severity level.
    pub severity: Severity,
    /// First descriptor path segment of projects in scope.
    pub source_root: String,
    /// Whether a bounded-context folder is required among the ancestors.
    pub require_bounded_context_folder: bool,
}

impl Default for WorkspacePlacement {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspacePlacement {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
            require_bounded_context_folder: true,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the source root segment.
    #[must_use]
    pub fn source_root(mut self, segment: impl Into<String>) -> Self {
        self.source_root = segment.into();
        self
    }

    /// Applies `[rules.workspace-placement]` options.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        if let Some(root) = config.get_string("source_root") {
            self.source_root = root;
        }
        self.require_bounded_context_folder =
            config.get_bool("require_bounded_context_folder", self.require_bounded_context_folder);
        self
    }

    fn check_project(
        &self,
        ctx: &WorkspaceContext,
        topology: &Topology,
        project: &str,
    ) -> Option<TypeAnalysisResult> {
        let node = topology.project(project)?;
        if !node.is_under(&self.source_root) {
            return None;
        }
        let layer = Layer::classify(project);
        let bounded_context = Layer::bc_prefix(project)?;
        let (folder, grandparent) = layer_folder(layer)?;

        let manifest = ctx.manifest(project).map(|m| m.path.clone());
        let chain = match topology.placement(project) {
            Placement::NotFound => return None,
            Placement::Orphaned => {
                return Some(TypeAnalysisResult::Failed(
                    self.violation(
                        project,
                        format!("{project} is orphaned: it has no parent folder in the workspace"),
                    )
                    .with_subject(&node.path)
                    .with_remediation(format!(
                        "Nest {project} under a {folder} folder inside the {bounded_context} folder"
                    ))
                    .with_manifest(manifest),
                ));
            }
            Placement::Nested(chain) => chain,
        };

        let mut clauses = Vec::new();
        let parent = chain.first().map_or("<none>", String::as_str);
        if parent != folder {
            clauses.push(format!("parent folder is '{parent}', expected '{folder}'"));
        }
        if let Some(expected) = grandparent {
            let actual = chain.get(1).map_or("<none>", String::as_str);
            if actual != expected {
                clauses.push(format!(
                    "grandparent folder is '{actual}', expected '{expected}'"
                ));
            }
        }
        if self.require_bounded_context_folder {
            let short = bc_folder(bounded_context);
            if !chain.iter().any(|f| f == bounded_context || f == short) {
                clauses.push(format!(
                    "no '{short}' or '{bounded_context}' folder among ancestors {}",
                    chain.join("/")
                ));
            }
        }

        if clauses.is_empty() {
            return Some(TypeAnalysisResult::passed(project, &node.path));
        }

        let short = bc_folder(bounded_context);
        let expected_path = match grandparent {
            Some(gp) => format!("{short}/{gp}/{folder}"),
            None => format!("{short}/{folder}"),
        };
        Some(TypeAnalysisResult::Failed(
            self.violation(
                project,
                format!("{project} is misplaced: {}", clauses.join("; ")),
            )
            .with_subject(&node.path)
            .with_remediation(format!(
                "Move {project} under {}/.../{expected_path}",
                self.source_root
            ))
            .with_manifest(manifest),
        ))
    }
}

/// Last segment of a bounded-context prefix (`Sales.Orders` -> `Orders`).
fn bc_folder(bounded_context: &str) -> &str {
    bounded_context
        .rsplit('.')
        .next()
        .unwrap_or(bounded_context)
}

impl RuleInfo for WorkspacePlacement {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Projects must sit in their layer and bounded-context folders"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Workspace
    }
}

impl ProjectRule for WorkspacePlacement {
    fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult> {
        let Some(topology) = ctx.topology.as_ref() else {
            tracing::debug!("No workspace descriptor, skipping {NAME}");
            return Vec::new();
        };

        ctx.projects
            .iter()
            .filter_map(|project| self.check_project(ctx, topology, project))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failures, manifest, workspace_with_topology};
    use std::collections::BTreeMap;
    use std::fmt::Write;

    /// Builds a descriptor nesting each project under the given folders.
    fn solution(projects: &[(&str, &[&str])]) -> String {
        let mut folders: BTreeMap<String, usize> = BTreeMap::new();
        let mut out = String::new();
        let mut nesting = String::new();
        let mut next_id = 1usize;
        let guid = |n: usize| format!("{{00000000-0000-0000-0000-{n:012X}}}");

        for (name, path) in projects {
            let mut parent: Option<usize> = None;
            for depth in 0..path.len() {
                let key = path[..=depth].join("/");
                let id = *folders.entry(key).or_insert_with(|| {
                    let id = next_id;
                    next_id += 1;
                    let _ = writeln!(
                        out,
                        "Project(\"{{2150E333-8FDC-42A3-9474-1A3956D46DE8}}\") = \"{0}\", \"{0}\", \"{1}\"\nEndProject",
                        path[depth],
                        guid(id)
                    );
                    if let Some(p) = parent {
                        let _ = writeln!(nesting, "\t\t{} = {}", guid(id), guid(p));
                    }
                    id
                });
                parent = Some(id);
            }

            let id = next_id;
            next_id += 1;
            let relative = format!("{}\\{name}\\{name}.csproj", path.join("\\"));
            let _ = writeln!(
                out,
                "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{name}\", \"{relative}\", \"{}\"\nEndProject",
                guid(id)
            );
            if let Some(p) = parent {
                let _ = writeln!(nesting, "\t\t{} = {}", guid(id), guid(p));
            }
        }

        format!(
            "{out}Global\n\tGlobalSection(NestedProjects) = preSolution\n{nesting}\tEndGlobalSection\nEndGlobal\n"
        )
    }

    fn check(projects: &[(&str, &[&str])]) -> Vec<TypeAnalysisResult> {
        let manifests = projects.iter().map(|(name, _)| manifest(name, &[], &[])).collect();
        let ctx = workspace_with_topology(manifests, &solution(projects));
        WorkspacePlacement::new().check_workspace(&ctx)
    }

    #[test]
    fn test_canonical_layout_passes() {
        let results = check(&[
            ("Sales.Orders.Api", &["src", "Orders", "Api"]),
            ("Sales.Orders.Domain.Entities", &["src", "Orders", "Domain", "Entities"]),
            ("Sales.Orders.Infra.Data.Technology", &["src", "Sales.Orders", "Infra", "Data", "Technology"]),
            ("Sales.Orders.Infra.CrossCutting.Configuration", &["src", "Orders", "Infra", "CrossCutting"]),
        ]);
        assert_eq!(results.len(), 4);
        assert!(failures(&results).is_empty(), "{:?}", failures(&results));
    }

    #[test]
    fn test_wrong_parent_and_grandparent_combine() {
        let results = check(&[("Sales.Orders.Infra.Data", &["src", "Orders", "Persistence", "Storage"])]);
        let violations = failures(&results);
        assert_eq!(results.len(), 1);
        assert_eq!(violations.len(), 1);
        let message = &violations[0].message;
        assert!(message.contains("'Storage', expected 'Data'"));
        assert!(message.contains("'Persistence', expected 'Infra'"));
        assert!(!message.contains("ancestors"));
    }

    #[test]
    fn test_missing_bounded_context_folder() {
        let results = check(&[("Sales.Orders.Application", &["src", "Billing", "Application"])]);
        let violations = failures(&results);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("'Orders'"));
    }

    #[test]
    fn test_orphaned_project_is_distinct() {
        let results = check(&[("Sales.Orders.Api", &[])]);
        assert!(results.is_empty(), "project path does not start under src");

        let descriptor = "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Sales.Orders.Api\", \"src\\Sales.Orders.Api\\Sales.Orders.Api.csproj\", \"{00000000-0000-0000-0000-000000000001}\"\nEndProject\n";
        let ctx = workspace_with_topology(vec![manifest("Sales.Orders.Api", &[], &[])], descriptor);
        let results = WorkspacePlacement::new().check_workspace(&ctx);
        let violations = failures(&results);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("orphaned"));
    }

    #[test]
    fn test_projects_under_tests_root_are_out_of_scope() {
        let results = check(&[("Sales.Orders.Api", &["tests", "Orders", "Api"])]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_unknown_layer_and_missing_context_are_skipped() {
        let results = check(&[
            ("Sales.Orders.Tools", &["src", "Orders", "Tools"]),
            ("Orders.Api", &["src", "Orders", "Api"]),
        ]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_missing_descriptor_is_not_applicable() {
        let ctx = crate::test_support::workspace(vec![manifest("Sales.Orders.Api", &[], &[])]);
        assert!(WorkspacePlacement::new().check_workspace(&ctx).is_empty());
    }

    #[test]
    fn test_every_known_layer_has_a_folder() {
        for layer in Layer::KNOWN {
            assert!(layer_folder(layer).is_some(), "{layer}");
        }
        assert!(layer_folder(Layer::Unknown).is_none());
    }
}
