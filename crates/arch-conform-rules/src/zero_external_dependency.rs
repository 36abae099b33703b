//! Rule to keep pure layers free of external dependencies.
//!
//! A pure-layer project (by default the domain entities) may only reference
//! the shared infrastructure and other pure-layer projects, and no packages
//! at all. Every declared reference and package gets its own result.
//!
//! # Configuration
//!
//! - `shared_prefixes`: allowed shared-infrastructure prefixes
//!   (default: `["Shared.BuildingBlocks"]`)

use arch_conform_core::{
    Layer, ProjectManifest, ProjectRule, RuleCategory, RuleConfig, RuleInfo, Severity,
    TypeAnalysisResult, WorkspaceContext,
};

use crate::matches_prefix;

/// Rule code for zero-external-dependency.
pub const CODE: &str = "AC002";

/// Rule name for zero-external-dependency.
pub const NAME: &str = "zero-external-dependency";

/// Layers treated as pure.
pub const PURE_LAYERS: &[Layer] = &[Layer::DomainEntities];

/// Forbids external references and packages in pure layers.
#[derive(Debug, Clone)]
pub struct ZeroExternalDependency {
    /// Severity level.
    pub severity: Severity,
    /// Reference prefixes of the shared infrastructure.
    pub shared_prefixes: Vec<String>,
}

impl Default for ZeroExternalDependency {
    fn default() -> Self {
        Self::new()
    }
}

impl ZeroExternalDependency {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            shared_prefixes: vec![crate::layer_direction::DEFAULT_EXEMPT_PREFIX.to_string()],
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replaces the shared-infrastructure prefixes.
    #[must_use]
    pub fn shared_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shared_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Applies `[rules.zero-external-dependency]` options.
    #[must_use]
    pub fn with_config(self, config: &RuleConfig) -> Self {
        match config.get_str_array("shared_prefixes") {
            Some(prefixes) => self.shared_prefixes(prefixes),
            None => self,
        }
    }

    fn is_allowed_reference(&self, target: &str) -> bool {
        PURE_LAYERS.contains(&Layer::classify(target))
            || self
                .shared_prefixes
                .iter()
                .any(|prefix| matches_prefix(target, prefix))
    }

    fn check_manifest(&self, manifest: &ProjectManifest) -> Vec<TypeAnalysisResult> {
        let project = manifest.name.as_str();

        let references = manifest.references.iter().map(|target| {
            if self.is_allowed_reference(target) {
                return TypeAnalysisResult::passed(project, target);
            }
            TypeAnalysisResult::Failed(
                self.violation(
                    project,
                    format!("{project} is a pure layer but references project {target}"),
                )
                .with_subject(target)
                .with_remediation(format!(
                    "Remove the reference to {target} from {project}; move the dependency to an outer layer"
                ))
                .with_manifest(Some(manifest.path.clone())),
            )
        });

        let packages = manifest.packages.iter().map(|package| {
            TypeAnalysisResult::Failed(
                self.violation(
                    project,
                    format!("{project} is a pure layer but references package {package}"),
                )
                .with_subject(package)
                .with_remediation(format!(
                    "Remove the package {package} from {project}; pure layers declare no packages"
                ))
                .with_manifest(Some(manifest.path.clone())),
            )
        });

        references.chain(packages).collect()
    }
}

impl RuleInfo for ZeroExternalDependency {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Pure layers must not reference packages or non-shared projects"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Dependencies
    }
}

impl ProjectRule for ZeroExternalDependency {
    fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult> {
        ctx.project_manifests()
            .filter(|m| PURE_LAYERS.contains(&Layer::classify(&m.name)))
            .flat_map(|m| self.check_manifest(m))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{failures, manifest, passed_subjects, workspace};

    fn check(manifests: Vec<ProjectManifest>) -> Vec<TypeAnalysisResult> {
        ZeroExternalDependency::new().check_workspace(&workspace(manifests))
    }

    #[test]
    fn test_empty_pure_project_has_no_results() {
        assert!(check(vec![manifest("A.B.Domain.Entities", &[], &[])]).is_empty());
    }

    #[test]
    fn test_one_result_per_reference_and_package() {
        let results = check(vec![manifest(
            "A.B.Domain.Entities",
            &[
                "Shared.BuildingBlocks.Core",
                "C.D.Domain.Entities",
                "A.B.Infra.Data",
            ],
            &["Newtonsoft.Json", "Dapper"],
        )]);

        assert_eq!(results.len(), 5);
        assert_eq!(
            passed_subjects(&results),
            vec!["C.D.Domain.Entities", "Shared.BuildingBlocks.Core"]
        );

        let mut subjects: Vec<&str> = failures(&results)
            .iter()
            .map(|v| v.subject.as_str())
            .collect();
        subjects.sort_unstable();
        assert_eq!(subjects, vec!["A.B.Infra.Data", "Dapper", "Newtonsoft.Json"]);
    }

    #[test]
    fn test_messages_name_both_entities() {
        let results = check(vec![manifest("A.B.Domain.Entities", &[], &["Dapper"])]);
        let violations = failures(&results);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("A.B.Domain.Entities"));
        assert!(violations[0].message.contains("Dapper"));
        assert!(violations[0].remediation.contains("Dapper"));
    }

    #[test]
    fn test_non_pure_projects_are_ignored() {
        let results = check(vec![manifest("A.B.Domain", &["A.B.Infra.Data"], &["Dapper"])]);
        assert!(results.is_empty());
    }
}
