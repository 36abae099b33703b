//! Rule traits for defining conformance rules.
//!
//! Rules come in two shapes. A [`ProjectRule`] looks at manifests and the
//! workspace topology; a [`TypeRule`] looks at the symbols of one compiled
//! project at a time. Both are stateless: everything they need arrives
//! through their context, so the analyzer can run them in any order and in
//! parallel. [`RuleKind`] is the registry entry that tags which shape a rule
//! has.

use crate::context::{UnitContext, WorkspaceContext};
use crate::layer::Layer;
use crate::types::{Severity, TypeAnalysisResult, Violation};

/// Broad grouping of rules, used for listing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Allowed directions between layers.
    Layering,
    /// Project and package references.
    Dependencies,
    /// Persistence technology conventions.
    Technology,
    /// Persistence model conventions.
    Persistence,
    /// Dependency-injection registration.
    Registration,
    /// Workspace folder layout.
    Workspace,
}

impl std::fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Layering => "layering",
            Self::Dependencies => "dependencies",
            Self::Technology => "technology",
            Self::Persistence => "persistence",
            Self::Registration => "registration",
            Self::Workspace => "workspace",
        };
        f.write_str(name)
    }
}

/// Metadata shared by both rule shapes.
pub trait RuleInfo: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "layer-direction").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AC001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Path of the architecture document describing the convention.
    fn doc_path(&self) -> &'static str {
        "docs/architecture.md"
    }

    /// Returns the rule category.
    fn category(&self) -> RuleCategory;

    /// Starts a violation pre-filled with this rule's code, name, severity
    /// and documentation path.
    fn violation(&self, project: &str, message: String) -> Violation {
        Violation::new(
            self.code(),
            self.name(),
            self.default_severity(),
            project,
            message,
        )
        .with_doc_ref(self.doc_path())
    }
}

/// A project-level rule based on manifests and the workspace topology.
///
/// # Example
///
/// ```ignore
/// use arch_conform_core::{ProjectRule, RuleInfo, RuleCategory, TypeAnalysisResult, WorkspaceContext};
///
/// pub struct NoPackages;
///
/// impl RuleInfo for NoPackages {
///     fn name(&self) -> &'static str { "no-packages" }
///     fn code(&self) -> &'static str { "X001" }
///     fn category(&self) -> RuleCategory { RuleCategory::Dependencies }
/// }
///
/// impl ProjectRule for NoPackages {
///     fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult> {
///         ctx.project_manifests()
///             .flat_map(|m| m.packages.iter().map(|p| {
///                 TypeAnalysisResult::Failed(self.violation(&m.name, format!("{} uses {p}", m.name)))
///             }))
///             .collect()
///     }
/// }
/// ```
pub trait ProjectRule: RuleInfo {
    /// Checks the workspace and returns one result per relevant subject.
    ///
    /// Projects the rule does not apply to produce no result at all.
    fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult>;
}

/// Type alias for boxed `ProjectRule` trait objects.
pub type ProjectRuleBox = Box<dyn ProjectRule>;

/// A type-level rule based on one compiled project's symbols.
pub trait TypeRule: RuleInfo {
    /// Layers whose projects this rule inspects.
    fn target_layers(&self) -> &'static [Layer];

    /// Whether the rule inspects the given project.
    fn applies_to(&self, ctx: &UnitContext<'_>) -> bool {
        self.target_layers().contains(&ctx.layer)
    }

    /// Checks one compiled project and returns at most one result per
    /// relevant declared type.
    fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult>;
}

/// Type alias for boxed `TypeRule` trait objects.
pub type TypeRuleBox = Box<dyn TypeRule>;

/// A registered rule of either shape.
pub enum RuleKind {
    /// Manifest/topology rule.
    Project(ProjectRuleBox),
    /// Symbol-model rule.
    Type(TypeRuleBox),
}

impl RuleKind {
    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Project(rule) => rule.name(),
            Self::Type(rule) => rule.name(),
        }
    }

    /// Returns the rule code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Project(rule) => rule.code(),
            Self::Type(rule) => rule.code(),
        }
    }

    /// Returns the rule description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Project(rule) => rule.description(),
            Self::Type(rule) => rule.description(),
        }
    }

    /// Returns the rule category.
    #[must_use]
    pub fn category(&self) -> RuleCategory {
        match self {
            Self::Project(rule) => rule.category(),
            Self::Type(rule) => rule.category(),
        }
    }

    /// Returns the default severity of the rule.
    #[must_use]
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::Project(rule) => rule.default_severity(),
            Self::Type(rule) => rule.default_severity(),
        }
    }

    /// Returns true for project-level rules.
    #[must_use]
    pub fn is_project_level(&self) -> bool {
        matches!(self, Self::Project(_))
    }
}

impl std::fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shape = if self.is_project_level() { "Project" } else { "Type" };
        write!(f, "{shape}({} {})", self.code(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule;

    impl RuleInfo for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Dependencies
        }
    }

    impl ProjectRule for TestRule {
        fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult> {
            ctx.projects
                .iter()
                .map(|p| TypeAnalysisResult::Failed(self.violation(p, format!("{p} failed"))))
                .collect()
        }
    }

    #[test]
    fn violation_is_prefilled() {
        let v = TestRule.violation("A.B.Api", "A.B.Api failed".to_string());
        assert_eq!(v.code, "TEST001");
        assert_eq!(v.rule, "test-rule");
        assert_eq!(v.severity, Severity::Error);
        assert_eq!(v.doc_ref.as_deref(), Some("docs/architecture.md"));
    }

    #[test]
    fn rule_kind_exposes_metadata() {
        let kind = RuleKind::Project(Box::new(TestRule));
        assert_eq!(kind.name(), "test-rule");
        assert!(kind.is_project_level());
        assert_eq!(format!("{kind:?}"), "Project(TEST001 test-rule)");
    }
}
