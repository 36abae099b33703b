//! Rule to require the full set of persistence namespaces in data projects.
//!
//! Once a data project declares a real data model it must also declare at
//! least one type in each sibling namespace (`DataModels`, `Factories`,
//! `Repositories` by default). All missing namespaces are reported in one
//! violation for the project.
//!
//! # Configuration
//!
//! - `base_class`: data model base class (default: `"DataModelBase"`)
//! - `namespaces`: required namespace segments

use arch_conform_core::{
    Layer, RuleCategory, RuleConfig, RuleInfo, Severity, TypeAnalysisResult, TypeRule,
    UnitContext,
};

use crate::data_model::{real_data_models, DEFAULT_BASE_CLASS};

/// Rule code for data-namespace-completeness.
pub const CODE: &str = "AC005";

/// Rule name for data-namespace-completeness.
pub const NAME: &str = "data-namespace-completeness";

/// Namespace segments every data project must declare.
pub const DEFAULT_NAMESPACES: &[&str] = &["DataModels", "Factories", "Repositories"];

/// Requires every sibling persistence namespace once data models exist.
#[derive(Debug, Clone)]
pub struct DataNamespaceCompleteness {
    /// Severity level.
    pub severity: Severity,
    /// Base class identifying data models.
    pub base_class: String,
    /// Required namespace segments below the project namespace.
    pub namespaces: Vec<String>,
}

impl Default for DataNamespaceCompleteness {
    fn default() -> Self {
        Self::new()
    }
}

impl DataNamespaceCompleteness {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            base_class: DEFAULT_BASE_CLASS.to_string(),
            namespaces: DEFAULT_NAMESPACES.iter().map(ToString::to_string).collect(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replaces the required namespace segments.
    #[must_use]
    pub fn namespaces<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Applies `[rules.data-namespace-completeness]` options.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        if let Some(base) = config.get_string("base_class") {
            self.base_class = base;
        }
        if let Some(segments) = config.get_str_array("namespaces") {
            self.namespaces = segments;
        }
        self
    }
}

/// Whether some type lives in `namespace` or below it.
fn declares_namespace(ctx: &UnitContext<'_>, namespace: &str) -> bool {
    ctx.symbols
        .types()
        .iter()
        .any(|t| crate::matches_prefix(&t.namespace, namespace))
}

impl RuleInfo for DataNamespaceCompleteness {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Data projects with data models must declare every persistence namespace"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Persistence
    }
}

impl TypeRule for DataNamespaceCompleteness {
    fn target_layers(&self) -> &'static [Layer] {
        &[Layer::InfraData]
    }

    fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult> {
        if real_data_models(ctx.symbols, &self.base_class).next().is_none() {
            return Vec::new();
        }

        let missing: Vec<String> = self
            .namespaces
            .iter()
            .map(|segment| ctx.sub_namespace(segment))
            .filter(|namespace| !declares_namespace(ctx, namespace))
            .collect();

        if missing.is_empty() {
            return vec![TypeAnalysisResult::passed(ctx.project, ctx.root_namespace())];
        }

        vec![TypeAnalysisResult::Failed(
            self.violation(
                ctx.project,
                format!(
                    "{} declares data models but no types in: {}",
                    ctx.project,
                    missing.join(", ")
                ),
            )
            .with_remediation(format!(
                "Add the missing namespaces to {}: {}",
                ctx.project,
                missing.join(", ")
            ))
            .with_manifest(ctx.manifest_path()),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check_types, failures};
    use arch_conform_core::TypeSymbol;

    const PROJECT: &str = "Sales.Orders.Infra.Data";

    fn check(types: Vec<TypeSymbol>) -> Vec<TypeAnalysisResult> {
        check_types(&DataNamespaceCompleteness::new(), PROJECT, types)
    }

    fn order_model(namespace: &str) -> TypeSymbol {
        TypeSymbol::class(namespace, "OrderDataModel").extends(["DataModelBase"])
    }

    #[test]
    fn test_no_sibling_namespaces_lists_all_segments() {
        let results = check(vec![order_model(PROJECT)]);

        let violations = failures(&results);
        assert_eq!(results.len(), 1);
        assert_eq!(violations.len(), 1);
        for segment in DEFAULT_NAMESPACES {
            assert!(violations[0].message.contains(segment), "{segment}");
        }
    }

    #[test]
    fn test_complete_project_passes() {
        let results = check(vec![
            order_model(&format!("{PROJECT}.DataModels")),
            TypeSymbol::class(format!("{PROJECT}.Factories"), "OrderDataModelFactory"),
            TypeSymbol::class(format!("{PROJECT}.Repositories.Orders"), "OrderRepository"),
        ]);
        assert_eq!(results.len(), 1);
        assert!(results[0].is_passed());
    }

    #[test]
    fn test_only_missing_segments_are_listed() {
        let results = check(vec![
            order_model(&format!("{PROJECT}.DataModels")),
            TypeSymbol::class(format!("{PROJECT}.Factories"), "OrderDataModelFactory"),
        ]);
        let violations = failures(&results);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Repositories"));
        assert!(!violations[0].message.contains("Factories"));
    }

    #[test]
    fn test_project_without_data_models_is_not_applicable() {
        let results = check(vec![
            TypeSymbol::class(PROJECT, "DataModelBase").abstract_type(),
            TypeSymbol::class(PROJECT, "Clock"),
        ]);
        assert!(results.is_empty());
    }
}
