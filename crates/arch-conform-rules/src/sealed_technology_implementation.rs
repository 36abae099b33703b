//! Rule to check concrete technology implementations.
//!
//! A concrete class implementing the root technology marker must:
//!
//! 1. be sealed,
//! 2. inherit (transitively) from the technology base class,
//! 3. implement a bounded-context marker, an interface other than the root
//!    marker that itself extends it.
//!
//! Unmet conditions are combined into one violation per class.
//!
//! # Configuration
//!
//! - `root_marker`: the root marker interface (default: `"ITechnologyMarker"`)
//! - `base_class`: the technology base class (default: `"TechnologyBase"`)

use arch_conform_core::symbols::simple_name;
use arch_conform_core::{
    Layer, RuleCategory, RuleConfig, RuleInfo, Severity, TypeAnalysisResult, TypeRule,
    TypeSymbol, UnitContext,
};

use crate::technology_marker_interface::DEFAULT_ROOT_MARKER;

/// Rule code for sealed-technology-implementation.
pub const CODE: &str = "AC004";

/// Rule name for sealed-technology-implementation.
pub const NAME: &str = "sealed-technology-implementation";

/// Default technology base class.
pub const DEFAULT_BASE_CLASS: &str = "TechnologyBase";

/// Checks sealing, base class and marker of technology implementations.
#[derive(Debug, Clone)]
pub struct SealedTechnologyImplementation {
    /// Severity level.
    pub severity: Severity,
    /// Interface identifying technology implementations.
    pub root_marker: String,
    /// Class every implementation must inherit from.
    pub base_class: String,
}

impl Default for SealedTechnologyImplementation {
    fn default() -> Self {
        Self::new()
    }
}

impl SealedTechnologyImplementation {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
            base_class: DEFAULT_BASE_CLASS.to_string(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the technology base class.
    #[must_use]
    pub fn base_class(mut self, name: impl Into<String>) -> Self {
        self.base_class = name.into();
        self
    }

    /// Applies `[rules.sealed-technology-implementation]` options.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        if let Some(root) = config.get_string("root_marker") {
            self.root_marker = root;
        }
        if let Some(base) = config.get_string("base_class") {
            self.base_class = base;
        }
        self
    }

    /// Whether `ty` implements a marker that extends the root marker.
    fn implements_context_marker(&self, ctx: &UnitContext<'_>, ty: &TypeSymbol) -> bool {
        ty.interfaces
            .iter()
            .map(|name| simple_name(name))
            .filter(|name| *name != self.root_marker)
            .filter_map(|name| ctx.symbols.find_type(name))
            .any(|marker| marker.is_interface() && ctx.symbols.inherits_from(marker, &self.root_marker))
    }

    fn unmet_conditions(&self, ctx: &UnitContext<'_>, ty: &TypeSymbol) -> Vec<String> {
        let mut clauses = Vec::new();
        if !ty.is_sealed {
            clauses.push("is not sealed".to_string());
        }
        if !ctx.symbols.derives_from_class(ty, &self.base_class) {
            clauses.push(format!("does not inherit from {}", self.base_class));
        }
        if !self.implements_context_marker(ctx, ty) {
            clauses.push(format!(
                "implements no bounded-context marker extending {}",
                self.root_marker
            ));
        }
        clauses
    }
}

impl RuleInfo for SealedTechnologyImplementation {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Technology implementations must be sealed, based on the technology base class and context-marked"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Technology
    }
}

impl TypeRule for SealedTechnologyImplementation {
    fn target_layers(&self) -> &'static [Layer] {
        &[Layer::InfraDataTech]
    }

    fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult> {
        ctx.symbols
            .types()
            .iter()
            .filter(|ty| ty.is_concrete_class() && ctx.symbols.inherits_from(ty, &self.root_marker))
            .map(|ty| {
                let clauses = self.unmet_conditions(ctx, ty);
                if clauses.is_empty() {
                    return TypeAnalysisResult::passed(ctx.project, &ty.name);
                }
                TypeAnalysisResult::Failed(
                    self.violation(
                        ctx.project,
                        format!("Technology implementation {} {}", ty.full_name(), clauses.join("; ")),
                    )
                    .with_subject(&ty.name)
                    .with_remediation(format!(
                        "Declare {} as `sealed class {} : {}, I<Context>TechnologyMarker`",
                        ty.name, ty.name, self.base_class
                    ))
                    .with_manifest(ctx.manifest_path()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check_types, failures, passed_subjects};

    const PROJECT: &str = "Sales.Orders.Infra.Data.Technology";

    fn context_marker() -> TypeSymbol {
        TypeSymbol::interface(format!("{PROJECT}.Markers"), "IOrdersTechnologyMarker")
            .implements(["ITechnologyMarker"])
    }

    fn implementation() -> TypeSymbol {
        TypeSymbol::class(PROJECT, "OrdersSqlTechnology")
            .sealed()
            .extends(["TechnologyBase", "Object"])
            .implements(["IOrdersTechnologyMarker", "ITechnologyMarker"])
    }

    fn check(types: Vec<TypeSymbol>) -> Vec<TypeAnalysisResult> {
        check_types(&SealedTechnologyImplementation::new(), PROJECT, types)
    }

    #[test]
    fn test_conforming_implementation_passes() {
        let results = check(vec![context_marker(), implementation()]);
        assert_eq!(passed_subjects(&results), vec!["OrdersSqlTechnology"]);
    }

    #[test]
    fn test_all_unmet_conditions_combine_into_one_violation() {
        let bare = TypeSymbol::class(PROJECT, "LooseTechnology").implements(["ITechnologyMarker"]);
        let results = check(vec![context_marker(), bare]);

        let violations = failures(&results);
        assert_eq!(results.len(), 1);
        assert_eq!(violations.len(), 1);
        let message = &violations[0].message;
        assert!(message.contains("LooseTechnology"));
        assert!(message.contains("is not sealed"));
        assert!(message.contains("TechnologyBase"));
        assert!(message.contains("bounded-context marker"));
    }

    #[test]
    fn test_each_condition_is_monotonic() {
        let mut unsealed = implementation();
        unsealed.is_sealed = false;

        let mut unbased = implementation();
        unbased.base_types = vec!["Object".to_string()];

        let mut unmarked = implementation();
        unmarked.interfaces = vec!["ITechnologyMarker".to_string()];

        assert!(check(vec![context_marker(), implementation()])[0].is_passed());
        for (variant, clause) in [
            (unsealed, "is not sealed"),
            (unbased, "does not inherit"),
            (unmarked, "bounded-context marker"),
        ] {
            let results = check(vec![context_marker(), variant]);
            let violations = failures(&results);
            assert_eq!(violations.len(), 1);
            assert!(violations[0].message.contains(clause), "{}", violations[0].message);
        }
    }

    #[test]
    fn test_abstract_and_unmarked_classes_are_skipped() {
        let results = check(vec![
            context_marker(),
            TypeSymbol::class(PROJECT, "TechnologyBase").abstract_type().implements(["ITechnologyMarker"]),
            TypeSymbol::class(PROJECT, "ConnectionStringReader"),
        ]);
        assert!(results.is_empty());
    }
}
