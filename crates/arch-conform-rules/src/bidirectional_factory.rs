//! Rule to require forward and reverse factories for every data model.
//!
//! For a data model `<Stem>DataModel` the project must declare:
//!
//! - `<Stem>DataModelFactory` with a `CreateDataModel` method (entity to model)
//! - `<Stem>EntityFactory` with a `CreateEntity` method (model to entity)
//!
//! Both factories must be static-only: a static type, or every member static.
//! All unmet conditions for one data model are combined into one violation.

use arch_conform_core::{
    Layer, RuleCategory, RuleConfig, RuleInfo, Severity, TypeAnalysisResult, TypeRule,
    TypeSymbol, UnitContext,
};

use crate::data_model::{real_data_models, stem, DEFAULT_BASE_CLASS};

/// Rule code for bidirectional-factory.
pub const CODE: &str = "AC006";

/// Rule name for bidirectional-factory.
pub const NAME: &str = "bidirectional-factory";

/// One required factory of a data model.
struct FactorySpec {
    type_name: String,
    method: &'static str,
}

/// Requires static forward and reverse factories per data model.
#[derive(Debug, Clone)]
pub struct BidirectionalFactory {
    /// Severity level.
    pub severity: Severity,
    /// Base class identifying data models.
    pub base_class: String,
}

impl Default for BidirectionalFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BidirectionalFactory {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            base_class: DEFAULT_BASE_CLASS.to_string(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Applies `[rules.bidirectional-factory]` options.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        if let Some(base) = config.get_string("base_class") {
            self.base_class = base;
        }
        self
    }

    fn required_factories(model: &TypeSymbol) -> [FactorySpec; 2] {
        let stem = stem(&model.name);
        [
            FactorySpec {
                type_name: format!("{stem}DataModelFactory"),
                method: "CreateDataModel",
            },
            FactorySpec {
                type_name: format!("{stem}EntityFactory"),
                method: "CreateEntity",
            },
        ]
    }

    fn unmet_conditions(ctx: &UnitContext<'_>, model: &TypeSymbol) -> Vec<String> {
        let mut clauses = Vec::new();
        for factory in Self::required_factories(model) {
            let Some(declared) = ctx.symbols.find_type(&factory.type_name) else {
                clauses.push(format!("missing factory {}", factory.type_name));
                continue;
            };
            if !declared.is_static_only() {
                clauses.push(format!("{} is not static-only", factory.type_name));
            }
            if declared.find_member(factory.method).is_none() {
                clauses.push(format!(
                    "{} does not declare {}",
                    factory.type_name, factory.method
                ));
            }
        }
        clauses
    }
}

impl RuleInfo for BidirectionalFactory {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Every data model needs static forward and reverse factories"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Persistence
    }
}

impl TypeRule for BidirectionalFactory {
    fn target_layers(&self) -> &'static [Layer] {
        &[Layer::InfraData]
    }

    fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult> {
        real_data_models(ctx.symbols, &self.base_class)
            .map(|model| {
                let clauses = Self::unmet_conditions(ctx, model);
                if clauses.is_empty() {
                    return TypeAnalysisResult::passed(ctx.project, &model.name);
                }
                let [forward, reverse] = Self::required_factories(model);
                TypeAnalysisResult::Failed(
                    self.violation(
                        ctx.project,
                        format!("Data model {}: {}", model.full_name(), clauses.join("; ")),
                    )
                    .with_subject(&model.name)
                    .with_remediation(format!(
                        "Declare static classes {} (with {}) and {} (with {}) for {}",
                        forward.type_name,
                        forward.method,
                        reverse.type_name,
                        reverse.method,
                        model.name
                    ))
                    .with_manifest(ctx.manifest_path()),
                )
            })
            .collect()
    }
}
