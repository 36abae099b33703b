//! Rule to keep service registration in one entry point.
//!
//! In a configuration project, the static public `DependencyInjection` type
//! declared in the root namespace is the only type allowed to integrate with
//! the service container (`IServiceCollection`). Any other type with a member
//! taking the container as a parameter, or extending it, is reported on its
//! own.
//!
//! # Configuration
//!
//! - `entry_point`: name of the entry point type (default: `"DependencyInjection"`)
//! - `container_type`: registration container type (default: `"IServiceCollection"`)

use arch_conform_core::{
    Layer, RuleCategory, RuleConfig, RuleInfo, Severity, TypeAnalysisResult, TypeRule,
    TypeSymbol, UnitContext, Visibility,
};

/// Rule code for exclusive-registration-entry-point.
pub const CODE: &str = "AC007";

/// Rule name for exclusive-registration-entry-point.
pub const NAME: &str = "exclusive-registration-entry-point";

/// Default registration entry point.
pub const DEFAULT_ENTRY_POINT: &str = "DependencyInjection";

/// Default registration container type.
pub const DEFAULT_CONTAINER_TYPE: &str = "IServiceCollection";

/// Restricts container registration to the canonical entry point.
#[derive(Debug, Clone)]
pub struct ExclusiveRegistrationEntryPoint {
    /// Severity level.
    pub severity: Severity,
    /// Name of the only type allowed to register services.
    pub entry_point: String,
    /// The container type registrations go through.
    pub container_type: String,
}

impl Default for ExclusiveRegistrationEntryPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusiveRegistrationEntryPoint {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            container_type: DEFAULT_CONTAINER_TYPE.to_string(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Applies `[rules.exclusive-registration-entry-point]` options.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        if let Some(entry_point) = config.get_string("entry_point") {
            self.entry_point = entry_point;
        }
        if let Some(container) = config.get_string("container_type") {
            self.container_type = container;
        }
        self
    }

    fn is_entry_point(&self, ctx: &UnitContext<'_>, ty: &TypeSymbol) -> bool {
        ty.name == self.entry_point
            && ty.namespace == ctx.root_namespace()
            && ty.is_static
            && ty.visibility == Visibility::Public
    }
}

impl RuleInfo for ExclusiveRegistrationEntryPoint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Only the registration entry point may integrate with the service container"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Registration
    }
}

impl TypeRule for ExclusiveRegistrationEntryPoint {
    fn target_layers(&self) -> &'static [Layer] {
        &[Layer::Configuration]
    }

    fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult> {
        let canonical = format!("{}.{}", ctx.root_namespace(), self.entry_point);

        ctx.symbols
            .types()
            .iter()
            .filter_map(|ty| {
                if self.is_entry_point(ctx, ty) {
                    return Some(TypeAnalysisResult::passed(ctx.project, &ty.name));
                }

                let members = ctx.symbols.signature_references(ty, &self.container_type);
                if members.is_empty() {
                    return None;
                }
                let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();

                Some(TypeAnalysisResult::Failed(
                    self.violation(
                        ctx.project,
                        format!(
                            "{} references {} in {}; only {canonical} may register services",
                            ty.full_name(),
                            self.container_type,
                            names.join(", ")
                        ),
                    )
                    .with_subject(&ty.name)
                    .with_remediation(format!(
                        "Move the registrations of {} into the static public class {canonical}",
                        ty.name
                    ))
                    .with_manifest(ctx.manifest_path()),
                ))
            })
            .collect()
    }
}
