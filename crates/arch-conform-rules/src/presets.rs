//! Rule sets built from the catalog.

use crate::{
    BidirectionalFactory, DataNamespaceCompleteness, ExclusiveRegistrationEntryPoint,
    LayerDirection, SealedTechnologyImplementation, TechnologyMarkerInterface,
    WorkspacePlacement, ZeroExternalDependency,
};
use arch_conform_core::{Config, RuleConfig, RuleKind};

/// Returns every rule of the catalog with default settings, in code order.
#[must_use]
pub fn all_rules() -> Vec<RuleKind> {
    rules_from_config(&Config::default())
}

/// Returns every rule with the options of `config` applied.
///
/// Rules disabled in `config` are still returned; the analyzer skips them.
#[must_use]
pub fn rules_from_config(config: &Config) -> Vec<RuleKind> {
    let empty = RuleConfig::default();
    let options = |name: &str| config.rule(name).unwrap_or(&empty);

    vec![
        RuleKind::Project(Box::new(
            LayerDirection::new().with_config(options(crate::layer_direction::NAME)),
        )),
        RuleKind::Project(Box::new(
            ZeroExternalDependency::new().with_config(options(crate::zero_external_dependency::NAME)),
        )),
        RuleKind::Type(Box::new(
            TechnologyMarkerInterface::new()
                .with_config(options(crate::technology_marker_interface::NAME)),
        )),
        RuleKind::Type(Box::new(
            SealedTechnologyImplementation::new()
                .with_config(options(crate::sealed_technology_implementation::NAME)),
        )),
        RuleKind::Type(Box::new(
            DataNamespaceCompleteness::new()
                .with_config(options(crate::data_namespace_completeness::NAME)),
        )),
        RuleKind::Type(Box::new(
            BidirectionalFactory::new().with_config(options(crate::bidirectional_factory::NAME)),
        )),
        RuleKind::Type(Box::new(
            ExclusiveRegistrationEntryPoint::new()
                .with_config(options(crate::exclusive_registration_entry_point::NAME)),
        )),
        RuleKind::Project(Box::new(
            WorkspacePlacement::new().with_config(options(crate::workspace_placement::NAME)),
        )),
    ]
}

/// Looks a rule up by name or code (`"layer-direction"` or `"AC001"`).
#[must_use]
pub fn rule_by_name(config: &Config, name_or_code: &str) -> Option<RuleKind> {
    rules_from_config(config)
        .into_iter()
        .find(|rule| rule.name() == name_or_code || rule.code().eq_ignore_ascii_case(name_or_code))
}
