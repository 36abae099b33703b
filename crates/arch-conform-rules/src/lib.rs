//! # arch-conform-rules
//!
//! Built-in conformance rules for arch-conform.
//!
//! Each rule checks one convention of the layered, bounded-context
//! architecture. Project rules read manifests and the workspace descriptor;
//! type rules read the symbol model of one compiled project.
//!
//! ## Available Rules
//!
//! | Code | Name | Shape | Description |
//! |------|------|-------|-------------|
//! | AC001 | `layer-direction` | project | References only follow allowed layer directions |
//! | AC002 | `zero-external-dependency` | project | Pure layers reference nothing external |
//! | AC003 | `technology-marker-interface` | type | Technology markers are member-less and reach the root marker |
//! | AC004 | `sealed-technology-implementation` | type | Technology implementations are sealed and correctly based |
//! | AC005 | `data-namespace-completeness` | type | Data projects declare every sibling namespace |
//! | AC006 | `bidirectional-factory` | type | Every data model has forward and reverse factories |
//! | AC007 | `exclusive-registration-entry-point` | type | Only the entry point touches the service container |
//! | AC008 | `workspace-placement` | project | Projects sit in their layer and bounded-context folders |
//!
//! ## Usage
//!
//! ```ignore
//! use arch_conform_core::Analyzer;
//! use arch_conform_rules::{LayerDirection, WorkspacePlacement};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./backend")
//!     .project_rule(LayerDirection::new())
//!     .project_rule(WorkspacePlacement::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bidirectional_factory;
mod data_model;
mod data_namespace_completeness;
mod exclusive_registration_entry_point;
mod layer_direction;
mod presets;
mod sealed_technology_implementation;
mod technology_marker_interface;
mod workspace_placement;
mod zero_external_dependency;

#[cfg(test)]
mod test_support;

pub use bidirectional_factory::BidirectionalFactory;
pub use data_namespace_completeness::DataNamespaceCompleteness;
pub use exclusive_registration_entry_point::ExclusiveRegistrationEntryPoint;
pub use layer_direction::{is_allowed, LayerDirection, ALLOWED_DIRECTIONS};
pub use presets::{all_rules, rule_by_name, rules_from_config};
pub use sealed_technology_implementation::SealedTechnologyImplementation;
pub use technology_marker_interface::TechnologyMarkerInterface;
pub use workspace_placement::{layer_folder, WorkspacePlacement};
pub use zero_external_dependency::ZeroExternalDependency;

/// Re-export core types for convenience.
pub use arch_conform_core::{ProjectRule, RuleKind, Severity, TypeRule, Violation};

/// Returns true when `name` equals `prefix` or lies below it (`prefix.` + more).
pub(crate) fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
