//! Rule to keep project references flowing in the allowed layer directions.
//!
//! # Rationale
//!
//! Inside one bounded context the layers form a directed chain from the Api
//! down to the persistence technology. A reference against that direction
//! couples an inner layer to an outer one.
//!
//! # Skipped References
//!
//! - either side has an unknown layer
//! - either side has no bounded context, or the contexts differ
//! - the target matches an exempt shared-kernel prefix
//!
//! # Configuration
//!
//! - `exempt_prefixes`: shared-kernel prefixes (default: `["Shared.BuildingBlocks"]`)

use arch_conform_core::layer::same_bounded_context;
use arch_conform_core::{
    Layer, ProjectManifest, ProjectRule, RuleCategory, RuleConfig, RuleInfo, Severity,
    TypeAnalysisResult, WorkspaceContext,
};

use crate::matches_prefix;

/// Rule code for layer-direction.
pub const CODE: &str = "AC001";

/// Rule name for layer-direction.
pub const NAME: &str = "layer-direction";

/// Default shared-kernel prefix.
pub const DEFAULT_EXEMPT_PREFIX: &str = "Shared.BuildingBlocks";

/// Allowed `(from, to)` layer pairs for references inside one bounded context.
pub const ALLOWED_DIRECTIONS: &[(Layer, &[Layer])] = &[
    (Layer::Api, &[Layer::Application, Layer::Bootstrapper]),
    (Layer::Application, &[Layer::Domain]),
    (Layer::Domain, &[Layer::DomainEntities, Layer::InfraData]),
    (Layer::InfraData, &[Layer::DomainEntities, Layer::InfraDataTech]),
    (Layer::InfraDataTech, &[Layer::Configuration]),
    (
        Layer::Bootstrapper,
        &[
            Layer::Application,
            Layer::Domain,
            Layer::DomainEntities,
            Layer::InfraData,
            Layer::InfraDataTech,
            Layer::Configuration,
        ],
    ),
];

/// Returns the layers `from` may reference.
#[must_use]
pub fn allowed_targets(from: Layer) -> &'static [Layer] {
    ALLOWED_DIRECTIONS
        .iter()
        .find(|(layer, _)| *layer == from)
        .map_or(&[], |(_, targets)| *targets)
}

/// Returns true when a reference from `from` to `to` is allowed.
#[must_use]
pub fn is_allowed(from: Layer, to: Layer) -> bool {
    allowed_targets(from).contains(&to)
}

/// Checks the direction of every project reference.
#[derive(Debug, Clone)]
pub struct LayerDirection {
    /// Severity level.
    pub severity: Severity,
    /// Reference targets under these prefixes are never checked.
    pub exempt_prefixes: Vec<String>,
}

impl Default for LayerDirection {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerDirection {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            exempt_prefixes: vec![DEFAULT_EXEMPT_PREFIX.to_string()],
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Replaces the exempt shared-kernel prefixes.
    #[must_use]
    pub fn exempt_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exempt_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Applies `[rules.layer-direction]` options.
    #[must_use]
    pub fn with_config(self, config: &RuleConfig) -> Self {
        match config.get_str_array("exempt_prefixes") {
            Some(prefixes) => self.exempt_prefixes(prefixes),
            None => self,
        }
    }

    fn is_exempt(&self, target: &str) -> bool {
        self.exempt_prefixes
            .iter()
            .any(|prefix| matches_prefix(target, prefix))
    }

    /// Verdict for one reference; `None` when the reference is skipped.
    fn check_reference(
        &self,
        manifest: &ProjectManifest,
        target: &str,
    ) -> Option<TypeAnalysisResult> {
        let source = manifest.name.as_str();
        let (from, to) = (Layer::classify(source), Layer::classify(target));
        if !from.is_known() || !to.is_known() {
            return None;
        }
        if !same_bounded_context(source, target) || self.is_exempt(target) {
            return None;
        }

        if is_allowed(from, to) {
            return Some(TypeAnalysisResult::passed(source, target));
        }

        let allowed = allowed_targets(from)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        let remediation = if allowed.is_empty() {
            format!("Remove the reference from {source} to {target}; {from} projects reference no other layer")
        } else {
            format!(
                "Remove the reference from {source} to {target}; {from} may only reference {}",
                allowed.join(", ")
            )
        };

        Some(TypeAnalysisResult::Failed(
            self.violation(
                source,
                format!("{source} ({from}) must not reference {target} ({to})"),
            )
            .with_subject(target)
            .with_remediation(remediation)
            .with_manifest(Some(manifest.path.clone())),
        ))
    }
}

impl RuleInfo for LayerDirection {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Project references must follow the allowed layer directions"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Layering
    }
}

impl ProjectRule for LayerDirection {
    fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult> {
        ctx.project_manifests()
            .flat_map(|manifest| {
                manifest
                    .references
                    .iter()
                    .filter_map(move |target| self.check_reference(manifest, target))
            })
            .collect()
    }
}
