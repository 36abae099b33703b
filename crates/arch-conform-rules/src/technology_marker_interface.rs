//! Rule to check the technology marker interfaces of a technology project.
//!
//! Every persistence-technology project declares its marker interfaces in
//! `<Project>.Markers`. Each marker must extend the root marker and declare
//! no members: markers only tag types, they never carry behavior.
//!
//! # Configuration
//!
//! - `markers_namespace`: namespace segment below the project (default: `"Markers"`)
//! - `root_marker`: the root marker interface (default: `"ITechnologyMarker"`)

use arch_conform_core::{
    Layer, RuleCategory, RuleConfig, RuleInfo, Severity, TypeAnalysisResult, TypeRule,
    TypeSymbol, UnitContext,
};

/// Rule code for technology-marker-interface.
pub const CODE: &str = "AC003";

/// Rule name for technology-marker-interface.
pub const NAME: &str = "technology-marker-interface";

/// Default namespace segment holding the markers.
pub const DEFAULT_MARKERS_NAMESPACE: &str = "Markers";

/// Default root marker interface.
pub const DEFAULT_ROOT_MARKER: &str = "ITechnologyMarker";

/// Checks the marker interfaces of technology projects.
#[derive(Debug, Clone)]
pub struct TechnologyMarkerInterface {
    /// Severity level.
    pub severity: Severity,
    /// Namespace segment below the project holding the markers.
    pub markers_namespace: String,
    /// Interface every marker must extend.
    pub root_marker: String,
}

impl Default for TechnologyMarkerInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl TechnologyMarkerInterface {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
            markers_namespace: DEFAULT_MARKERS_NAMESPACE.to_string(),
            root_marker: DEFAULT_ROOT_MARKER.to_string(),
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the namespace segment holding the markers.
    #[must_use]
    pub fn markers_namespace(mut self, segment: impl Into<String>) -> Self {
        self.markers_namespace = segment.into();
        self
    }

    /// Sets the root marker interface.
    #[must_use]
    pub fn root_marker(mut self, name: impl Into<String>) -> Self {
        self.root_marker = name.into();
        self
    }

    /// Applies `[rules.technology-marker-interface]` options.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        if let Some(segment) = config.get_string("markers_namespace") {
            self.markers_namespace = segment;
        }
        if let Some(root) = config.get_string("root_marker") {
            self.root_marker = root;
        }
        self
    }

    fn check_marker(&self, ctx: &UnitContext<'_>, marker: &TypeSymbol) -> TypeAnalysisResult {
        let reaches_root =
            marker.name == self.root_marker || ctx.symbols.inherits_from(marker, &self.root_marker);

        if !reaches_root {
            return TypeAnalysisResult::Failed(
                self.violation(
                    ctx.project,
                    format!(
                        "Marker interface {} does not extend {}",
                        marker.full_name(),
                        self.root_marker
                    ),
                )
                .with_subject(&marker.name)
                .with_remediation(format!(
                    "Make {} extend {} directly or through a bounded-context marker",
                    marker.name, self.root_marker
                ))
                .with_manifest(ctx.manifest_path()),
            );
        }

        if !marker.members.is_empty() {
            let members: Vec<&str> = marker.members.iter().map(|m| m.name.as_str()).collect();
            return TypeAnalysisResult::Failed(
                self.violation(
                    ctx.project,
                    format!(
                        "Marker interface {} declares members: {}",
                        marker.full_name(),
                        members.join(", ")
                    ),
                )
                .with_subject(&marker.name)
                .with_remediation(format!(
                    "Remove the members from {}; markers only tag implementations",
                    marker.name
                ))
                .with_manifest(ctx.manifest_path()),
            );
        }

        TypeAnalysisResult::passed(ctx.project, &marker.name)
    }
}

impl RuleInfo for TechnologyMarkerInterface {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Technology markers must extend the root marker and declare no members"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Technology
    }
}

impl TypeRule for TechnologyMarkerInterface {
    fn target_layers(&self) -> &'static [Layer] {
        &[Layer::InfraDataTech]
    }

    fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult> {
        let namespace = ctx.sub_namespace(&self.markers_namespace);
        let markers: Vec<&TypeSymbol> = ctx.symbols.interfaces_in_namespace(&namespace).collect();

        if markers.is_empty() {
            return vec![TypeAnalysisResult::Failed(
                self.violation(
                    ctx.project,
                    format!("{} declares no marker interface in {namespace}", ctx.project),
                )
                .with_subject(&namespace)
                .with_remediation(format!(
                    "Declare a member-less interface extending {} in {namespace}",
                    self.root_marker
                ))
                .with_manifest(ctx.manifest_path()),
            )];
        }

        markers
            .into_iter()
            .map(|marker| self.check_marker(ctx, marker))
            .collect()
    }
}
