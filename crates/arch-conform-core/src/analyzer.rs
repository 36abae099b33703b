//! Core analyzer for orchestrating conformance checks.

use crate::config::Config;
use crate::context::{UnitContext, WorkspaceContext};
use crate::rule::{ProjectRule, ProjectRuleBox, RuleKind, TypeRule, TypeRuleBox};
use crate::symbols::CompiledUnit;
use crate::types::{AnalysisReport, RuleAnalysisResult, TypeAnalysisResult};

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while setting up an analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving the workspace root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Symbol table error.
    #[error("Symbol table error: {0}")]
    Symbols(#[from] crate::symbols::SymbolLoadError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleKind>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workspace root to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a project-level rule to the analyzer.
    #[must_use]
    pub fn project_rule<R: ProjectRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(RuleKind::Project(Box::new(rule)));
        self
    }

    /// Adds a boxed project-level rule to the analyzer.
    #[must_use]
    pub fn project_rule_box(mut self, rule: ProjectRuleBox) -> Self {
        self.rules.push(RuleKind::Project(rule));
        self
    }

    /// Adds a type-level rule to the analyzer.
    #[must_use]
    pub fn type_rule<R: TypeRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(RuleKind::Type(Box::new(rule)));
        self
    }

    /// Adds a boxed type-level rule to the analyzer.
    #[must_use]
    pub fn type_rule_box(mut self, rule: TypeRuleBox) -> Self {
        self.rules.push(RuleKind::Type(rule));
        self
    }

    /// Adds a rule of either shape.
    #[must_use]
    pub fn rule(mut self, rule: RuleKind) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several rules of either shape.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleKind>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern for manifest discovery.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if a relative root cannot be resolved against the
    /// current directory.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let config = self.config.unwrap_or_default();
        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude_patterns,
            config,
        })
    }
}

/// The main analyzer that orchestrates a conformance pass.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleKind>,
    exclude_patterns: Vec<String>,
    config: Config,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the workspace root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Runs every enabled rule over the compiled units.
    ///
    /// Manifests and the topology are read once up front. Missing or
    /// malformed inputs make the affected rules inapplicable instead of
    /// failing the pass.
    #[must_use]
    pub fn analyze<U>(&self, units: &BTreeMap<String, U>) -> AnalysisReport
    where
        U: AsRef<dyn CompiledUnit> + Sync,
    {
        info!("Starting analysis at {:?}", self.root);

        let workspace =
            WorkspaceContext::load(&self.root, units.keys().cloned(), &self.exclude_patterns);
        self.analyze_with(&workspace, units)
    }

    /// Like [`Analyzer::analyze`], but every manifest found under the root
    /// joins the pass, compiled or not.
    ///
    /// Project rules then cover the whole workspace even when symbol tables
    /// exist for only some projects (or none).
    #[must_use]
    pub fn analyze_discovered<U>(&self, units: &BTreeMap<String, U>) -> AnalysisReport
    where
        U: AsRef<dyn CompiledUnit> + Sync,
    {
        info!("Starting workspace-wide analysis at {:?}", self.root);

        let workspace =
            WorkspaceContext::discover(&self.root, units.keys().cloned(), &self.exclude_patterns);
        self.analyze_with(&workspace, units)
    }

    /// Runs every enabled rule against an already-loaded workspace snapshot.
    #[must_use]
    pub fn analyze_with<U>(
        &self,
        workspace: &WorkspaceContext,
        units: &BTreeMap<String, U>,
    ) -> AnalysisReport
    where
        U: AsRef<dyn CompiledUnit> + Sync,
    {
        let enabled: Vec<&RuleKind> = self
            .rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .collect();

        let run = |rule: &&RuleKind| self.run_rule(rule, workspace, units);
        let results: Vec<RuleAnalysisResult> = if self.config.analyzer.parallel {
            enabled.par_iter().map(run).collect()
        } else {
            enabled.iter().map(run).collect()
        };

        let report = AnalysisReport {
            results,
            projects_checked: workspace.projects.len().max(units.len()),
        };

        let (errors, warnings, infos) = report.count_by_severity();
        info!(
            "Analysis complete: {errors} error(s), {warnings} warning(s), {infos} info(s) from {} rule(s)",
            report.results.len()
        );

        report
    }

    fn run_rule<U>(
        &self,
        rule: &RuleKind,
        workspace: &WorkspaceContext,
        units: &BTreeMap<String, U>,
    ) -> RuleAnalysisResult
    where
        U: AsRef<dyn CompiledUnit> + Sync,
    {
        let results = match rule {
            RuleKind::Project(rule) => rule.check_workspace(workspace),
            RuleKind::Type(rule) => units
                .iter()
                .flat_map(|(name, unit)| {
                    let ctx = UnitContext::new(name, unit.as_ref(), workspace);
                    if rule.applies_to(&ctx) {
                        rule.check_unit(&ctx)
                    } else {
                        Vec::new()
                    }
                })
                .collect(),
        };

        debug!("{} produced {} result(s)", rule.name(), results.len());
        RuleAnalysisResult::new(
            rule.name(),
            rule.code(),
            self.apply_severity_override(rule.name(), results),
        )
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut results: Vec<TypeAnalysisResult>,
    ) -> Vec<TypeAnalysisResult> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for result in &mut results {
                if let TypeAnalysisResult::Failed(v) = result {
                    v.severity = severity;
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;
    use crate::rule::{RuleCategory, RuleInfo};
    use crate::symbols::{CompiledUnitBox, SymbolTable, TypeSymbol};
    use crate::types::Severity;

    struct EveryProject;

    impl RuleInfo for EveryProject {
        fn name(&self) -> &'static str {
            "every-project"
        }
        fn code(&self) -> &'static str {
            "T001"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Workspace
        }
    }

    impl ProjectRule for EveryProject {
        fn check_workspace(&self, ctx: &WorkspaceContext) -> Vec<TypeAnalysisResult> {
            ctx.projects
                .iter()
                .map(|p| TypeAnalysisResult::Failed(self.violation(p, format!("{p} seen"))))
                .collect()
        }
    }

    struct DomainTypes;

    impl RuleInfo for DomainTypes {
        fn name(&self) -> &'static str {
            "domain-types"
        }
        fn code(&self) -> &'static str {
            "T002"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Layering
        }
    }

    impl TypeRule for DomainTypes {
        fn target_layers(&self) -> &'static [Layer] {
            &[Layer::Domain]
        }

        fn check_unit(&self, ctx: &UnitContext<'_>) -> Vec<TypeAnalysisResult> {
            ctx.symbols
                .types()
                .iter()
                .map(|t| TypeAnalysisResult::passed(ctx.project, &t.name))
                .collect()
        }
    }

    fn units() -> BTreeMap<String, CompiledUnitBox> {
        let mut units: BTreeMap<String, CompiledUnitBox> = BTreeMap::new();
        for (name, ty) in [("A.B.Domain", "OrderService"), ("A.B.Api", "OrdersController")] {
            units.insert(
                name.to_string(),
                Box::new(SymbolTable::new(name, vec![TypeSymbol::class(name, ty)])),
            );
        }
        units
    }

    fn temp_analyzer(config: Config) -> (tempfile::TempDir, Analyzer) {
        let dir = tempfile::tempdir().expect("tempdir");
        let analyzer = Analyzer::builder()
            .root(dir.path())
            .config(config)
            .project_rule(EveryProject)
            .type_rule(DomainTypes)
            .build()
            .expect("Failed to build analyzer");
        (dir, analyzer)
    }

    #[test]
    fn missing_root_only_disables_workspace_inputs() {
        let analyzer = Analyzer::builder()
            .root("/definitely/not/here")
            .type_rule(DomainTypes)
            .build()
            .expect("Failed to build analyzer");
        let report = analyzer.analyze(&units());
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].results.len(), 1);
    }

    #[test]
    fn discovered_manifests_join_the_pass() {
        let (dir, analyzer) = temp_analyzer(Config::default());
        let path = dir.path().join("src").join("A.B.Application");
        std::fs::create_dir_all(&path).expect("mkdir");
        std::fs::write(path.join("A.B.Application.csproj"), "<Project></Project>")
            .expect("write");

        let report = analyzer.analyze_discovered(&units());
        assert_eq!(report.projects_checked, 3);
        let every = report
            .results
            .iter()
            .find(|r| r.rule == "every-project")
            .expect("ran");
        assert_eq!(every.violations().count(), 3);
    }

    #[test]
    fn runs_both_rule_shapes() {
        let (_dir, analyzer) = temp_analyzer(Config::default());
        assert_eq!(analyzer.rule_count(), 2);

        let report = analyzer.analyze(&units());
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.projects_checked, 2);

        let by_rule: BTreeMap<&str, &RuleAnalysisResult> =
            report.results.iter().map(|r| (r.rule.as_str(), r)).collect();
        assert_eq!(by_rule["every-project"].violations().count(), 2);

        let domain = by_rule["domain-types"];
        assert_eq!(domain.results.len(), 1);
        assert_eq!(domain.results[0].subject(), "OrderService");
    }

    #[test]
    fn disabled_rules_do_not_run() {
        let config = Config::parse("[rules.every-project]\nenabled = false\n").expect("parse");
        let (_dir, analyzer) = temp_analyzer(config);
        let report = analyzer.analyze(&units());
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].rule, "domain-types");
    }

    #[test]
    fn severity_override_applies_to_failures() {
        let config = Config::parse(
            "[analyzer]\nparallel = false\n[rules.every-project]\nseverity = \"info\"\n",
        )
        .expect("parse");
        let (_dir, analyzer) = temp_analyzer(config);
        let report = analyzer.analyze(&units());
        assert!(report.violations().all(|v| v.severity == Severity::Info));
        assert!(!report.has_errors());
    }
}
