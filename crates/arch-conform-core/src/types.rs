//! Core types for conformance violations and results.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for conformance violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the check.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a severity name (`"info"`, `"warning"`, `"error"`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" | "warn" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single conformance failure.
///
/// The message and the remediation both name the offending and the referenced
/// entities verbatim, so consumers can assert on substring containment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "AC001").
    pub code: String,
    /// Rule name (e.g., "layer-direction").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Offending project.
    pub project: String,
    /// Offending type or reference inside the project.
    pub subject: String,
    /// Human-readable message.
    pub message: String,
    /// How to fix it.
    pub remediation: String,
    /// Reference to the architecture documentation for the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<String>,
    /// Manifest of the offending project, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        project: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let project = project.into();
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            subject: project.clone(),
            project,
            message: message.into(),
            remediation: String::new(),
            doc_ref: None,
            manifest: None,
        }
    }

    /// Sets the offending type or reference.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the remediation hint.
    #[must_use]
    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    /// Adds a design document reference to this violation.
    #[must_use]
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// Attaches the manifest path of the offending project.
    #[must_use]
    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("{} {} in {}", self.code, self.rule, self.project);
        if self.subject != self.project {
            let _ = write!(output, " ({})", self.subject);
        }
        output.push('\n');
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if !self.remediation.is_empty() {
            let _ = writeln!(output, "  = help: {}", self.remediation);
        }
        if let Some(doc_ref) = &self.doc_ref {
            let _ = writeln!(output, "  = see: {doc_ref}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.project, self.severity, self.code, self.message
        )?;
        if let Some(doc_ref) = &self.doc_ref {
            write!(f, " (see: {doc_ref})")?;
        }
        Ok(())
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("[{code}] {message}")]
pub struct ViolationDiagnostic {
    code: String,
    message: String,
    #[help]
    help: Option<String>,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            code: v.code.clone(),
            message: v.message.clone(),
            help: (!v.remediation.is_empty()).then(|| v.remediation.clone()),
        }
    }
}

/// Outcome of one rule for one relevant subject (a reference, a type or a project).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum TypeAnalysisResult {
    /// The subject conforms.
    Passed {
        /// Project the subject belongs to.
        project: String,
        /// Checked reference, type or project name.
        subject: String,
    },
    /// The subject does not conform.
    Failed(Violation),
}

impl TypeAnalysisResult {
    /// Creates a passed result.
    #[must_use]
    pub fn passed(project: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::Passed {
            project: project.into(),
            subject: subject.into(),
        }
    }

    /// Returns true if the subject conforms.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    /// Returns the violation of a failed result.
    #[must_use]
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Passed { .. } => None,
            Self::Failed(v) => Some(v),
        }
    }

    /// Returns the project the result is about.
    #[must_use]
    pub fn project(&self) -> &str {
        match self {
            Self::Passed { project, .. } => project,
            Self::Failed(v) => &v.project,
        }
    }

    /// Returns the subject the result is about.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Passed { subject, .. } => subject,
            Self::Failed(v) => &v.subject,
        }
    }
}

/// All results of one rule invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleAnalysisResult {
    /// Rule name.
    pub rule: String,
    /// Rule code.
    pub code: String,
    /// Per-subject results.
    pub results: Vec<TypeAnalysisResult>,
}

impl RuleAnalysisResult {
    /// Creates a result set for the given rule.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        code: impl Into<String>,
        results: Vec<TypeAnalysisResult>,
    ) -> Self {
        Self {
            rule: rule.into(),
            code: code.into(),
            results,
        }
    }

    /// Iterates over the violations of this rule.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.results.iter().filter_map(TypeAnalysisResult::violation)
    }

    /// Number of passed results.
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_passed()).count()
    }

    /// Returns true if no result failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.results.iter().all(TypeAnalysisResult::is_passed)
    }
}

/// Result of one analysis pass.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One entry per executed rule.
    pub results: Vec<RuleAnalysisResult>,
    /// Number of projects in the pass.
    pub projects_checked: usize,
}

impl AnalysisReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over every violation in the report.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.results.iter().flat_map(RuleAnalysisResult::violations)
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        self.violations()
            .fold((0, 0, 0), |(e, w, i), v| match v.severity {
                Severity::Error => (e + 1, w, i),
                Severity::Warning => (e, w + 1, i),
                Severity::Info => (e, w, i + 1),
            })
    }

    /// Prints a summary report to stdout.
    pub fn print_report(&self) {
        let (errors, warnings, infos) = self.count_by_severity();

        for violation in self.violations() {
            println!("{}", violation.format());
        }

        println!(
            "\nFound {errors} error(s), {warnings} warning(s), {infos} info(s) in {} project(s)",
            self.projects_checked
        );
    }

    /// Formats violations as a test failure report.
    ///
    /// Produces a human-readable multi-line report suitable for `panic!()` messages
    /// in `cargo test` integration.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<&Violation> = self.violations().filter(|v| v.severity >= fail_on).collect();

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== arch-conform: {} violation(s) ===\n",
            failing.len()
        );

        for v in &failing {
            let _ = writeln!(report, "{}", v.format());
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {errors} error(s), {warnings} warning(s), {infos} info(s) in {} project(s)",
            self.projects_checked
        );

        report
    }
}
