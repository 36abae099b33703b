//! # arch-conform-core
//!
//! Core framework for checking a layered, bounded-context workspace
//! against its architecture conventions.
//!
//! This crate provides the foundational traits and types for building
//! conformance rules. It includes:
//!
//! - [`ProjectRule`] trait for rules over manifests and the workspace topology
//! - [`TypeRule`] trait for rules over one compiled project's symbols
//! - [`Analyzer`] for orchestrating a conformance pass
//! - [`Violation`] and [`TypeAnalysisResult`] for representing findings
//!
//! ## Example
//!
//! ```ignore
//! use arch_conform_core::{Analyzer, SymbolTable};
//!
//! let units = SymbolTable::load_dir("artifacts/symbols".as_ref())?;
//! let analyzer = Analyzer::builder()
//!     .root("./backend")
//!     .project_rule(MyRule::new())
//!     .build()?;
//!
//! let report = analyzer.analyze(&units);
//! report.print_report();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod rule;
mod types;

pub mod layer;
pub mod manifest;
pub mod symbols;
pub mod topology;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::{UnitContext, WorkspaceContext};
pub use layer::Layer;
pub use manifest::ProjectManifest;
pub use rule::{
    ProjectRule, ProjectRuleBox, RuleCategory, RuleInfo, RuleKind, TypeRule, TypeRuleBox,
};
pub use symbols::{
    CompiledUnit, CompiledUnitBox, MemberKind, MemberSymbol, SymbolModel, SymbolTable, TypeKind,
    TypeSymbol, Visibility,
};
pub use topology::{Placement, Topology};
pub use types::{
    AnalysisReport, RuleAnalysisResult, Severity, TypeAnalysisResult, Violation,
    ViolationDiagnostic,
};
