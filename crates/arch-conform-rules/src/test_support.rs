//! Fixture helpers shared by the rule tests.

use arch_conform_core::{
    ProjectManifest, SymbolTable, Topology, TypeAnalysisResult, TypeRule,
    TypeSymbol, UnitContext, Violation, WorkspaceContext,
};
use std::path::PathBuf;

pub fn manifest(name: &str, references: &[&str], packages: &[&str]) -> ProjectManifest {
    ProjectManifest {
        name: name.to_string(),
        path: PathBuf::from(format!("src/{name}/{name}.csproj")),
        references: references.iter().map(ToString::to_string).collect(),
        packages: packages.iter().map(ToString::to_string).collect(),
    }
}

pub fn workspace(manifests: Vec<ProjectManifest>) -> WorkspaceContext {
    WorkspaceContext::from_parts("/workspace", manifests, None)
}

pub fn workspace_with_topology(
    manifests: Vec<ProjectManifest>,
    descriptor: &str,
) -> WorkspaceContext {
    WorkspaceContext::from_parts("/workspace", manifests, Some(Topology::parse(descriptor)))
}

/// Runs a type rule over one project, honoring its layer targeting.
pub fn check_types(
    rule: &dyn TypeRule,
    project: &str,
    types: Vec<TypeSymbol>,
) -> Vec<TypeAnalysisResult> {
    let workspace = WorkspaceContext::default();
    let table = SymbolTable::new(project, types);
    let ctx = UnitContext::new(project, &table, &workspace);
    if rule.applies_to(&ctx) {
        rule.check_unit(&ctx)
    } else {
        Vec::new()
    }
}

pub fn failures(results: &[TypeAnalysisResult]) -> Vec<&Violation> {
    results.iter().filter_map(TypeAnalysisResult::violation).collect()
}

pub fn passed_subjects(results: &[TypeAnalysisResult]) -> Vec<&str> {
    let mut subjects: Vec<&str> = results
        .iter()
        .filter(|r| r.is_passed())
        .map(TypeAnalysisResult::subject)
        .collect();
    subjects.sort_unstable();
    subjects
}
