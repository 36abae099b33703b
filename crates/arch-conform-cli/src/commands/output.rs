//! Shared output formatting for check results.

use anyhow::Result;
use arch_conform_core::{AnalysisReport, Severity, ViolationDiagnostic};

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
        OutputFormat::Pretty => print_pretty(report),
    }
    Ok(())
}

fn print_text(report: &AnalysisReport) {
    let (errors, warnings, infos) = report.count_by_severity();

    for violation in report.violations() {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        match &violation.manifest {
            Some(manifest) => println!(
                "{} {} in {} ({})",
                violation.code,
                violation.rule,
                violation.project,
                manifest.display()
            ),
            None => println!(
                "{} {} in {}",
                violation.code, violation.rule, violation.project
            ),
        }
        println!("  {}: {}", severity_indicator, violation.message);
        if !violation.remediation.is_empty() {
            println!("  = help: {}", violation.remediation);
        }
        if let Some(doc_ref) = &violation.doc_ref {
            println!("  = see: {doc_ref}");
        }
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} project(s)\x1b[0m",
        summary_color, errors, warnings, infos, report.projects_checked
    );
}

fn print_json(report: &AnalysisReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &AnalysisReport) {
    for violation in report.violations() {
        println!("{violation}");
    }
}

fn print_pretty(report: &AnalysisReport) {
    for violation in report.violations() {
        let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation));
        eprintln!("{}: {diagnostic:?}", violation.project);
    }

    let (errors, warnings, infos) = report.count_by_severity();
    eprintln!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} project(s)",
        report.projects_checked
    );
}
