//! List rules command implementation.

use arch_conform_rules::all_rules;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!(
        "{:<8} {:<36} {:<14} {:<9} Description",
        "Code", "Name", "Category", "Scope"
    );
    println!("{}", "-".repeat(110));

    for rule in all_rules() {
        let scope = if rule.is_project_level() {
            "project"
        } else {
            "type"
        };
        println!(
            "{:<8} {:<36} {:<14} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.category().to_string(),
            scope,
            rule.description()
        );
    }

    println!("\nRule options and severities are set under [rules.<name>] in arch-conform.toml.");
    println!("\nUse --rules to run a subset, e.g.:");
    println!("  arch-conform check --rules layer-direction,workspace-placement");
    println!("  arch-conform check --rules AC001,AC008");
}
