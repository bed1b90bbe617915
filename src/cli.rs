//! Command-line interface for asymmetric-balancer
//!
//! Provides argument parsing, subcommand definitions and text rendering for
//! the `asymmetric-balancer` binary.

use crate::report::SimulationReport;
use crate::selector::WeightedSelector;
use clap::{Parser, Subcommand};

/// Default number of draws for `simulate`
pub const DEFAULT_DRAWS: u64 = 100_000;

/// Percentage-based weighted workload selection
#[derive(Parser)]
#[command(name = "asymmetric-balancer")]
#[command(version)]
#[command(about = "Percentage-based weighted workload selection")]
#[command(
    long_about = "Loads a plan of named workloads with percentage shares, checks that the \
    shares add up to exactly 100%, and simulates weighted random selection over it."
)]
pub struct Cli {
    /// Path to plan file
    #[arg(short, long, default_value = "plan.toml", global = true)]
    pub plan: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate the plan and print its allocation table (default)
    Check,
    /// Run many selections and compare observed frequencies with the plan
    Simulate {
        /// Number of selections to run
        #[arg(short, long, default_value_t = DEFAULT_DRAWS)]
        draws: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a template plan file
    Template {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Render the range table of a selector
pub fn render_allocations<T>(selector: &WeightedSelector<T>) -> String {
    let mut lines = vec![format!(
        "{:<24} {:>11} {:>7} {:>7}",
        "WORKLOAD", "PROBABILITY", "LOWER", "UPPER"
    )];
    lines.extend(selector.entries().enumerate().map(|(index, (entry, allocation))| {
        let name = entry
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", index));
        format!(
            "{:<24} {:>10}% {:>7} {:>7}",
            name,
            entry.probability(),
            allocation.lower_bound(),
            allocation.upper_bound()
        )
    }));
    lines.push(format!("total: {}%", selector.accumulated_percentage()));
    join_lines(lines)
}

/// Render a simulation report as a text table
pub fn render_report(report: &SimulationReport) -> String {
    let mut lines = vec![format!(
        "{:<24} {:>11} {:>10} {:>9} {:>10}",
        "WORKLOAD", "PROBABILITY", "HITS", "OBSERVED", "DEVIATION"
    )];
    lines.extend(report.entries.iter().map(|entry| {
        format!(
            "{:<24} {:>10}% {:>10} {:>8.2}% {:>+10.2}",
            entry.name,
            entry.probability,
            entry.hits,
            entry.observed_percentage,
            entry.deviation()
        )
    }));
    lines.push(format!(
        "draws: {}, max deviation: {:.2} points",
        report.draws,
        report.max_deviation()
    ));
    join_lines(lines)
}

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Generate template plan content
pub fn generate_plan_template() -> &'static str {
    r#"# asymmetric-balancer plan
# ========================
#
# Each [[workloads]] entry gets a percentage share of traffic. Shares are laid
# out on the range 0-99 in the order written here and must add up to exactly
# 100. The last workload may omit `probability` to take whatever remains.

[[workloads]]
name = "stable"
probability = 90

[[workloads]]
name = "canary"
# no probability: receives the remaining 10%

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanConfig;
    use crate::report::EntryReport;
    use clap::CommandFactory;
    use std::str::FromStr;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_plan_path() {
        let cli = Cli::parse_from(["asymmetric-balancer"]);
        assert_eq!(cli.plan, "plan.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn custom_plan_path_after_subcommand() {
        let cli = Cli::parse_from(["asymmetric-balancer", "check", "--plan", "custom.toml"]);
        assert_eq!(cli.plan, "custom.toml");
        assert!(matches!(cli.command, Some(Command::Check)));
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::parse_from(["asymmetric-balancer", "simulate"]);
        assert!(matches!(
            cli.command,
            Some(Command::Simulate { draws: DEFAULT_DRAWS, json: false })
        ));
    }

    #[test]
    fn simulate_with_options() {
        let cli = Cli::parse_from(["asymmetric-balancer", "simulate", "-d", "500", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Command::Simulate { draws: 500, json: true })
        ));
    }

    #[test]
    fn template_subcommand_with_output() {
        let cli = Cli::parse_from(["asymmetric-balancer", "template", "-o", "my-plan.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Template { output: Some(ref path) }) if path == "my-plan.toml"
        ));
    }

    #[test]
    fn template_is_valid_plan() {
        let plan = PlanConfig::from_str(generate_plan_template())
            .expect("template should be a valid plan");
        assert_eq!(plan.workloads.len(), 2);
    }

    #[test]
    fn allocation_table_lists_ranges() {
        let plan = PlanConfig::from_str(generate_plan_template()).expect("valid template");
        let selector = plan.build_selector().expect("builds");
        let table = render_allocations(&selector);

        assert!(table.contains("stable"));
        assert!(table.contains("canary"));
        assert!(table.contains("total: 100%"));
        let canary_line = table
            .lines()
            .find(|l| l.starts_with("canary"))
            .expect("canary row");
        assert!(canary_line.contains("90"));
        assert!(canary_line.contains("99"));
    }

    #[test]
    fn rendered_tables_have_one_line_per_row() {
        let plan = PlanConfig::from_str(generate_plan_template()).expect("valid template");
        let selector = plan.build_selector().expect("builds");

        let table = render_allocations(&selector);
        assert!(table.ends_with("total: 100%\n"));
        assert_eq!(table.lines().count(), 1 + plan.workloads.len() + 1);

        let report = crate::report::simulate(&selector, 100).expect("simulation runs");
        let rendered = render_report(&report);
        assert!(rendered.starts_with("WORKLOAD"));
        assert!(rendered.ends_with(" points\n"));
        assert_eq!(rendered.lines().count(), 1 + report.entries.len() + 1);
    }

    #[test]
    fn report_table_shows_deviation() {
        let report = SimulationReport {
            draws: 1000,
            entries: vec![EntryReport {
                name: "a".to_string(),
                probability: 100,
                lower_bound: 0,
                upper_bound: 99,
                hits: 1000,
                observed_percentage: 100.0,
            }],
        };
        let table = render_report(&report);
        assert!(table.contains("100.00%"));
        assert!(table.contains("draws: 1000, max deviation: 0.00 points"));
    }
}
