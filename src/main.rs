//! asymmetric-balancer binary
//!
//! Loads a plan file and checks or simulates weighted selection over it.

use asymmetric_balancer::cli::{self, Cli, Command};
use asymmetric_balancer::config::PlanConfig;
use asymmetric_balancer::{report, telemetry};
use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    match args.command.unwrap_or(Command::Check) {
        Command::Template { output } => {
            let template = cli::generate_plan_template();
            match output {
                Some(path) => {
                    std::fs::write(&path, template)?;
                    eprintln!("Plan template written to {}", path);
                }
                None => print!("{}", template),
            }
        }
        Command::Check => {
            let plan = PlanConfig::from_file(&args.plan)?;
            telemetry::init(&plan.observability.log_level);

            let selector = plan.build_selector()?;
            tracing::info!(
                plan = %args.plan,
                workloads = selector.len(),
                "Plan is valid"
            );
            print!("{}", cli::render_allocations(&selector));
        }
        Command::Simulate { draws, json } => {
            let plan = PlanConfig::from_file(&args.plan)?;
            telemetry::init(&plan.observability.log_level);

            let selector = plan.build_selector()?;
            tracing::info!(
                plan = %args.plan,
                workloads = selector.len(),
                draws = draws,
                "Starting simulation"
            );

            let report = report::simulate(&selector, draws)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", cli::render_report(&report));
            }
        }
    }

    Ok(())
}
