use warehouse_mapf::config::{Cli, Config};
use warehouse_mapf::common::Plan;
use warehouse_mapf::scenario::Scenario;
use warehouse_mapf::solver::{Solver, CBS, PBS};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, Level};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();
    let cli = Cli::parse();

    let config = Config::new(&cli);
    config.validate()?;

    let scenario = Scenario::load_from_file(&config.scenario_path)
        .with_context(|| format!("error with scenario file: {}", config.scenario_path))?;
    let (map, agents) = scenario.build()?;

    let mut solver: Box<dyn Solver> = match config.solver.as_str() {
        "cbs" => Box::new(CBS::new(agents.clone(), &map)),
        "pbs" => Box::new(PBS::new(agents.clone(), &map)),
        _ => unreachable!(),
    };

    let plan = match solver.solve(&config) {
        Some(solution) if solution.verify(&map, &agents) => {
            info!("{} found a plan with cost {}", config.solver, solution.cost());
            solution.to_plan()
        }
        Some(_) => {
            // PBS can realize a priority schedule whose exemptions still
            // collide; an unverifiable plan is reported as no plan at all.
            error!("{} returned a plan that fails verification", config.solver);
            Plan::new()
        }
        None => {
            error!("{} found no conflict-free plan", config.solver);
            Plan::new()
        }
    };

    let json = serde_json::to_string_pretty(&plan)?;
    match config.output_path.as_ref() {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("error writing plan to {path}"))?,
        None => println!("{json}"),
    }

    Ok(())
}
