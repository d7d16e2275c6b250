use anyhow::anyhow;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "Warehouse MAPF",
    about = "Collision-free fleet planning for grid warehouses (CBS and PBS).",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to the YAML scenario file")]
    pub scenario_path: String,

    #[arg(long, help = "Solver to use (cbs or pbs)", default_value = "cbs")]
    pub solver: String,

    #[arg(
        long,
        help = "Seed for the random number generator",
        default_value_t = 0
    )]
    pub seed: u64,

    #[arg(long, help = "Path to write the plan JSON; stdout if omitted")]
    pub output_path: Option<String>,

    #[arg(
        long,
        help = "Total PBS ordering attempts, the initial one included",
        default_value_t = 5
    )]
    pub pbs_retries: usize,

    #[arg(
        long,
        help = "Cap on CBS high-level node expansions",
        default_value_t = 100_000
    )]
    pub max_expansions: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scenario_path: String,
    pub solver: String,
    pub seed: u64,
    pub output_path: Option<String>,
    pub pbs_retries: usize,
    pub max_expansions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scenario_path: String::new(),
            solver: "cbs".to_string(),
            seed: 0,
            output_path: None,
            pbs_retries: 5,
            max_expansions: 100_000,
        }
    }
}

impl Config {
    pub fn new(cli: &Cli) -> Self {
        Self {
            scenario_path: cli.scenario_path.clone(),
            solver: cli.solver.clone(),
            seed: cli.seed,
            output_path: cli.output_path.clone(),
            pbs_retries: cli.pbs_retries,
            max_expansions: cli.max_expansions,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self.solver.as_str() {
            "cbs" | "pbs" => {}
            other => return Err(anyhow!("unknown solver {other:?}, expected cbs or pbs")),
        }
        if self.pbs_retries == 0 {
            return Err(anyhow!("pbs_retries must be at least 1"));
        }
        if self.max_expansions == 0 {
            return Err(anyhow!("max_expansions must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let bad_solver = Config {
            solver: "ecbs".to_string(),
            ..Config::default()
        };
        assert!(bad_solver.validate().is_err());

        let no_retries = Config {
            pbs_retries: 0,
            ..Config::default()
        };
        assert!(no_retries.validate().is_err());
    }
}
