use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::{HashSet, HashMap};
use std::fs;
use tracing::info;

use crate::common::{Agent, AgentStatus, Location, Task};
use crate::map::Map;

#[derive(Debug, Deserialize)]
pub struct MapSpec {
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub obstacles: Vec<Location>,
}

#[derive(Debug, Deserialize)]
pub struct AgentSpec {
    pub location: Location,
    pub target: Location,
    /// Present when the agent is carrying a task assignment; absent = idle.
    #[serde(default)]
    pub task: Option<Task>,
}

/// One planning-window input: the static map plus the fleet's dynamic state
/// as handed over by the control loop.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub map: MapSpec,
    pub agents: Vec<AgentSpec>,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> Result<Scenario> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Scenario> {
        serde_yaml::from_str(contents).context("malformed scenario YAML")
    }

    /// Builds and validates the planning instance. Malformed input is
    /// rejected here, before any search starts.
    pub fn build(&self) -> Result<(Map, Vec<Agent>)> {
        let map = Map::new(
            self.map.width,
            self.map.height,
            self.map.obstacles.iter().copied().collect(),
        )?;

        let agents: Vec<Agent> = self
            .agents
            .iter()
            .enumerate()
            .map(|(id, spec)| Agent {
                id,
                location: spec.location,
                target: spec.target,
                status: match spec.task {
                    Some(task) => AgentStatus::Active(task),
                    None => AgentStatus::Idle,
                },
            })
            .collect();

        validate_instance(&map, &agents)?;
        info!("loaded scenario with {} agents", agents.len());
        Ok((map, agents))
    }
}

/// Boundary checks shared by the binary and library callers: ids dense and
/// unique, every declared cell on the map and off the obstacles, no two
/// agents on the same cell.
pub fn validate_instance(map: &Map, agents: &[Agent]) -> Result<()> {
    let mut occupied: HashMap<Location, usize> = HashMap::new();
    let mut seen_ids = HashSet::new();

    for (index, agent) in agents.iter().enumerate() {
        if agent.id != index || !seen_ids.insert(agent.id) {
            return Err(anyhow!(
                "agent ids must be unique and dense, got id {} at index {index}",
                agent.id
            ));
        }
        if !map.passable(agent.location) {
            return Err(anyhow!(
                "agent {} starts on an obstacle or out of bounds at {:?}",
                agent.id,
                agent.location
            ));
        }
        if !map.passable(agent.target) {
            return Err(anyhow!(
                "agent {} targets an obstacle or out-of-bounds cell {:?}",
                agent.id,
                agent.target
            ));
        }
        if let Some(&other) = occupied.get(&agent.location) {
            return Err(anyhow!(
                "agents {other} and {} share the start cell {:?}",
                agent.id,
                agent.location
            ));
        }
        occupied.insert(agent.location, agent.id);

        if let AgentStatus::Active(task) = agent.status {
            for endpoint in [task.shelf, task.station, task.parking] {
                if !map.in_bounds(endpoint) {
                    return Err(anyhow!(
                        "agent {} has task endpoint {endpoint:?} out of bounds",
                        agent.id
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
map:
  width: 4
  height: 3
  obstacles:
    - { x: 2, y: 1 }
agents:
  - location: { x: 0, y: 0 }
    target: { x: 3, y: 2 }
    task:
      shelf: { x: 3, y: 2 }
      station: { x: 0, y: 2 }
      parking: { x: 0, y: 0 }
  - location: { x: 3, y: 0 }
    target: { x: 0, y: 1 }
"#;

    #[test]
    fn test_load_scenario() {
        let scenario = Scenario::from_yaml_str(SCENARIO).unwrap();
        let (map, agents) = scenario.build().unwrap();

        assert_eq!(map.width, 4);
        assert_eq!(map.height, 3);
        assert!(!map.passable(Location::new(2, 1)));

        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].id, 0);
        assert!(matches!(agents[0].status, AgentStatus::Active(_)));
        assert!(agents[0].is_exempt(Location::new(0, 2)));
        assert_eq!(agents[1].status, AgentStatus::Idle);
    }

    #[test]
    fn test_rejects_agent_on_obstacle() {
        let scenario = Scenario::from_yaml_str(
            r#"
map:
  width: 3
  height: 3
  obstacles:
    - { x: 1, y: 1 }
agents:
  - location: { x: 1, y: 1 }
    target: { x: 0, y: 0 }
"#,
        )
        .unwrap();
        assert!(scenario.build().is_err());
    }

    #[test]
    fn test_rejects_negative_dimensions() {
        let scenario = Scenario::from_yaml_str(
            r#"
map:
  width: -2
  height: 3
agents: []
"#,
        )
        .unwrap();
        assert!(scenario.build().is_err());
    }

    #[test]
    fn test_rejects_shared_start_cell() {
        let scenario = Scenario::from_yaml_str(
            r#"
map:
  width: 3
  height: 3
agents:
  - location: { x: 0, y: 0 }
    target: { x: 2, y: 2 }
  - location: { x: 0, y: 0 }
    target: { x: 2, y: 0 }
"#,
        )
        .unwrap();
        assert!(scenario.build().is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let map = Map::new(3, 3, HashSet::new()).unwrap();
        let agent = |id: usize, x: i32| Agent {
            id,
            location: Location::new(x, 0),
            target: Location::new(x, 2),
            status: AgentStatus::Idle,
        };
        assert!(validate_instance(&map, &[agent(0, 0), agent(0, 1)]).is_err());
        assert!(validate_instance(&map, &[agent(0, 0), agent(1, 1)]).is_ok());
    }
}
