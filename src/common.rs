use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::map::Map;
use crate::solver::first_conflict;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    pub fn manhattan_distance(&self, other: Location) -> usize {
        self.x.abs_diff(other.x) as usize + self.y.abs_diff(other.y) as usize
    }
}

/// Time-indexed path: entry `i` is the agent's location at timestep `i`.
pub type Path = Vec<Location>;

/// Endpoints an active agent cycles through while serving an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub shelf: Location,
    pub station: Location,
    pub parking: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    Idle,
    Active(Task),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: usize,
    pub location: Location,
    pub target: Location,
    pub status: AgentStatus,
}

impl Agent {
    /// Cells this agent may always enter, regardless of vertex or edge
    /// constraints: its own cell while idle, its task endpoints while active.
    pub fn is_exempt(&self, location: Location) -> bool {
        match self.status {
            AgentStatus::Idle => location == self.location,
            AgentStatus::Active(task) => {
                location == task.shelf || location == task.station || location == task.parking
            }
        }
    }

    pub fn verify(&self, map: &Map) -> bool {
        map.passable(self.location) && map.passable(self.target)
    }
}

/// One record of the emitted plan, time made explicit again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub t: usize,
    pub x: i32,
    pub y: i32,
}

/// Final output contract: agent id to its timed route. Empty when the
/// search was exhausted without a conflict-free joint solution.
pub type Plan = BTreeMap<usize, Vec<PlanStep>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub paths: Vec<Path>, // indexed by agent id
}

impl Solution {
    /// Sum of path lengths, counting the start pose of every agent.
    pub fn cost(&self) -> usize {
        self.paths.iter().map(|path| path.len()).sum()
    }

    pub fn to_plan(&self) -> Plan {
        self.paths
            .iter()
            .enumerate()
            .map(|(agent_id, path)| {
                let steps = path
                    .iter()
                    .enumerate()
                    .map(|(t, location)| PlanStep {
                        t,
                        x: location.x,
                        y: location.y,
                    })
                    .collect();
                (agent_id, steps)
            })
            .collect()
    }

    /// Full check of the output contract: one path per agent, each starting
    /// at the agent's location and ending at its target, staying on passable
    /// cells, moving at most one cell per step, with no vertex or swap
    /// collision between any pair.
    pub fn verify(&self, map: &Map, agents: &[Agent]) -> bool {
        if self.paths.len() != agents.len() {
            return false;
        }
        for agent in agents {
            let path = &self.paths[agent.id];
            if path.is_empty() {
                return false;
            }
            if path[0] != agent.location || *path.last().unwrap() != agent.target {
                return false;
            }
            if !path.iter().all(|&location| map.passable(location)) {
                return false;
            }
            if path
                .windows(2)
                .any(|step| step[0].manhattan_distance(step[1]) > 1)
            {
                return false;
            }
        }
        first_conflict(&self.paths).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_locations() {
        let idle = Agent {
            id: 0,
            location: Location::new(1, 1),
            target: Location::new(1, 1),
            status: AgentStatus::Idle,
        };
        assert!(idle.is_exempt(Location::new(1, 1)));
        assert!(!idle.is_exempt(Location::new(2, 1)));

        let active = Agent {
            id: 1,
            location: Location::new(0, 0),
            target: Location::new(3, 3),
            status: AgentStatus::Active(Task {
                shelf: Location::new(3, 3),
                station: Location::new(0, 3),
                parking: Location::new(0, 0),
            }),
        };
        assert!(active.is_exempt(Location::new(3, 3)));
        assert!(active.is_exempt(Location::new(0, 3)));
        assert!(active.is_exempt(Location::new(0, 0)));
        assert!(!active.is_exempt(Location::new(1, 0)));
    }

    #[test]
    fn test_solution_cost_and_plan() {
        let solution = Solution {
            paths: vec![
                vec![Location::new(0, 0), Location::new(1, 0)],
                vec![Location::new(2, 2)],
            ],
        };
        assert_eq!(solution.cost(), 3);

        let plan = solution.to_plan();
        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan[&0],
            vec![PlanStep { t: 0, x: 0, y: 0 }, PlanStep { t: 1, x: 1, y: 0 }]
        );
        assert_eq!(plan[&1], vec![PlanStep { t: 0, x: 2, y: 2 }]);
    }
}
