use super::{first_conflict, Conflict, Solver};
use crate::algorithm::space_time_a_star;
use crate::common::{Agent, Path, Solution};
use crate::config::Config;
use crate::constraint::ConstraintSet;
use crate::map::Map;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;
use std::time::Instant;
use tracing::{debug, info};

/// One node of the constraint tree. Constraint sets are shared with the
/// parent through `Rc`; branching only materializes the set of the single
/// agent whose constraints tighten.
#[derive(Debug, Clone, Eq)]
struct HighLevelNode {
    constraints: Vec<Rc<ConstraintSet>>,
    paths: Vec<Path>,
    cost: usize,
}

// Frontier ordering and closed-set identity are both keyed on the joint
// solution content, never on cost alone: distinct solutions of equal cost
// must not collide.
impl PartialEq for HighLevelNode {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.paths == other.paths
    }
}

impl Ord for HighLevelNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.paths.cmp(&other.paths))
    }
}

impl PartialOrd for HighLevelNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl HighLevelNode {
    /// Root node: every agent planned independently under an empty set.
    fn new(agents: &[Agent], map: &Map, stats: &mut Stats) -> Option<Self> {
        let empty = Rc::new(ConstraintSet::new());
        let constraints = vec![Rc::clone(&empty); agents.len()];
        let (paths, cost) = replan_all(agents, map, &constraints, stats)?;
        Some(HighLevelNode {
            constraints,
            paths,
            cost,
        })
    }

    /// Child with `tighten` applied to one agent's constraint set, every
    /// agent replanned from scratch under the new mapping. `None` when the
    /// constrained agent (or any other) has no path left.
    fn branch(
        &self,
        agents: &[Agent],
        map: &Map,
        agent_id: usize,
        tighten: impl FnOnce(&mut ConstraintSet),
        stats: &mut Stats,
    ) -> Option<HighLevelNode> {
        let mut constraints = self.constraints.clone();
        let mut tightened = (*constraints[agent_id]).clone();
        tighten(&mut tightened);
        constraints[agent_id] = Rc::new(tightened);

        let (paths, cost) = replan_all(agents, map, &constraints, stats)?;
        Some(HighLevelNode {
            constraints,
            paths,
            cost,
        })
    }
}

fn replan_all(
    agents: &[Agent],
    map: &Map,
    constraints: &[Rc<ConstraintSet>],
    stats: &mut Stats,
) -> Option<(Vec<Path>, usize)> {
    let mut paths = Vec::with_capacity(agents.len());
    let mut cost = 0;
    for agent in agents {
        let path = space_time_a_star(map, agent, &constraints[agent.id], stats)?;
        cost += path.len();
        paths.push(path);
    }
    Some((paths, cost))
}

/// Conflict-Based Search: optimal, complete over the constraint-tree model,
/// bounded by the configured expansion cap.
pub struct CBS {
    agents: Vec<Agent>,
    map: Map,
    stats: Stats,
}

impl CBS {
    pub fn new(agents: Vec<Agent>, map: &Map) -> Self {
        CBS {
            agents,
            map: map.clone(),
            stats: Stats::default(),
        }
    }
}

impl Solver for CBS {
    fn solve(&mut self, config: &Config) -> Option<Solution> {
        let solve_start_time = Instant::now();
        let mut open = BTreeSet::new();
        let mut closed: HashSet<Vec<Path>> = HashSet::new();

        let root = HighLevelNode::new(&self.agents, &self.map, &mut self.stats)?;
        open.insert(root);

        while let Some(current) = open.pop_first() {
            self.stats.high_level_expand_nodes += 1;
            if self.stats.high_level_expand_nodes > config.max_expansions {
                info!(
                    "cbs gave up after {} high level expansions",
                    config.max_expansions
                );
                return None;
            }

            closed.insert(current.paths.clone());

            let conflict = match first_conflict(&current.paths) {
                None => {
                    self.stats.costs = current.cost;
                    self.stats.time_us = solve_start_time.elapsed().as_micros() as usize;
                    self.stats.print("cbs");
                    return Some(Solution {
                        paths: current.paths,
                    });
                }
                Some(conflict) => conflict,
            };
            debug!("conflict: {conflict:?}");

            let children = match conflict {
                Conflict::Vertex {
                    time,
                    agent_1,
                    agent_2,
                    location,
                } => [
                    current.branch(&self.agents, &self.map, agent_1, |set| {
                        set.add_vertex(time, location)
                    }, &mut self.stats),
                    current.branch(&self.agents, &self.map, agent_2, |set| {
                        set.add_vertex(time, location)
                    }, &mut self.stats),
                ],
                Conflict::Edge {
                    time,
                    agent_1,
                    agent_2,
                    location_1,
                    location_2,
                } => [
                    current.branch(&self.agents, &self.map, agent_1, |set| {
                        set.add_edge(time, location_1, location_2)
                    }, &mut self.stats),
                    current.branch(&self.agents, &self.map, agent_2, |set| {
                        set.add_edge(time, location_2, location_1)
                    }, &mut self.stats),
                ],
            };

            for child in children.into_iter().flatten() {
                if !closed.contains(&child.paths) {
                    open.insert(child);
                }
            }
        }

        debug!("cbs frontier exhausted");
        None
    }
}
