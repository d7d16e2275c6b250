use super::construct_path;
use crate::common::{Agent, Location, Path};
use crate::constraint::ConstraintSet;
use crate::map::Map;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, instrument, trace};

// Successor generation order: wait, up, down, left, right.
const MOVES: [(i32, i32); 5] = [(0, 0), (0, 1), (0, -1), (-1, 0), (1, 0)];

#[derive(Debug, Clone, PartialEq, Eq)]
struct LowLevelOpenNode {
    position: Location,
    f_cost: usize,
    g_cost: usize, // uniform cost, so g is also the timestep
}

impl Ord for LowLevelOpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Higher g cost (deeper in time) has higher priority.
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for LowLevelOpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Whether the agent may step onto `to` at `time + 1`, coming from `from`.
/// Bounds and static obstacles always apply; the agent's exempt locations
/// (its own cell while idle, its task endpoints while active) override
/// vertex and edge constraints.
fn transition_valid(
    map: &Map,
    agent: &Agent,
    constraints: &ConstraintSet,
    from: Location,
    to: Location,
    time: usize,
) -> bool {
    if !map.passable(to) {
        return false;
    }
    if agent.is_exempt(to) {
        return true;
    }
    !constraints.forbids_vertex(time + 1, to) && !constraints.forbids_edge(time, from, to)
}

/// Shortest-path search over the time-expanded grid, from the agent's
/// current location at t = 0 to the first pose whose location equals the
/// target. Pure function of its arguments apart from the stats counters.
///
/// The search is bounded by an explicit horizon (latest constrained
/// timestep plus the grid area) so that infeasible instances exhaust the
/// frontier instead of expanding forever.
#[instrument(skip_all, name = "space_time_a_star", fields(agent = agent.id), level = "debug")]
pub fn space_time_a_star(
    map: &Map,
    agent: &Agent,
    constraints: &ConstraintSet,
    stats: &mut Stats,
) -> Option<Path> {
    debug!("constraints: {constraints:?}");
    let horizon = constraints.max_time() + map.area();

    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut trace_map = super::Trace::new();

    open_list.insert(LowLevelOpenNode {
        position: agent.location,
        f_cost: agent.location.manhattan_distance(agent.target),
        g_cost: 0,
    });

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");
        stats.low_level_expand_nodes += 1;

        closed_list.insert((current.position, current.g_cost));

        if current.position == agent.target {
            return Some(construct_path(
                &trace_map,
                (current.position, current.g_cost),
            ));
        }

        let tentative_g_cost = current.g_cost + 1;
        if tentative_g_cost > horizon {
            continue;
        }

        for (dx, dy) in MOVES {
            let neighbor = Location::new(current.position.x + dx, current.position.y + dy);

            if closed_list.contains(&(neighbor, tentative_g_cost)) {
                continue;
            }

            if !transition_valid(
                map,
                agent,
                constraints,
                current.position,
                neighbor,
                current.g_cost,
            ) {
                continue;
            }

            let h_cost = neighbor.manhattan_distance(agent.target);

            // If the node is already in the open list, keep the existing
            // entry; with uniform costs its g cost cannot improve.
            if open_list.insert(LowLevelOpenNode {
                position: neighbor,
                f_cost: tentative_g_cost + h_cost,
                g_cost: tentative_g_cost,
            }) {
                trace_map.insert(
                    (neighbor, tentative_g_cost),
                    (current.position, current.g_cost),
                );
            }
        }
    }

    debug!("no path for agent {} under current constraints", agent.id);
    None
}
