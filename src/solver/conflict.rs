use crate::common::{Location, Path};

/// Earliest collision between two agents in a joint solution.
///
/// For an edge conflict, `location_1` is the first agent's cell at `time`
/// and `location_2` its cell at `time + 1`; the second agent traverses the
/// same edge in the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    Vertex {
        time: usize,
        agent_1: usize,
        agent_2: usize,
        location: Location,
    },
    Edge {
        time: usize,
        agent_1: usize,
        agent_2: usize,
        location_1: Location,
        location_2: Location,
    },
}

/// Agents that have reached the end of their path hold the final pose.
fn position_at(path: &Path, time: usize) -> Location {
    *path.get(time).unwrap_or_else(|| path.last().unwrap())
}

/// Returns the earliest conflict under a fixed tie-break order: timesteps
/// ascending, all pairs checked for a vertex conflict before any pair is
/// checked for an edge conflict, pairs in declaration order. CBS branches
/// on exactly the conflict this ordering selects, so the order is part of
/// the contract.
pub fn first_conflict(paths: &[Path]) -> Option<Conflict> {
    let max_time = paths.iter().map(|path| path.len()).max()?;

    for time in 0..max_time {
        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                let position_i = position_at(&paths[i], time);
                let position_j = position_at(&paths[j], time);
                if position_i == position_j {
                    return Some(Conflict::Vertex {
                        time,
                        agent_1: i,
                        agent_2: j,
                        location: position_i,
                    });
                }
            }
        }

        for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                let from_i = position_at(&paths[i], time);
                let to_i = position_at(&paths[i], time + 1);
                let from_j = position_at(&paths[j], time);
                let to_j = position_at(&paths[j], time + 1);
                if from_i == to_j && to_i == from_j {
                    return Some(Conflict::Edge {
                        time,
                        agent_1: i,
                        agent_2: j,
                        location_1: from_i,
                        location_2: to_i,
                    });
                }
            }
        }
    }

    None
}
