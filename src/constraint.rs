use std::collections::HashSet;

use crate::common::Location;

/// Forbids one agent from occupying `location` at `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexConstraint {
    pub time: usize,
    pub location: Location,
}

/// Forbids one agent from taking the `from -> to` transition between `time`
/// and `time + 1`. Directed: the reverse transition is a separate constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeConstraint {
    pub time: usize,
    pub from: Location,
    pub to: Location,
}

/// Per-agent store of forbidden vertices and directed edges. CBS branches
/// share unchanged sets through `Rc`, so a child only ever materializes the
/// one set it tightens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    vertex_constraints: HashSet<VertexConstraint>,
    edge_constraints: HashSet<EdgeConstraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, time: usize, location: Location) {
        self.vertex_constraints
            .insert(VertexConstraint { time, location });
    }

    pub fn add_edge(&mut self, time: usize, from: Location, to: Location) {
        self.edge_constraints.insert(EdgeConstraint { time, from, to });
    }

    /// Union-merge of another set into this one. Sets only ever grow.
    pub fn merge(&mut self, other: &ConstraintSet) {
        self.vertex_constraints
            .extend(other.vertex_constraints.iter().copied());
        self.edge_constraints
            .extend(other.edge_constraints.iter().copied());
    }

    pub fn forbids_vertex(&self, time: usize, location: Location) -> bool {
        self.vertex_constraints
            .contains(&VertexConstraint { time, location })
    }

    pub fn forbids_edge(&self, time: usize, from: Location, to: Location) -> bool {
        self.edge_constraints
            .contains(&EdgeConstraint { time, from, to })
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_constraints.is_empty() && self.edge_constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vertex_constraints.len() + self.edge_constraints.len()
    }

    /// Latest timestep any constraint refers to, used to bound the
    /// low-level search horizon.
    pub fn max_time(&self) -> usize {
        let vertex_max = self
            .vertex_constraints
            .iter()
            .map(|constraint| constraint.time)
            .max()
            .unwrap_or(0);
        let edge_max = self
            .edge_constraints
            .iter()
            // An edge constraint at `t` still matters at `t + 1`.
            .map(|constraint| constraint.time + 1)
            .max()
            .unwrap_or(0);
        vertex_max.max(edge_max)
    }
}
