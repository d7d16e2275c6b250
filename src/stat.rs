use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub costs: usize,
    pub time_us: usize,
    pub low_level_expand_nodes: usize,
    pub high_level_expand_nodes: usize,
}

impl Stats {
    pub fn print(&self, solver: &str) {
        info!(
            "{solver}: cost {:?} time(microseconds) {:?} high level expand nodes {:?} low level expand nodes {:?}",
            self.costs, self.time_us, self.high_level_expand_nodes, self.low_level_expand_nodes
        );
    }
}
