mod astar;

pub use astar::space_time_a_star;

use std::collections::HashMap;

use crate::common::{Location, Path};

type Trace = HashMap<(Location, usize), (Location, usize)>;

fn construct_path(trace: &Trace, mut current: (Location, usize)) -> Path {
    let mut path = vec![current.0];
    while let Some(&(location, time)) = trace.get(&current) {
        path.push(location);
        current = (location, time);
    }
    path.reverse();
    path
}
