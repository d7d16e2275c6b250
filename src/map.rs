use anyhow::{anyhow, Result};
use std::collections::HashSet;

use crate::common::Location;

/// Static planning grid: rectangular bounds plus a set of blocked cells.
#[derive(Debug, Clone)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    obstacles: HashSet<Location>,
}

impl Map {
    pub fn new(width: i32, height: i32, obstacles: HashSet<Location>) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(anyhow!("map dimensions must be positive, got {width}x{height}"));
        }
        let map = Map {
            width,
            height,
            obstacles,
        };
        if let Some(obstacle) = map.obstacles.iter().find(|&&cell| !map.in_bounds(cell)) {
            return Err(anyhow!("obstacle {obstacle:?} is out of bounds"));
        }
        Ok(map)
    }

    pub fn in_bounds(&self, location: Location) -> bool {
        location.x >= 0 && location.x < self.width && location.y >= 0 && location.y < self.height
    }

    pub fn is_obstacle(&self, location: Location) -> bool {
        self.obstacles.contains(&location)
    }

    pub fn passable(&self, location: Location) -> bool {
        self.in_bounds(location) && !self.is_obstacle(location)
    }

    pub fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_obstacles() {
        let obstacles = HashSet::from([Location::new(1, 1)]);
        let map = Map::new(3, 2, obstacles).unwrap();

        assert!(map.passable(Location::new(0, 0)));
        assert!(map.passable(Location::new(2, 1)));
        assert!(!map.passable(Location::new(1, 1)));
        assert!(!map.passable(Location::new(3, 0)));
        assert!(!map.passable(Location::new(0, 2)));
        assert!(!map.passable(Location::new(-1, 0)));
        assert_eq!(map.area(), 6);
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert!(Map::new(0, 4, HashSet::new()).is_err());
        assert!(Map::new(4, -1, HashSet::new()).is_err());
    }

    #[test]
    fn test_rejects_out_of_bounds_obstacle() {
        let obstacles = HashSet::from([Location::new(5, 0)]);
        assert!(Map::new(3, 3, obstacles).is_err());
    }
}
