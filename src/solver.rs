mod cbs;
mod conflict;
mod pbs;

pub use cbs::CBS;
pub use conflict::{first_conflict, Conflict};
pub use pbs::PBS;

use crate::common::Solution;
use crate::config::Config;

pub trait Solver {
    fn solve(&mut self, config: &Config) -> Option<Solution>;
}
