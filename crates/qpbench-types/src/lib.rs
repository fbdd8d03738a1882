mod error;
mod problem;
mod solution;

pub use error::{QpBenchError, Result};
pub use problem::{DoubleSidedIneq, Problem, QpProblem};
pub use solution::Solution;
