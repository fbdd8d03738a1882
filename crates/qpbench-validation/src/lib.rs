mod residuals;
mod validator;
mod qp_solution;

pub use residuals::{dual_residual_vector, duality_gap, inf_norm, primal_residual_vector};
pub use validator::{is_valid_dual_solution, is_valid_primal_solution};
pub use qp_solution::QpSolution;
