use nalgebra::DVector;
use qpbench_types::{Problem, Result};

use crate::residuals::{dual_residual_vector, inf_norm, primal_residual_vector};

/// Check primal feasibility of `x` with an absolute tolerance.
///
/// Computes the infinity norm of min(Cx - l, 0) + max(Cx - u, 0) over the
/// double-sided form of `problem`. Only the absolute term of the OSQP
/// optimality criterion is used, the relative term is fixed at zero.
///
/// Returns `Ok(false)` on violation (NaN residuals included) and logs the
/// violation magnitude. Errors only on a dimension mismatch, in `x` or in
/// the problem itself.
pub fn is_valid_primal_solution<P: Problem + ?Sized>(
    problem: &P,
    x: &DVector<f64>,
    eps_abs: f64,
) -> Result<bool> {
    let ineq = problem.constraints_as_double_sided_ineq()?;
    let residual = primal_residual_vector(&ineq, x)?;
    let primal_error = inf_norm(&residual);
    if !(primal_error <= eps_abs) {
        tracing::warn!(
            "Error in primal residual of {}: {} > {}",
            problem.name(),
            primal_error,
            eps_abs
        );
        return Ok(false);
    }
    Ok(true)
}

/// Check stationarity P x + q + C^T y of a dual candidate `y` at `x`,
/// with the same absolute-only tolerance as [`is_valid_primal_solution`].
pub fn is_valid_dual_solution<P: Problem + ?Sized>(
    problem: &P,
    y: &DVector<f64>,
    x: &DVector<f64>,
    eps_abs: f64,
) -> Result<bool> {
    let ineq = problem.constraints_as_double_sided_ineq()?;
    let residual = dual_residual_vector(problem.p(), problem.q(), &ineq.c, x, y)?;
    let dual_error = inf_norm(&residual);
    if !(dual_error <= eps_abs) {
        tracing::warn!(
            "Error in dual residual of {}: {} > {}",
            problem.name(),
            dual_error,
            eps_abs
        );
        return Ok(false);
    }
    Ok(true)
}
