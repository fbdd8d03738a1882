use nalgebra::DVector;
use qpbench_types::{Problem, Result, Solution};
use serde::{Deserialize, Serialize};

use crate::residuals::{
    check_len, dual_residual_vector, duality_gap, inf_norm, primal_residual_vector,
};

/// Solver outcome with accuracy metrics evaluated against its problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpSolution {
    pub found: Option<bool>,
    pub x: Option<DVector<f64>>,
    pub y: Option<DVector<f64>>,
    pub primal_residual: f64,
    pub dual_residual: f64,
    pub duality_gap: f64,
    pub objective: Option<f64>,
}

impl QpSolution {
    /// Evaluate residuals, gap and objective of a primal-dual candidate.
    ///
    /// `y` is indexed by the rows of the problem's double-sided form. Metrics
    /// that need a missing vector are set to +inf. A NaN in `x` gives a NaN
    /// primal residual. Mis-sized problems or vectors fail with
    /// `DimensionMismatch`.
    pub fn evaluate<P: Problem + ?Sized>(
        problem: &P,
        found: Option<bool>,
        x: Option<DVector<f64>>,
        y: Option<DVector<f64>>,
    ) -> Result<Self> {
        let ineq = problem.constraints_as_double_sided_ineq()?;
        let (p, q) = (problem.p(), problem.q());

        let mut primal_residual = f64::INFINITY;
        let mut dual_residual = f64::INFINITY;
        let mut gap = f64::INFINITY;
        let mut objective = None;

        if let Some(x) = &x {
            check_len(x, p.ncols(), "x")?;
            check_len(q, p.nrows(), "q")?;
            primal_residual = inf_norm(&primal_residual_vector(&ineq, x)?);
            objective = Some(0.5 * x.dot(&(p * x)) + q.dot(x));

            if let Some(y) = &y {
                dual_residual = inf_norm(&dual_residual_vector(p, q, &ineq.c, x, y)?);
                gap = duality_gap(p, q, &ineq, x, y)?;
            }
        }

        Ok(QpSolution {
            found,
            x,
            y,
            primal_residual,
            dual_residual,
            duality_gap: gap,
            objective,
        })
    }

    /// Outcome of a solver that returned nothing
    pub fn not_found() -> Self {
        QpSolution {
            found: Some(false),
            x: None,
            y: None,
            primal_residual: f64::INFINITY,
            dual_residual: f64::INFINITY,
            duality_gap: f64::INFINITY,
            objective: None,
        }
    }
}

impl Solution for QpSolution {
    fn found(&self) -> Option<bool> {
        self.found
    }

    fn x(&self) -> Option<&DVector<f64>> {
        self.x.as_ref()
    }

    fn y(&self) -> Option<&DVector<f64>> {
        self.y.as_ref()
    }

    fn primal_residual(&self) -> f64 {
        self.primal_residual
    }

    fn dual_residual(&self) -> f64 {
        self.dual_residual
    }

    fn duality_gap(&self) -> f64 {
        self.duality_gap
    }

    fn objective_value(&self) -> Option<f64> {
        self.objective
    }
}
