use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{QpBenchError, Result};

/// All constraints of a problem as l <= C x <= u
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleSidedIneq {
    pub c: DMatrix<f64>,
    pub l: DVector<f64>,
    pub u: DVector<f64>,
}

impl DoubleSidedIneq {
    /// Number of stacked constraint rows
    pub fn num_rows(&self) -> usize {
        self.l.len()
    }

    /// Check that C has `num_vars` columns and one row per bound pair
    pub fn check_shape(&self, num_vars: usize) -> Result<()> {
        if self.c.ncols() != num_vars {
            return Err(QpBenchError::DimensionMismatch(format!(
                "C has {} columns, expected {}",
                self.c.ncols(),
                num_vars
            )));
        }
        if self.l.len() != self.c.nrows() || self.u.len() != self.c.nrows() {
            return Err(QpBenchError::DimensionMismatch(format!(
                "C has {} rows but l has {} and u has {}",
                self.c.nrows(),
                self.l.len(),
                self.u.len()
            )));
        }
        Ok(())
    }
}

/// Read-only view of a quadratic program, as consumed by the validator
/// and the results store
pub trait Problem {
    /// Unique name of the problem, used as the results key
    fn name(&self) -> &str;

    fn is_feasible(&self) -> bool;

    /// Cost matrix P of the objective 0.5 * x^T P x + q^T x
    fn p(&self) -> &DMatrix<f64>;

    /// Cost vector q
    fn q(&self) -> &DVector<f64>;

    /// Stack every constraint into double-sided form.
    ///
    /// Fails with `DimensionMismatch` when the constraint data is inconsistent.
    fn constraints_as_double_sided_ineq(&self) -> Result<DoubleSidedIneq>;
}

/// Dense quadratic program:
/// minimize 0.5 * x^T P x + q^T x
/// subject to G x <= h, A x = b, lb <= x <= ub
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpProblem {
    pub name: String,
    pub is_feasible: bool,
    pub p: DMatrix<f64>,
    pub q: DVector<f64>,
    pub g: Option<DMatrix<f64>>,
    pub h: Option<DVector<f64>>,
    pub a: Option<DMatrix<f64>>,
    pub b: Option<DVector<f64>>,
    pub lb: Option<DVector<f64>>,
    pub ub: Option<DVector<f64>>,
}

impl QpProblem {
    /// Create an unconstrained problem
    pub fn new(name: impl Into<String>, p: DMatrix<f64>, q: DVector<f64>) -> Self {
        QpProblem {
            name: name.into(),
            is_feasible: true,
            p,
            q,
            g: None,
            h: None,
            a: None,
            b: None,
            lb: None,
            ub: None,
        }
    }

    /// Add inequality constraints G x <= h
    pub fn with_inequalities(mut self, g: DMatrix<f64>, h: DVector<f64>) -> Self {
        self.g = Some(g);
        self.h = Some(h);
        self
    }

    /// Add equality constraints A x = b
    pub fn with_equalities(mut self, a: DMatrix<f64>, b: DVector<f64>) -> Self {
        self.a = Some(a);
        self.b = Some(b);
        self
    }

    /// Add box constraints, either side may be absent
    pub fn with_bounds(mut self, lb: Option<DVector<f64>>, ub: Option<DVector<f64>>) -> Self {
        self.lb = lb;
        self.ub = ub;
        self
    }

    pub fn with_feasibility(mut self, is_feasible: bool) -> Self {
        self.is_feasible = is_feasible;
        self
    }

    /// Get number of variables
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Validate problem dimensions
    pub fn validate(&self) -> Result<()> {
        let n = self.num_vars();

        if self.p.nrows() != n || self.p.ncols() != n {
            return Err(QpBenchError::DimensionMismatch(format!(
                "P must be {}x{}, got {}x{}",
                n,
                n,
                self.p.nrows(),
                self.p.ncols()
            )));
        }

        check_pair(&self.g, &self.h, n, "G", "h")?;
        check_pair(&self.a, &self.b, n, "A", "b")?;

        for (label, bound) in [("lb", &self.lb), ("ub", &self.ub)] {
            if let Some(v) = bound {
                if v.len() != n {
                    return Err(QpBenchError::DimensionMismatch(format!(
                        "{} length {} != num_vars {}",
                        label,
                        v.len(),
                        n
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_pair(
    matrix: &Option<DMatrix<f64>>,
    vector: &Option<DVector<f64>>,
    n: usize,
    matrix_label: &str,
    vector_label: &str,
) -> Result<()> {
    match (matrix, vector) {
        (None, None) => Ok(()),
        (Some(m), Some(v)) => {
            if m.ncols() != n || m.nrows() != v.len() {
                return Err(QpBenchError::DimensionMismatch(format!(
                    "{} must be {}x{}, got {}x{}",
                    matrix_label,
                    v.len(),
                    n,
                    m.nrows(),
                    m.ncols()
                )));
            }
            Ok(())
        }
        _ => Err(QpBenchError::DimensionMismatch(format!(
            "{} and {} must be given together",
            matrix_label, vector_label
        ))),
    }
}

impl Problem for QpProblem {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_feasible(&self) -> bool {
        self.is_feasible
    }

    fn p(&self) -> &DMatrix<f64> {
        &self.p
    }

    fn q(&self) -> &DVector<f64> {
        &self.q
    }

    fn constraints_as_double_sided_ineq(&self) -> Result<DoubleSidedIneq> {
        self.validate()?;
        let n = self.num_vars();
        let mut rows: Vec<(Vec<f64>, f64, f64)> = Vec::new();

        if let (Some(g), Some(h)) = (&self.g, &self.h) {
            for i in 0..g.nrows() {
                rows.push((g.row(i).iter().copied().collect(), f64::NEG_INFINITY, h[i]));
            }
        }

        if let (Some(a), Some(b)) = (&self.a, &self.b) {
            for i in 0..a.nrows() {
                rows.push((a.row(i).iter().copied().collect(), b[i], b[i]));
            }
        }

        if self.lb.is_some() || self.ub.is_some() {
            for j in 0..n {
                let mut unit = vec![0.0; n];
                unit[j] = 1.0;
                let lower = self.lb.as_ref().map_or(f64::NEG_INFINITY, |lb| lb[j]);
                let upper = self.ub.as_ref().map_or(f64::INFINITY, |ub| ub[j]);
                rows.push((unit, lower, upper));
            }
        }

        let m = rows.len();
        let c = DMatrix::from_fn(m, n, |i, j| rows[i].0[j]);
        let l = DVector::from_iterator(m, rows.iter().map(|r| r.1));
        let u = DVector::from_iterator(m, rows.iter().map(|r| r.2));

        Ok(DoubleSidedIneq { c, l, u })
    }
}
