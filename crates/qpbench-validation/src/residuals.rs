use nalgebra::{DMatrix, DVector};
use qpbench_types::{DoubleSidedIneq, QpBenchError, Result};

/// Infinity norm (max absolute component), NaN if any component is NaN.
/// Zero for an empty vector.
pub fn inf_norm(v: &DVector<f64>) -> f64 {
    let mut norm: f64 = 0.0;
    for &value in v.iter() {
        if value.is_nan() {
            return f64::NAN;
        }
        norm = norm.max(value.abs());
    }
    norm
}

/// Elementwise violation of l <= C x <= u:
/// min(Cx - l, 0) + max(Cx - u, 0), NaN where Cx is NaN
pub fn primal_residual_vector(ineq: &DoubleSidedIneq, x: &DVector<f64>) -> Result<DVector<f64>> {
    check_len(x, ineq.c.ncols(), "x")?;
    ineq.check_shape(x.len())?;
    let c_x = &ineq.c * x;
    Ok(DVector::from_iterator(
        c_x.len(),
        c_x.iter()
            .zip(ineq.l.iter().zip(ineq.u.iter()))
            .map(|(&v, (&l, &u))| {
                if v.is_nan() {
                    f64::NAN
                } else {
                    (v - l).min(0.0) + (v - u).max(0.0)
                }
            }),
    ))
}

/// Stationarity vector P x + q + C^T y
pub fn dual_residual_vector(
    p: &DMatrix<f64>,
    q: &DVector<f64>,
    c: &DMatrix<f64>,
    x: &DVector<f64>,
    y: &DVector<f64>,
) -> Result<DVector<f64>> {
    check_len(x, p.ncols(), "x")?;
    check_len(q, p.nrows(), "q")?;
    check_len(y, c.nrows(), "y")?;
    if c.ncols() != p.ncols() {
        return Err(QpBenchError::DimensionMismatch(format!(
            "C has {} columns but P has {}",
            c.ncols(),
            p.ncols()
        )));
    }
    Ok(p * x + q + c.transpose() * y)
}

/// Duality gap |x^T P x + q^T x + u^T y+ + l^T y-| for the double-sided form.
///
/// Rows with a zero multiplier contribute nothing even if their bound is
/// infinite. A nonzero multiplier on an infinite bound gives +inf.
pub fn duality_gap(
    p: &DMatrix<f64>,
    q: &DVector<f64>,
    ineq: &DoubleSidedIneq,
    x: &DVector<f64>,
    y: &DVector<f64>,
) -> Result<f64> {
    check_len(x, p.ncols(), "x")?;
    check_len(q, p.nrows(), "q")?;
    ineq.check_shape(x.len())?;
    check_len(y, ineq.num_rows(), "y")?;

    let x_p_x = x.dot(&(p * x));
    let q_x = q.dot(x);

    let mut support = 0.0;
    for (i, &y_i) in y.iter().enumerate() {
        let term = if y_i > 0.0 {
            ineq.u[i] * y_i
        } else if y_i < 0.0 {
            ineq.l[i] * y_i
        } else {
            0.0
        };
        if term.is_infinite() {
            return Ok(f64::INFINITY);
        }
        support += term;
    }

    Ok((x_p_x + q_x + support).abs())
}

pub(crate) fn check_len(v: &DVector<f64>, expected: usize, label: &str) -> Result<()> {
    if v.len() != expected {
        return Err(QpBenchError::DimensionMismatch(format!(
            "{} has length {}, expected {}",
            label,
            v.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inf_norm() {
        let v = DVector::from_vec(vec![0.5, -2.0, 1.0]);
        assert_eq!(inf_norm(&v), 2.0);
        assert_eq!(inf_norm(&DVector::zeros(0)), 0.0);
        assert!(inf_norm(&DVector::from_vec(vec![1.0, f64::NAN])).is_nan());
    }

    #[test]
    fn test_primal_residual_signs() {
        let ineq = DoubleSidedIneq {
            c: DMatrix::identity(3, 3),
            l: DVector::from_vec(vec![0.0, 0.0, f64::NEG_INFINITY]),
            u: DVector::from_vec(vec![1.0, 1.0, f64::INFINITY]),
        };
        let x = DVector::from_vec(vec![-0.25, 1.5, 1e6]);
        let r = primal_residual_vector(&ineq, &x).unwrap();

        assert_eq!(r[0], -0.25);
        assert_eq!(r[1], 0.5);
        assert_eq!(r[2], 0.0);
    }

    #[test]
    fn test_primal_residual_keeps_nan() {
        let ineq = DoubleSidedIneq {
            c: DMatrix::identity(2, 2),
            l: DVector::from_vec(vec![0.0, 0.0]),
            u: DVector::from_vec(vec![1.0, 1.0]),
        };
        let x = DVector::from_vec(vec![f64::NAN, 0.5]);
        let r = primal_residual_vector(&ineq, &x).unwrap();

        assert!(r[0].is_nan());
        assert_eq!(r[1], 0.0);
        assert!(inf_norm(&r).is_nan());
    }

    #[test]
    fn test_ragged_ineq_is_dimension_mismatch() {
        let ineq = DoubleSidedIneq {
            c: DMatrix::identity(2, 2),
            l: DVector::from_vec(vec![0.0]),
            u: DVector::from_vec(vec![1.0]),
        };
        let p = DMatrix::identity(2, 2);
        let q = DVector::zeros(2);
        let x = DVector::from_vec(vec![0.5, 0.5]);
        let y = DVector::zeros(1);

        assert!(matches!(
            primal_residual_vector(&ineq, &x),
            Err(QpBenchError::DimensionMismatch(_))
        ));
        assert!(matches!(
            duality_gap(&p, &q, &ineq, &x, &y),
            Err(QpBenchError::DimensionMismatch(_))
        ));
    }
}
