use nalgebra::DVector;

/// Outcome of a solver run, as consumed by the results store.
///
/// Residual accessors report `f64::INFINITY` when they cannot be evaluated,
/// e.g. when the solver returned no primal vector.
pub trait Solution {
    /// Whether the solver claims to have found a solution, if it said anything
    fn found(&self) -> Option<bool>;

    /// Primal vector
    fn x(&self) -> Option<&DVector<f64>>;

    /// Dual vector over the rows of the double-sided constraint form
    fn y(&self) -> Option<&DVector<f64>>;

    fn primal_residual(&self) -> f64;

    fn dual_residual(&self) -> f64;

    fn duality_gap(&self) -> f64;

    fn objective_value(&self) -> Option<f64>;
}
