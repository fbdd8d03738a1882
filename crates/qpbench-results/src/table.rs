use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Solver x settings table of aggregate values.
///
/// Rows are solvers and columns settings, both sorted lexicographically.
/// Cells without any run are NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    solvers: Vec<String>,
    settings: Vec<String>,
    values: DMatrix<f64>,
}

impl SummaryTable {
    /// Build a table by evaluating `cell` on every (solver, settings) pair
    pub(crate) fn from_fn<F>(solvers: Vec<String>, settings: Vec<String>, mut cell: F) -> Self
    where
        F: FnMut(&str, &str) -> f64,
    {
        let values = DMatrix::from_fn(solvers.len(), settings.len(), |i, j| {
            cell(&solvers[i], &settings[j])
        });
        SummaryTable {
            solvers,
            settings,
            values,
        }
    }

    pub fn solvers(&self) -> &[String] {
        &self.solvers
    }

    pub fn settings(&self) -> &[String] {
        &self.settings
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn get(&self, solver: &str, settings: &str) -> Option<f64> {
        let i = self.solver_index(solver)?;
        let j = self.settings_index(settings)?;
        Some(self.values[(i, j)])
    }

    /// Values of a solver across settings, in column order
    pub fn row(&self, solver: &str) -> Option<Vec<f64>> {
        let i = self.solver_index(solver)?;
        Some(self.values.row(i).iter().copied().collect())
    }

    /// Values of a settings across solvers, in row order
    pub fn column(&self, settings: &str) -> Option<Vec<f64>> {
        let j = self.settings_index(settings)?;
        Some(self.values.column(j).iter().copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn solver_index(&self, solver: &str) -> Option<usize> {
        self.solvers.binary_search_by(|s| s.as_str().cmp(solver)).ok()
    }

    fn settings_index(&self, settings: &str) -> Option<usize> {
        self.settings.binary_search_by(|s| s.as_str().cmp(settings)).ok()
    }
}
