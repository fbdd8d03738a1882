use serde::{Deserialize, Serialize};

/// Columns every results file must carry
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "problem",
    "is_feasible",
    "solver",
    "settings",
    "runtime",
    "found",
    "primal_residual",
    "dual_residual",
    "duality_gap",
];

/// Columns enabled by [`StoreOptions`]
pub const OPTIONAL_COLUMNS: [&str; 2] = ["objective_val", "primal_sol"];

/// Column set of a results store, fixed at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Record the objective value of each run
    pub with_objective_val: bool,
    /// Record the primal vector of each run
    pub with_primal_sol: bool,
}

impl StoreOptions {
    pub fn with_objective_val(mut self) -> Self {
        self.with_objective_val = true;
        self
    }

    pub fn with_primal_sol(mut self) -> Self {
        self.with_primal_sol = true;
        self
    }

    /// Header of the persisted table, in order
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = REQUIRED_COLUMNS.to_vec();
        if self.with_objective_val {
            columns.push("objective_val");
        }
        if self.with_primal_sol {
            columns.push("primal_sol");
        }
        columns
    }
}

/// One run of a solver with given settings on a problem.
///
/// Missing numeric outputs are stored as +inf. Optional fields are `None`
/// exactly when the store was built without the matching column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub problem: String,
    pub is_feasible: bool,
    pub solver: String,
    pub settings: String,
    /// Wall time in seconds
    pub runtime: f64,
    pub found: bool,
    pub primal_residual: f64,
    pub dual_residual: f64,
    pub duality_gap: f64,
    pub objective_val: Option<f64>,
    pub primal_sol: Option<Vec<f64>>,
}

impl ResultRow {
    /// Unique (problem, solver, settings) key
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.problem, &self.solver, &self.settings)
    }

    pub fn matches(&self, problem: &str, solver: &str, settings: &str) -> bool {
        self.problem == problem && self.solver == solver && self.settings == settings
    }
}
