use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use qpbench_types::{Problem, QpBenchError, Result, Solution};

use crate::codec::{format_bool, format_float, format_vector, parse_bool, parse_float, parse_vector};
use crate::schema::{ResultRow, StoreOptions, REQUIRED_COLUMNS};
use crate::stats::AggregateStatistics;

/// Results of a test set, one row per (problem, solver, settings), backed
/// by a CSV file.
///
/// Mutations happen in memory through [`ResultsStore::update`]; nothing is
/// persisted until [`ResultsStore::write`]. The store has no internal
/// locking: concurrent solver runs must funnel their updates through a
/// single owner.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    csv_path: PathBuf,
    test_set: String,
    options: StoreOptions,
    rows: Vec<ResultRow>,
}

impl ResultsStore {
    /// Load results from `csv_path`, or start an empty table if the file
    /// does not exist.
    ///
    /// Unknown columns are ignored. Missing optional columns are back-filled
    /// with +inf sentinels. Fails with `ResultsError` if a required column
    /// is missing, if `found` holds non-boolean values or if a key appears
    /// twice.
    pub fn open(
        csv_path: impl AsRef<Path>,
        test_set: impl Into<String>,
        options: StoreOptions,
    ) -> Result<Self> {
        let csv_path = csv_path.as_ref().to_path_buf();
        let rows = if csv_path.exists() {
            tracing::info!("Loading existing results from {}", csv_path.display());
            load_rows(&csv_path, options)?
        } else {
            Vec::new()
        };

        check_rows(&rows)?;

        Ok(ResultsStore {
            csv_path,
            test_set: test_set.into(),
            options,
            rows,
        })
    }

    /// Sort rows by (problem, solver, settings) and overwrite the CSV file
    pub fn write(&mut self) -> Result<()> {
        self.rows.sort_by(|a, b| a.key().cmp(&b.key()));

        let mut writer = csv::Writer::from_path(&self.csv_path).map_err(csv_error)?;
        writer
            .write_record(self.options.columns())
            .map_err(csv_error)?;

        for row in &self.rows {
            writer.write_record(self.encode_row(row)).map_err(csv_error)?;
        }
        writer
            .flush()
            .map_err(|e| QpBenchError::IoError(e.to_string()))?;

        tracing::debug!(
            "Test set results written to {} ({} rows)",
            self.csv_path.display(),
            self.rows.len()
        );
        Ok(())
    }

    /// Check if results contain a given run of a solver on a problem
    pub fn has<P: Problem + ?Sized>(&self, problem: &P, solver: &str, settings: &str) -> bool {
        self.get(problem.name(), solver, settings).is_some()
    }

    /// Look up the row of a given run
    pub fn get(&self, problem: &str, solver: &str, settings: &str) -> Option<&ResultRow> {
        self.rows
            .iter()
            .find(|row| row.matches(problem, solver, settings))
    }

    /// Check whether a recorded run hit the time limit, i.e. its runtime
    /// exceeds 99% of `time_limit`.
    ///
    /// Fails if the run is not recorded exactly once.
    pub fn is_timeout<P: Problem + ?Sized>(
        &self,
        problem: &P,
        solver: &str,
        settings: &str,
        time_limit: f64,
    ) -> Result<bool> {
        let mut matching = self
            .rows
            .iter()
            .filter(|row| row.matches(problem.name(), solver, settings));

        let row = matching.next().ok_or_else(|| {
            QpBenchError::ResultsError(format!(
                "no result for problem={} solver={} settings={}",
                problem.name(),
                solver,
                settings
            ))
        })?;
        if matching.next().is_some() {
            return Err(QpBenchError::ResultsError(format!(
                "duplicate results for problem={} solver={} settings={}",
                problem.name(),
                solver,
                settings
            )));
        }

        Ok(row.runtime > 0.99 * time_limit)
    }

    /// Insert or replace the row of a (problem, solver, settings) run
    pub fn update<P, S>(
        &mut self,
        problem: &P,
        solver: &str,
        settings: &str,
        solution: &S,
        runtime: f64,
    ) where
        P: Problem + ?Sized,
        S: Solution + ?Sized,
    {
        let before = self.rows.len();
        self.rows
            .retain(|row| !row.matches(problem.name(), solver, settings));
        if self.rows.len() != before {
            tracing::debug!(
                "Replacing result for problem={} solver={} settings={}",
                problem.name(),
                solver,
                settings
            );
        }

        let objective_val = if self.options.with_objective_val {
            Some(solution.objective_value().unwrap_or(f64::INFINITY))
        } else {
            None
        };

        let primal_sol = if self.options.with_primal_sol {
            Some(
                solution
                    .x()
                    .map(|x| x.iter().copied().collect())
                    .unwrap_or_else(|| vec![f64::INFINITY]),
            )
        } else {
            None
        };

        self.rows.push(ResultRow {
            problem: problem.name().to_string(),
            is_feasible: problem.is_feasible(),
            solver: solver.to_string(),
            settings: settings.to_string(),
            runtime,
            found: solution.found().unwrap_or(false),
            primal_residual: solution.primal_residual(),
            dual_residual: solution.dual_residual(),
            duality_gap: solution.duality_gap(),
            objective_val,
            primal_sol,
        });
    }

    /// Aggregate statistics over the current snapshot
    pub fn statistics(&self) -> AggregateStatistics<'_> {
        AggregateStatistics::new(&self.rows, self.options)
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct solver names, sorted
    pub fn solvers(&self) -> Vec<String> {
        let solvers: BTreeSet<&str> = self.rows.iter().map(|r| r.solver.as_str()).collect();
        solvers.into_iter().map(String::from).collect()
    }

    /// Distinct settings names, sorted
    pub fn settings(&self) -> Vec<String> {
        let settings: BTreeSet<&str> = self.rows.iter().map(|r| r.settings.as_str()).collect();
        settings.into_iter().map(String::from).collect()
    }

    pub fn path(&self) -> &Path {
        &self.csv_path
    }

    pub fn test_set(&self) -> &str {
        &self.test_set
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    fn encode_row(&self, row: &ResultRow) -> Vec<String> {
        let mut record = vec![
            row.problem.clone(),
            format_bool(row.is_feasible).to_string(),
            row.solver.clone(),
            row.settings.clone(),
            format_float(row.runtime),
            format_bool(row.found).to_string(),
            format_float(row.primal_residual),
            format_float(row.dual_residual),
            format_float(row.duality_gap),
        ];
        if self.options.with_objective_val {
            record.push(format_float(row.objective_val.unwrap_or(f64::INFINITY)));
        }
        if self.options.with_primal_sol {
            let sentinel = [f64::INFINITY];
            let values = row.primal_sol.as_deref().unwrap_or(&sentinel);
            record.push(format_vector(values));
        }
        record
    }
}

/// Every key must appear at most once
fn check_rows(rows: &[ResultRow]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for row in rows {
        if !seen.insert(row.key()) {
            return Err(QpBenchError::ResultsError(format!(
                "duplicate results for problem={} solver={} settings={}",
                row.problem, row.solver, row.settings
            )));
        }
    }
    Ok(())
}

fn load_rows(csv_path: &Path, options: StoreOptions) -> Result<Vec<ResultRow>> {
    let mut reader = csv::Reader::from_path(csv_path).map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let known = options.columns();
    let index: BTreeMap<&str, usize> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            known
                .iter()
                .find(|column| **column == name.trim())
                .map(|column| (*column, i))
        })
        .collect();

    for column in REQUIRED_COLUMNS {
        if !index.contains_key(column) {
            return Err(QpBenchError::ResultsError(format!(
                "missing required column \"{}\" in {}",
                column,
                csv_path.display()
            )));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let cell = |column: &str| cell_of(&index, &record, column);
        let float = |column: &str| parse_float(cell_of(&index, &record, column), column);

        let found = parse_bool(cell("found")).ok_or_else(|| {
            QpBenchError::ResultsError("\"found\" column has some non-boolean values".to_string())
        })?;
        let is_feasible = parse_bool(cell("is_feasible")).ok_or_else(|| {
            QpBenchError::ResultsError(
                "\"is_feasible\" column has some non-boolean values".to_string(),
            )
        })?;

        let objective_val = if !options.with_objective_val {
            None
        } else if index.contains_key("objective_val") {
            Some(float("objective_val")?)
        } else {
            Some(f64::INFINITY)
        };

        let primal_sol = if !options.with_primal_sol {
            None
        } else if index.contains_key("primal_sol") {
            Some(parse_vector(cell("primal_sol"))?)
        } else {
            Some(vec![f64::INFINITY])
        };

        rows.push(ResultRow {
            problem: cell("problem").to_string(),
            is_feasible,
            solver: cell("solver").to_string(),
            settings: cell("settings").to_string(),
            runtime: float("runtime")?,
            found,
            primal_residual: float("primal_residual")?,
            dual_residual: float("dual_residual")?,
            duality_gap: float("duality_gap")?,
            objective_val,
            primal_sol,
        });
    }

    Ok(rows)
}

fn cell_of<'r>(index: &BTreeMap<&str, usize>, record: &'r csv::StringRecord, column: &str) -> &'r str {
    index
        .get(column)
        .and_then(|&i| record.get(i))
        .unwrap_or("")
}

fn csv_error(err: csv::Error) -> QpBenchError {
    if err.is_io_error() {
        QpBenchError::IoError(err.to_string())
    } else {
        QpBenchError::SerializationError(err.to_string())
    }
}
