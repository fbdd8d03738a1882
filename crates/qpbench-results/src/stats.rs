use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use qpbench_types::{QpBenchError, Result};
use serde::{Deserialize, Serialize};

use crate::config::SettingsMap;
use crate::schema::{ResultRow, StoreOptions};
use crate::table::SummaryTable;

/// Numeric result column that can be averaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Runtime,
    PrimalResidual,
    DualResidual,
    DualityGap,
    ObjectiveVal,
}

impl Metric {
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Runtime => "runtime",
            Metric::PrimalResidual => "primal_residual",
            Metric::DualResidual => "dual_residual",
            Metric::DualityGap => "duality_gap",
            Metric::ObjectiveVal => "objective_val",
        }
    }

    fn value(&self, row: &ResultRow) -> Option<f64> {
        match self {
            Metric::Runtime => Some(row.runtime),
            Metric::PrimalResidual => Some(row.primal_residual),
            Metric::DualResidual => Some(row.dual_residual),
            Metric::DualityGap => Some(row.duality_gap),
            Metric::ObjectiveVal => row.objective_val,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = QpBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "runtime" => Ok(Metric::Runtime),
            "primal_residual" => Ok(Metric::PrimalResidual),
            "dual_residual" => Ok(Metric::DualResidual),
            "duality_gap" => Ok(Metric::DualityGap),
            "objective_val" => Ok(Metric::ObjectiveVal),
            _ => Err(QpBenchError::UnknownMetric(s.to_string())),
        }
    }
}

/// Shifted geometric mean exp(mean(ln(v + shift))) - shift.
///
/// Fails with `BenchmarkError` on an empty sample or when some v + shift is
/// not positive.
pub fn shifted_geometric_mean(values: &[f64], shift: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(QpBenchError::BenchmarkError(
            "shifted geometric mean of an empty sample".to_string(),
        ));
    }

    let mut log_sum = 0.0;
    for &v in values {
        let shifted = v + shift;
        if !(shifted > 0.0) {
            return Err(QpBenchError::BenchmarkError(format!(
                "shifted geometric mean undefined for value {} with shift {}",
                v, shift
            )));
        }
        log_sum += shifted.ln();
    }

    Ok((log_sum / values.len() as f64).exp() - shift)
}

/// Per-(solver, settings) statistics over a snapshot of result rows
#[derive(Debug, Clone)]
pub struct AggregateStatistics<'a> {
    options: StoreOptions,
    solvers: Vec<String>,
    settings: Vec<String>,
    groups: BTreeMap<&'a str, BTreeMap<&'a str, Vec<&'a ResultRow>>>,
}

impl<'a> AggregateStatistics<'a> {
    /// Partition rows by (solver, settings)
    pub fn new(rows: &'a [ResultRow], options: StoreOptions) -> Self {
        let mut groups: BTreeMap<&'a str, BTreeMap<&'a str, Vec<&'a ResultRow>>> = BTreeMap::new();
        let mut solvers = BTreeSet::new();
        let mut settings = BTreeSet::new();

        for row in rows {
            solvers.insert(row.solver.as_str());
            settings.insert(row.settings.as_str());
            groups
                .entry(row.solver.as_str())
                .or_default()
                .entry(row.settings.as_str())
                .or_default()
                .push(row);
        }

        AggregateStatistics {
            options,
            solvers: solvers.into_iter().map(String::from).collect(),
            settings: settings.into_iter().map(String::from).collect(),
            groups,
        }
    }

    pub fn solvers(&self) -> &[String] {
        &self.solvers
    }

    pub fn settings(&self) -> &[String] {
        &self.settings
    }

    /// Runs of a solver under given settings
    pub fn group(&self, solver: &str, settings: &str) -> &[&'a ResultRow] {
        self.groups
            .get(solver)
            .and_then(|by_settings| by_settings.get(settings))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Percentage of runs where the solver found a solution that meets the
    /// primal, dual and gap tolerances of its settings.
    pub fn success_rate(
        &self,
        primal_tolerances: &SettingsMap,
        dual_tolerances: &SettingsMap,
        gap_tolerances: &SettingsMap,
    ) -> Result<SummaryTable> {
        let thresholds = self.thresholds(primal_tolerances, dual_tolerances, gap_tolerances)?;
        Ok(self.percentage_table(|row, settings| {
            found_and_valid(row, &thresholds[settings])
        }))
    }

    /// Percentage of runs where the solver's own `found` claim agrees with
    /// whether it actually found a valid solution.
    pub fn correct_rate(
        &self,
        primal_tolerances: &SettingsMap,
        dual_tolerances: &SettingsMap,
        gap_tolerances: &SettingsMap,
    ) -> Result<SummaryTable> {
        let thresholds = self.thresholds(primal_tolerances, dual_tolerances, gap_tolerances)?;
        Ok(self.percentage_table(|row, settings| {
            row.found == found_and_valid(row, &thresholds[settings])
        }))
    }

    /// Shifted geometric mean of `metric` for each solver, divided by the
    /// best (smallest) mean of its settings column.
    ///
    /// Runs where the solver found no solution count as
    /// `not_found_values[settings]`. An error in any group aborts the whole
    /// table with `MeanEvaluation` naming that group.
    pub fn shifted_geometric_mean(
        &self,
        metric: Metric,
        shift: f64,
        not_found_values: &SettingsMap,
    ) -> Result<SummaryTable> {
        if metric == Metric::ObjectiveVal && !self.options.with_objective_val {
            return Err(QpBenchError::UnknownMetric(format!(
                "{} is not recorded in these results",
                metric
            )));
        }

        // settings -> solver -> ratio
        let mut ratios: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
        for settings in &self.settings {
            let not_found_value = lookup(not_found_values, settings, "not-found value")?;

            let mut means = Vec::with_capacity(self.solvers.len());
            for solver in &self.solvers {
                let group = self.group(solver, settings);
                if group.is_empty() {
                    means.push((solver.as_str(), f64::NAN));
                    continue;
                }

                let values: Vec<f64> = group
                    .iter()
                    .map(|row| {
                        if row.found {
                            metric.value(row).unwrap_or(f64::INFINITY)
                        } else {
                            not_found_value
                        }
                    })
                    .collect();

                let mean = shifted_geometric_mean(&values, shift).map_err(|e| {
                    QpBenchError::MeanEvaluation {
                        settings: settings.clone(),
                        solver: solver.clone(),
                        source: Box::new(e),
                    }
                })?;
                means.push((solver.as_str(), mean));
            }

            let best = means
                .iter()
                .map(|(_, mean)| *mean)
                .filter(|mean| !mean.is_nan())
                .fold(f64::INFINITY, f64::min);
            let column = ratios.entry(settings.as_str()).or_default();
            for (solver, mean) in means {
                column.insert(solver, mean / best);
            }
        }

        Ok(SummaryTable::from_fn(
            self.solvers.clone(),
            self.settings.clone(),
            |solver, settings| {
                ratios
                    .get(settings)
                    .and_then(|column| column.get(solver))
                    .copied()
                    .unwrap_or(f64::NAN)
            },
        ))
    }

    /// 100 x mean of `indicator` over each group, NaN for empty groups
    fn percentage_table<F>(&self, indicator: F) -> SummaryTable
    where
        F: Fn(&ResultRow, &str) -> bool,
    {
        SummaryTable::from_fn(
            self.solvers.clone(),
            self.settings.clone(),
            |solver, settings| {
                let group = self.group(solver, settings);
                if group.is_empty() {
                    return f64::NAN;
                }
                let hits = group.iter().filter(|row| indicator(row, settings)).count();
                100.0 * hits as f64 / group.len() as f64
            },
        )
    }

    fn thresholds(
        &self,
        primal_tolerances: &SettingsMap,
        dual_tolerances: &SettingsMap,
        gap_tolerances: &SettingsMap,
    ) -> Result<BTreeMap<String, Thresholds>> {
        self.settings
            .iter()
            .map(|settings| {
                Ok((
                    settings.clone(),
                    Thresholds {
                        primal: lookup(primal_tolerances, settings, "primal tolerance")?,
                        dual: lookup(dual_tolerances, settings, "dual tolerance")?,
                        gap: lookup(gap_tolerances, settings, "gap tolerance")?,
                    },
                ))
            })
            .collect()
    }
}

struct Thresholds {
    primal: f64,
    dual: f64,
    gap: f64,
}

fn found_and_valid(row: &ResultRow, t: &Thresholds) -> bool {
    row.found
        && row.primal_residual < t.primal
        && row.dual_residual < t.dual
        && row.duality_gap < t.gap
}

fn lookup(map: &SettingsMap, settings: &str, what: &str) -> Result<f64> {
    map.get(settings).copied().ok_or_else(|| {
        QpBenchError::ConfigError(format!("no {} for settings \"{}\"", what, settings))
    })
}
