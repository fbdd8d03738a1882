use std::collections::BTreeMap;
use std::path::Path;

use qpbench_types::{QpBenchError, Result};
use serde::{Deserialize, Serialize};

/// Value per settings name
pub type SettingsMap = BTreeMap<String, f64>;

/// Accuracy thresholds a run must meet to count as a success
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub primal: f64,
    pub dual: f64,
    pub gap: f64,
}

/// Tolerances and time limit of a benchmark, per settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Time limit of each solver run, in seconds
    pub time_limit: f64,

    /// Shift of the shifted geometric mean of runtimes
    #[serde(default = "default_runtime_shift")]
    pub runtime_shift: f64,

    pub tolerances: BTreeMap<String, Tolerance>,
}

fn default_runtime_shift() -> f64 {
    10.0
}

impl BenchmarkConfig {
    pub fn new(time_limit: f64) -> Self {
        BenchmarkConfig {
            time_limit,
            runtime_shift: default_runtime_shift(),
            tolerances: BTreeMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: impl Into<String>, tolerance: Tolerance) -> Self {
        self.tolerances.insert(settings.into(), tolerance);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BenchmarkConfig = serde_json::from_str(json)
            .map_err(|e| QpBenchError::ConfigError(format!("invalid benchmark config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| QpBenchError::IoError(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loading benchmark config from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.time_limit > 0.0) {
            return Err(QpBenchError::ConfigError(format!(
                "time limit must be positive, got {}",
                self.time_limit
            )));
        }
        for (settings, tol) in &self.tolerances {
            if !(tol.primal > 0.0 && tol.dual > 0.0 && tol.gap > 0.0) {
                return Err(QpBenchError::ConfigError(format!(
                    "tolerances of settings \"{}\" must be positive",
                    settings
                )));
            }
        }
        Ok(())
    }

    pub fn primal_tolerances(&self) -> SettingsMap {
        self.project(|tol| tol.primal)
    }

    pub fn dual_tolerances(&self) -> SettingsMap {
        self.project(|tol| tol.dual)
    }

    pub fn gap_tolerances(&self) -> SettingsMap {
        self.project(|tol| tol.gap)
    }

    /// Runtime charged to a run that found no solution: the time limit
    pub fn runtime_penalties(&self) -> SettingsMap {
        self.project(|_| self.time_limit)
    }

    fn project(&self, f: impl Fn(&Tolerance) -> f64) -> SettingsMap {
        self.tolerances
            .iter()
            .map(|(settings, tol)| (settings.clone(), f(tol)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = BenchmarkConfig::from_json_str(
            r#"{
                "time_limit": 100.0,
                "tolerances": {
                    "default": {"primal": 1.0, "dual": 1.0, "gap": 1.0},
                    "high_accuracy": {"primal": 1e-9, "dual": 1e-9, "gap": 1e-9}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.runtime_shift, 10.0);
        assert_eq!(config.primal_tolerances()["high_accuracy"], 1e-9);
        assert_eq!(config.runtime_penalties()["default"], 100.0);
        assert_eq!(config.gap_tolerances().len(), 2);
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(BenchmarkConfig::from_json_str("{}").is_err());
        assert!(BenchmarkConfig::from_json_str(
            r#"{"time_limit": 0.0, "tolerances": {}}"#
        )
        .is_err());
        assert!(BenchmarkConfig::from_json_str(
            r#"{"time_limit": 10.0, "tolerances": {"low": {"primal": -1.0, "dual": 1.0, "gap": 1.0}}}"#
        )
        .is_err());
    }
}
