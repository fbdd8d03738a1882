use thiserror::Error;

#[derive(Debug, Error)]
pub enum QpBenchError {
    /// Results table violates its schema or a lookup found no unique row
    #[error("Results error: {0}")]
    ResultsError(String),

    /// Statistic is undefined on the supplied values
    #[error("Benchmark error: {0}")]
    BenchmarkError(String),

    #[error("Cannot evaluate mean for settings={settings} of solver={solver}: {source}")]
    MeanEvaluation {
        settings: String,
        solver: String,
        #[source]
        source: Box<QpBenchError>,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, QpBenchError>;
