mod schema;
mod codec;
mod store;
mod table;
mod stats;
mod config;

pub use schema::{ResultRow, StoreOptions, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
pub use codec::{format_vector, parse_vector};
pub use store::ResultsStore;
pub use table::SummaryTable;
pub use stats::{shifted_geometric_mean, AggregateStatistics, Metric};
pub use config::{BenchmarkConfig, SettingsMap, Tolerance};
