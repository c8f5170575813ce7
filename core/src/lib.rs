pub mod composite;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod filter;
pub mod gap_matrix;
pub mod snapshot;
pub mod time_series;

// Re-exports for convenience
pub use composite::{CompositeExpander, JobIdentity, SelectionInput, normalize_selection};
pub use config::{ConfigError, EngineConfig, RoleCategory};
pub use dataset::{DatasetError, DatasetSummary};
pub use filter::{RowFilter, matches_row};
pub use gap_matrix::{GapMatrixCache, GapMatrixEngine, MatrixRequest};
pub use snapshot::{SnapshotOptions, build_snapshot};
pub use time_series::{aggregate, halve_composite};
pub use jobstat_types::*;
