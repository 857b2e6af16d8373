pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    AutofillConfig, CatalogConfig, ClassifierStrategy, FillerConfig, MatchMode, ScannerConfig,
    SessionConfig, SortPolicy,
};
