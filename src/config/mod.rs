pub mod settings;

pub use settings::{AppConfig, LedgerConfig, StorageConfig};
