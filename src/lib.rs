pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::{cli::LocalStorage, Settings};

pub use adapters::SqliteStore;
pub use crate::core::etl::{EtlEngine, Job, JobOutcome};
pub use crate::core::exporter::{export_clients_with_invoices, export_products_with_most_clients};
pub use crate::core::importer::{import_clients, import_invoices, import_products};
pub use utils::error::{EtlError, Result};
