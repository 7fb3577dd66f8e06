pub mod etl;
pub mod exporter;
pub mod format;
pub mod importer;
pub mod report;
pub mod validator;

pub use crate::domain::ports::{ConfigProvider, Storage, Store};
pub use crate::utils::error::Result;
