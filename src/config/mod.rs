pub mod cli;
pub mod toml_config;

use crate::core::format::DateStyle;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

/// Effective settings after merging the config file and command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input_dir: String,
    pub output_dir: String,
    pub database_path: Option<String>,
    pub date_style: DateStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: ".".to_string(),
            output_dir: "./output".to_string(),
            database_path: None,
            date_style: DateStyle::Invariant,
        }
    }
}

impl Settings {
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            input_dir: config.input_dir().map_or(defaults.input_dir, str::to_string),
            output_dir: config.output_dir().map_or(defaults.output_dir, str::to_string),
            database_path: config.database_path().map(str::to_string),
            date_style: config.date_style()?.unwrap_or(defaults.date_style),
        })
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("input_dir", &self.input_dir)?;
        validate_path("output_dir", &self.output_dir)?;
        if let Some(path) = &self.database_path {
            validate_path("database_path", path)?;
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn output_dir(&self) -> &str {
        &self.output_dir
    }

    fn database_path(&self) -> Option<&str> {
        self.database_path.as_deref()
    }

    fn date_style(&self) -> DateStyle {
        self.date_style
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "invoices-etl")]
#[command(about = "Import and export clients, invoices and products")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// SQLite database file; without one the run uses a throwaway in-memory database
    #[arg(long)]
    pub database: Option<String>,

    /// Directory input files are read from
    #[arg(long)]
    pub input_dir: Option<String>,

    /// Directory exports are written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Date rendering for exports: invariant | iso
    #[arg(long)]
    pub date_style: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Import a <Clients> XML document
    ImportClients { file: String },
    /// Import a JSON array of invoices
    ImportInvoices { file: String },
    /// Import a JSON array of products with client ids
    ImportProducts { file: String },
    /// Export clients with invoices issued after a date, as XML
    ExportClients {
        #[arg(long)]
        after: NaiveDate,
        #[arg(long, default_value = "clients.xml")]
        out: String,
    },
    /// Export the top products by qualifying clients, as JSON
    ExportProducts {
        #[arg(long)]
        min_name_length: usize,
        #[arg(long, default_value = "products.json")]
        out: String,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔後套用命令列覆蓋設定
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_toml(&TomlConfig::from_file(path)?)?,
            None => Settings::default(),
        };

        if let Some(dir) = &self.input_dir {
            settings.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(path) = &self.database {
            settings.database_path = Some(path.clone());
        }
        if let Some(style) = &self.date_style {
            settings.date_style = style.parse()?;
        }

        settings.validate()?;
        Ok(settings)
    }
}
