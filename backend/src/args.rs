use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lakevend_configs::{BackendKind, ServiceConfig};
use lakevend_filestore::Representation;

/// Which dataframe representations to load after vending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RepresentationArg {
    InMemory,
    Partitioned,
    Both,
}

impl RepresentationArg {
    pub fn representations(&self) -> Vec<Representation> {
        match self {
            RepresentationArg::InMemory => vec![Representation::InMemory],
            RepresentationArg::Partitioned => vec![Representation::Partitioned],
            RepresentationArg::Both => vec![Representation::InMemory, Representation::Partitioned],
        }
    }
}

/// lakevend - column-scoped credential vending and reads
#[derive(Parser, Debug)]
#[command(name = "lakevend")]
#[command(version)]
#[command(about = "Grant columns, vend temporary table credentials and read the permitted data", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", env = "LAKEVEND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Service backend: aws or sandbox (overrides [backend].kind)
    #[arg(long = "backend")]
    pub backend: Option<BackendKind>,

    /// Columns to grant and read, comma separated (overrides [grant].columns)
    #[arg(long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Representations to load
    #[arg(long = "representation", value_enum, default_value = "both")]
    pub representation: RepresentationArg,

    /// Log level (overrides [logging].level)
    #[arg(long = "log-level")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Resolve the effective configuration: file (or the sandbox default),
    /// then environment overrides, then command-line overrides.
    pub fn load_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None if self.backend == Some(BackendKind::Sandbox) => {
                let mut config = ServiceConfig::sandbox_default();
                config.apply_env_overrides()?;
                config
            },
            None => {
                return Err(anyhow::anyhow!(
                    "--config is required unless --backend sandbox is given"
                ))
            },
        };

        if let Some(kind) = self.backend {
            config.backend.kind = kind;
        }
        if !self.columns.is_empty() {
            config.grant.columns = self.columns.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }

        config.finalize()?;
        Ok(config)
    }
}
