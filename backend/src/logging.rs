//! Console-first logging for a single run.
//!
//! Records from the `log` macros reach the subscriber through
//! `tracing_log::LogTracer`. A file is only written when `logs_path` is set.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};

use lakevend_configs::config::types::LoggingSettings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Crates that see signed requests, session tokens or secret keys. Held at
/// `warn` no matter what `[logging.targets]` asks for.
const CREDENTIAL_TARGETS: &[&str] = &[
    "aws_config",
    "aws_credential_types",
    "aws_sigv4",
    "aws_sdk_sts",
    "aws_sdk_lakeformation",
    "aws_sdk_glue",
    "aws_smithy_runtime",
    "aws_smithy_runtime_api",
    "aws_smithy_http",
    "hyper",
    "hyper_util",
    "h2",
    "reqwest",
];

/// Engine crates that log per batch.
const ENGINE_TARGETS: &[&str] = &["datafusion", "arrow", "parquet", "polars", "object_store"];

fn is_credential_target(target: &str) -> bool {
    CREDENTIAL_TARGETS
        .iter()
        .any(|t| target == *t || target.starts_with(&format!("{}::", t)))
}

/// Filter directives plus the overrides that were refused.
#[derive(Debug, Default)]
pub struct Directives {
    pub directives: Vec<String>,
    pub refused: Vec<String>,
}

pub fn directives(level: &str, targets: &HashMap<String, String>) -> Directives {
    let mut out = Directives {
        directives: vec![level.to_string()],
        refused: Vec::new(),
    };
    out.directives
        .extend(ENGINE_TARGETS.iter().map(|t| format!("{}=warn", t)));

    let mut overrides: Vec<(&String, &String)> = targets.iter().collect();
    overrides.sort();
    for (target, lvl) in overrides {
        if is_credential_target(target) {
            out.refused.push(target.clone());
        } else {
            out.directives.push(format!("{}={}", target, lvl));
        }
    }

    out.directives
        .extend(CREDENTIAL_TARGETS.iter().map(|t| format!("{}=warn", t)));
    out
}

pub fn build_env_filter(level: &str, targets: &HashMap<String, String>) -> anyhow::Result<EnvFilter> {
    let joined = directives(level, targets).directives.join(",");
    EnvFilter::try_new(&joined).map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", joined, e))
}

fn console_layer(format: LogFormat, filter: EnvFilter) -> BoxedLayer {
    match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed(),
    }
}

fn file_layer(settings: &LoggingSettings, format: LogFormat) -> anyhow::Result<Option<BoxedLayer>> {
    let Some(path) = settings.log_file() else {
        return Ok(None);
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = build_env_filter(&settings.level, &settings.targets)?;

    let layer = match format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(file)
            .with_filter(filter)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file)
            .with_filter(filter)
            .boxed(),
    };
    Ok(Some(layer))
}

/// Install the global subscriber from `[logging]`.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let format = LogFormat::parse(&settings.format);

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if settings.log_to_console {
        layers.push(console_layer(
            format,
            build_env_filter(&settings.level, &settings.targets)?,
        ));
    }
    if let Some(layer) = file_layer(settings, format)? {
        layers.push(layer);
    }

    tracing_log::LogTracer::init().ok();
    tracing_subscriber::registry().with(layers).init();

    let refused = directives(&settings.level, &settings.targets).refused;
    if !refused.is_empty() {
        tracing::warn!("Ignoring log level overrides for credential-handling targets: {:?}", refused);
    }
    Ok(())
}
