use super::types::*;
use crate::file_helpers::normalize_dir_path;
use lakevend_commons::VendingConstants;
use std::fs;
use std::path::Path;

impl ServiceConfig {
    /// Load configuration from a TOML file
    ///
    /// Environment overrides are applied before validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let mut config = Self::from_toml_str(&content)?;

        config.apply_env_overrides()?;
        config.finalize()?;

        Ok(config)
    }

    /// Parse configuration without touching the environment or validating.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))
    }

    /// Configuration for the in-process sandbox lake: the sample table with
    /// `name` and `amount` granted to `app-role`.
    pub fn sandbox_default() -> Self {
        ServiceConfig {
            table: TableSettings {
                catalog_id: None,
                database: "sample_db".to_string(),
                name: "sample_table".to_string(),
            },
            grant: GrantSettings {
                grantee: "app-role".to_string(),
                columns: vec!["name".to_string(), "amount".to_string()],
                session_tag_key: VendingConstants::DEFAULT_SESSION_TAG_KEY.to_string(),
                session_tag_value: "lakevend-sandbox".to_string(),
                full_table_access: false,
            },
            vending: VendingSettings::default(),
            storage: StorageSettings::default(),
            reader: ReaderSettings::default(),
            logging: LoggingSettings::default(),
            backend: BackendSettings {
                kind: BackendKind::Sandbox,
            },
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - LAKEVEND_LOG_LEVEL: Override logging.level
    /// - LAKEVEND_LOG_TO_CONSOLE: Override logging.log_to_console
    /// - LAKEVEND_LOGS_PATH: Override logging.logs_path
    /// - LAKEVEND_AWS_REGION: Override vending.region
    /// - LAKEVEND_GRANTEE_ROLE: Override grant.grantee
    /// - LAKEVEND_SESSION_TAG_VALUE: Override grant.session_tag_value
    /// - LAKEVEND_BACKEND: Override backend.kind
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        use std::env;

        if let Ok(level) = env::var("LAKEVEND_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(val) = env::var("LAKEVEND_LOG_TO_CONSOLE") {
            self.logging.log_to_console =
                val.to_lowercase() == "true" || val == "1" || val.to_lowercase() == "yes";
        }

        if let Ok(dir) = env::var("LAKEVEND_LOGS_PATH") {
            self.logging.logs_path = Some(dir);
        }

        if let Ok(region) = env::var("LAKEVEND_AWS_REGION") {
            self.vending.region = Some(region);
        }

        if let Ok(role) = env::var("LAKEVEND_GRANTEE_ROLE") {
            self.grant.grantee = role;
        }

        if let Ok(value) = env::var("LAKEVEND_SESSION_TAG_VALUE") {
            self.grant.session_tag_value = value;
        }

        if let Ok(kind) = env::var("LAKEVEND_BACKEND") {
            self.backend.kind = kind
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid LAKEVEND_BACKEND value: {}", e))?;
        }

        Ok(())
    }

    /// Normalize local filesystem paths and validate configuration.
    ///
    /// Call this after applying environment overrides.
    pub fn finalize(&mut self) -> anyhow::Result<()> {
        if let Some(dir) = self.logging.logs_path.take() {
            self.logging.logs_path = Some(normalize_dir_path(&dir));
        }

        self.validate()?;

        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.table.database.trim().is_empty() || self.table.name.trim().is_empty() {
            return Err(anyhow::anyhow!("table.database and table.name cannot be empty"));
        }

        self.grant
            .grantee_identity()
            .map_err(|e| anyhow::anyhow!("Invalid grant.grantee: {}", e))?;
        self.grant
            .column_set()
            .map_err(|e| anyhow::anyhow!("Invalid grant.columns: {}", e))?;
        self.grant
            .session_tag()
            .map_err(|e| anyhow::anyhow!("Invalid grant session tag: {}", e))?;

        let duration = self.vending.duration_secs;
        if !(VendingConstants::MIN_CREDENTIAL_DURATION_SECS
            ..=VendingConstants::MAX_CREDENTIAL_DURATION_SECS)
            .contains(&duration)
        {
            return Err(anyhow::anyhow!(
                "vending.duration_secs ({}) must be between {} and {}",
                duration,
                VendingConstants::MIN_CREDENTIAL_DURATION_SECS,
                VendingConstants::MAX_CREDENTIAL_DURATION_SECS
            ));
        }

        let permissions = self
            .vending
            .parsed_permissions()
            .map_err(|e| anyhow::anyhow!("Invalid vending.permissions: {}", e))?;
        if permissions.is_empty() {
            return Err(anyhow::anyhow!("vending.permissions cannot be empty"));
        }
        self.vending
            .parsed_permission_types()
            .map_err(|e| anyhow::anyhow!("Invalid vending.supported_permission_types: {}", e))?;

        if self.reader.target_partitions == 0 {
            return Err(anyhow::anyhow!("reader.target_partitions cannot be 0"));
        }

        if !self.reader.csv_delimiter.is_ascii() {
            return Err(anyhow::anyhow!(
                "reader.csv_delimiter must be a single ASCII character"
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_formats.join(", ")
            ));
        }

        for (target, level) in &self.logging.targets {
            if !valid_levels.contains(&level.as_str()) {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}' for target '{}'. Must be one of: {}",
                    level,
                    target,
                    valid_levels.join(", ")
                ));
            }
        }

        Ok(())
    }
}
