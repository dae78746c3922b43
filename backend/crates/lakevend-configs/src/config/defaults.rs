use lakevend_commons::VendingConstants;

// Default value functions
pub fn default_true() -> bool {
    true
}

pub fn default_session_tag_key() -> String {
    VendingConstants::DEFAULT_SESSION_TAG_KEY.to_string()
}

pub fn default_credential_duration_secs() -> u32 {
    VendingConstants::DEFAULT_CREDENTIAL_DURATION_SECS
}

pub fn default_permissions() -> Vec<String> {
    vec!["SELECT".to_string()]
}

pub fn default_supported_permission_types() -> Vec<String> {
    vec!["COLUMN_PERMISSION".to_string()]
}

pub fn default_propagation_retries() -> u32 {
    0 // surface propagation errors directly
}

pub fn default_retry_backoff_ms() -> u64 {
    500
}

pub fn default_remote_request_timeout() -> u64 {
    60
}

pub fn default_remote_connect_timeout() -> u64 {
    10
}

pub fn default_target_partitions() -> usize {
    4
}

pub fn default_csv_delimiter() -> char {
    ','
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_format() -> String {
    "compact".to_string()
}
