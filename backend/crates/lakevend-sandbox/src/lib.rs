//! # lakevend-sandbox
//!
//! An in-process data lake for local runs and tests. One [`SandboxLake`]
//! plays every external service of the vending flow:
//!
//! - permissions service: column grants (replace or union semantics)
//! - identity service: role assumption gated by a session tag
//! - data access: temporary table credentials and unfiltered metadata
//! - object storage: serves only the granted columns of the granted table
//!
//! ```rust,ignore
//! let sample = SandboxLake::with_sample_data()?;
//! let lake = Arc::new(sample.lake.clone());
//! let vendor = CredentialVendor::new(lake.clone(), lake.clone(), options);
//! let reader = ScopedReader::new(lake, reader_settings);
//! ```

pub mod error;
pub mod lake;
pub mod sample;
pub mod services;
pub mod storage;

pub use error::{Result, SandboxError};
pub use lake::{GrantSemantics, SandboxLake, DEFAULT_ACCOUNT_ID, DEFAULT_BUCKET, DEFAULT_REGION};
pub use sample::{
    sample_schema, SampleLake, SAMPLE_DATABASE, SAMPLE_ROLE, SAMPLE_ROWS, SAMPLE_SESSION_TAG_VALUE,
    SAMPLE_TABLE,
};
pub use services::SandboxSession;
