//! lakevend-configs
//!
//! Configuration types and loader for the lakevend driver.

pub mod config;
pub mod file_helpers;

pub use config::*;
pub use config::defaults;
