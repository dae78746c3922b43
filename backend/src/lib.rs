//! lakevend driver library
//!
//! Command-line parsing, logging setup and the vend-then-read run, exposed
//! for integration testing.

pub mod args;
pub mod driver;
pub mod logging;
