//! # lakevend-filestore
//!
//! Object-store reads for lakevend, driven entirely by a vended credential
//! bundle.
//!
//! ## Architecture
//!
//! - **Store factory**: builds an S3 object store from explicit credentials
//! - **Store resolver**: the seam that turns credentials into a store
//! - **Listing**: data files under a table root, filtered by format
//! - **Readers**: the same files loaded into a Polars `DataFrame`
//!   (in-memory) or DataFusion record batch partitions (partitioned)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use lakevend_filestore::{Representation, S3StoreResolver, ScopedReader};
//!
//! let reader = ScopedReader::new(Arc::new(S3StoreResolver::new(storage)), reader_settings);
//! let table = reader
//!     .read(&access.credentials, &access.data_location(), Representation::InMemory)
//!     .await?;
//! ```

pub mod core;
pub mod error;
pub mod object_store_ops;
pub mod reader;

pub use crate::core::factory::build_s3_store;
pub use crate::core::paths::StorageUrl;
pub use crate::core::resolver::{S3StoreResolver, StoreResolver};
pub use error::{ReadError, Representation, Result};
pub use object_store_ops::{list_data_files, read_object};
pub use reader::{ScopedReader, TabularResult};
