//! # binrec Core
//!
//! Versioned fixed-width records.
//!
//! This crate provides:
//! - Ordered field schemas built from [`binrec_codec::Packer`]s
//! - Declarative migration rules attached to a record type
//! - Reconstruction of every historical layout from the current schema
//! - Decoding of any historical encoding into the current schema
//!
//! ## Usage
//!
//! ```
//! use binrec_codec::{Packer, Value};
//! use binrec_core::{MigrationRule, RecordType};
//!
//! let counter = RecordType::builder("Counter")
//!     .version(2)
//!     .field("count", Packer::uint16())
//!     .migration(MigrationRule::converted(1, "count", Packer::uint8(), |old| {
//!         old.as_integer().unwrap_or_default() * 10
//!     }))
//!     .build()
//!     .unwrap();
//!
//! // A byte string written when `count` was a single byte.
//! let record = counter.decode(&[1, 42]).unwrap();
//! assert_eq!(record.get("count"), Some(&Value::from(420)));
//!
//! // Re-encoding always uses the current layout.
//! assert_eq!(record.encode().unwrap(), vec![2, 0x01, 0xa4]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod history;
pub mod migration;
pub mod record;
pub mod schema;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use history::HistoricalSchemas;
pub use migration::{
    MigrationAction, MigrationInfo, MigrationKind, MigrationRegistry, MigrationRule,
    MigrationVersion, ValueSet,
};
pub use record::{Record, RecordType, RecordTypeBuilder};
pub use schema::{Field, Schema};

/// Crate version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
