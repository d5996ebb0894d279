//! # binrec Testkit
//!
//! Test utilities for binrec.
//!
//! This crate provides:
//! - Record type fixtures covering unversioned, added, removed and
//!   converted fields
//! - Property-based test generators using proptest
//! - Fuzz testing harnesses
//! - Concurrent decode stress testing
//! - Byte-level test vectors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use binrec_testkit::prelude::*;
//!
//! #[test]
//! fn old_bytes_still_decode() {
//!     let record = versioned_new().decode(&[1, 3, 5]).unwrap();
//!     assert_eq!(record.get("bodyIndex"), Some(&0.into()));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use stress::*;
pub use vectors::*;
