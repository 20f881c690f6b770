//! Trace integrity: content hashing and validation.
//!
//! Converted traces carry their own SHA-256 digest in
//! `traceheader.metainformation."hash value"`. Because the digest is stored
//! inside the file it protects, it is computed over the file's lines with
//! every line containing the substring `hash value` excluded.
//!
//! ## Hash a freshly converted trace
//!
//! ```no_run
//! use traceconv::integrity;
//! use std::path::Path;
//!
//! # fn example() -> traceconv::error::Result<()> {
//! integrity::add_hash_to_trace(Path::new("traces/converted/example_sf.json"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Verify later
//!
//! ```no_run
//! use traceconv::integrity;
//! use std::path::Path;
//!
//! # fn example() -> traceconv::error::Result<()> {
//! let result = integrity::hash_check(Path::new("traces/converted/example_sf.json"))?;
//! if !result.passed {
//!     eprintln!("{}", result.format_cli());
//! }
//! # Ok(())
//! # }
//! ```

pub mod hasher;
pub mod validator;

pub use hasher::{add_hash_to_trace, hash_from_trace};
pub use validator::{
    HashCheckResult, StatisticsReport, hash_check, restore_traceheader, verify_statistics,
};
