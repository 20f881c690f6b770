//! # traceconv - Trace Converting Tool
//!
//! Converts raw CSV measurement traces into a standardized JSON trace
//! format, annotates them with descriptive statistics and a content hash,
//! and validates, filters and re-exports previously converted traces.
//!
//! ## Quick Start
//!
//! ```no_run
//! use traceconv::convert::{ConvertOptions, convert_trace};
//! use traceconv::config::AppSettings;
//!
//! # fn example() -> traceconv::error::Result<()> {
//! let settings = AppSettings::default();
//! let options = ConvertOptions {
//!     input: "measurements.csv".into(),
//!     columns: vec![0, 2],
//!     source: "testbed".to_owned(),
//!     description: "packet inter-arrival times".to_owned(),
//!     tracedata_description: vec!["seconds".to_owned(), "bytes".to_owned()],
//!     user: "jane".to_owned(),
//!     additional_information: Vec::new(),
//!     statistics_format: "%.6f".parse()?,
//!     result_stem: "measurements".to_owned(),
//!     overwrite: false,
//!     profido_stem: None,
//! };
//! let outcome = convert_trace(&options, &settings)?;
//! println!("trace written to {}", outcome.trace_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`trace`]: the trace document model, column extraction and statistics
//! - [`convert`]: the CSV → trace conversion pipeline
//! - [`integrity`]: content hashing and trace validation
//! - [`filter`]: boolean expression filtering over trace statistics
//! - [`profido`]: tab-separated extraction for the ProFiDo tool
//! - [`prepare`]: raw CSV preparation (headers, delimiters, timestamps)
//! - [`gui`] / [`cli`]: the desktop application and its scripted twin

#![warn(clippy::all, rust_2018_idioms)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod gui;
pub mod integrity;
pub mod logging;
pub mod prepare;
pub mod profido;
pub mod theme;
pub mod trace;
pub mod utils;
