//! The standardized trace document and the logic that produces it.
//!
//! A *trace* is a JSON document holding descriptive metadata, computed
//! statistics and the raw measurement columns of a converted CSV file:
//!
//! ```json
//! {
//!   "traceheader": {
//!     "metainformation": { "name": "...", "hash value": "..." },
//!     "statistical characteristics": { "mean": [], "median": [], ... }
//!   },
//!   "tracebody": { "tracedatadescription": [], "tracedata": [[...]] }
//! }
//! ```
//!
//! - [`document`]: the serde model plus load/save
//! - [`columns`]: CSV column selection and validation
//! - [`statistics`]: the six descriptive statistics and numeric formatting

pub mod columns;
pub mod document;
pub mod statistics;

pub use document::{
    MetaInformation, StatValue, StatisticalCharacteristics, TraceBody, TraceDocument, TraceHeader,
};
pub use statistics::{ColumnStatistics, NumFormat};
