//! Serde model for the standardized trace document.
//!
//! Field names are part of the wire format shared with other trace tooling
//! (several keys contain spaces), so the Rust names map onto them via
//! `#[serde(rename)]`. Statistic values are written as formatted strings
//! but traces produced by other tools may store plain numbers; both forms
//! deserialize into [`StatValue`].

use crate::error::{Result, ResultExt as _, TraceConvError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraceDocument {
    pub traceheader: TraceHeader,
    pub tracebody: TraceBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraceHeader {
    pub metainformation: MetaInformation,
    #[serde(rename = "statistical characteristics")]
    pub statistics: StatisticalCharacteristics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetaInformation {
    /// Basename of the raw file the trace was converted from
    pub name: String,
    pub source: String,
    pub description: String,
    #[serde(rename = "creation timestamp")]
    pub creation_timestamp: String,
    pub user: String,
    /// Free-form entries; omitted entirely when empty
    #[serde(
        rename = "additional information",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_information: Option<Vec<String>>,
    /// SHA-256 of the serialized file with the hash line excluded.
    /// Empty until the hash annotation step has run.
    #[serde(rename = "hash value", default)]
    pub hash_value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatisticalCharacteristics {
    pub mean: Vec<StatValue>,
    pub median: Vec<StatValue>,
    /// Older traces used the key "skew"
    #[serde(alias = "skew")]
    pub skewness: Vec<StatValue>,
    pub kurtosis: Vec<StatValue>,
    pub autocorrelation: Vec<StatValue>,
    pub variance: Vec<StatValue>,
}

impl StatisticalCharacteristics {
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
            && self.median.is_empty()
            && self.skewness.is_empty()
            && self.kurtosis.is_empty()
            && self.autocorrelation.is_empty()
            && self.variance.is_empty()
    }

    /// Clears all statistic arrays.
    pub fn clear(&mut self) {
        self.mean.clear();
        self.median.clear();
        self.skewness.clear();
        self.kurtosis.clear();
        self.autocorrelation.clear();
        self.variance.clear();
    }

    /// The six arrays paired with their display names, for uniform iteration.
    pub fn named(&self) -> [(&'static str, &[StatValue]); 6] {
        [
            ("mean", &self.mean),
            ("median", &self.median),
            ("skewness", &self.skewness),
            ("kurtosis", &self.kurtosis),
            ("autocorrelation", &self.autocorrelation),
            ("variance", &self.variance),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TraceBody {
    #[serde(rename = "tracedatadescription")]
    pub tracedata_description: Vec<String>,
    /// Column-major measurement data: one inner vector per kept CSV column
    pub tracedata: Vec<Vec<f64>>,
}

/// A single stored statistic value.
///
/// Values we write are strings rendered through the configured numeric
/// format; values read from foreign traces may be raw JSON numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                TraceConvError::InvalidTrace(format!("statistic value '{s}' is not numeric"))
            }),
        }
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl TraceDocument {
    /// Number of tracedata columns.
    pub fn column_count(&self) -> usize {
        self.tracebody.tracedata.len()
    }

    /// Loads a converted trace from disk.
    ///
    /// The path must point to an existing `.json` file; malformed content
    /// is reported as [`TraceConvError::InvalidTrace`].
    pub fn load(path: &Path) -> Result<Self> {
        ensure_json_file(path)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file: {}", path.display()))?;
        serde_json::from_str(&content).map_err(|e| {
            TraceConvError::InvalidTrace(format!("{} is not a valid trace: {e}", path.display()))
        })
    }

    /// Writes the trace as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write trace file: {}", path.display()))?;
        Ok(())
    }
}

/// Checks that `path` points to an existing `.json` file.
pub fn ensure_json_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(TraceConvError::InvalidPath(format!(
            "{} is not a file",
            path.display()
        )));
    }
    if path.extension().and_then(|s| s.to_str()) != Some("json") {
        return Err(TraceConvError::InvalidPath(format!(
            "{} is not a .json trace file",
            path.display()
        )));
    }
    Ok(())
}
