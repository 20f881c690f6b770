//! Tracedata extraction for ProFiDo.
//!
//! ProFiDo consumes tab-separated, column-transposed numeric data without
//! header or index. The extractor transposes a trace's column-major
//! tracedata into rows, drops rows containing non-finite values, renders
//! every value through the configured float format and writes
//! `<stem>_dat.trace` into the ProFiDo directory.

use crate::config::AppSettings;
use crate::convert::check_overwrite;
use crate::error::{Result, ResultExt as _};
use crate::trace::{NumFormat, TraceDocument};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Converted trace to extract from
    pub trace: PathBuf,
    /// Stem of the result file; the extract lands at `<stem>_dat.trace`
    pub result_stem: String,
    pub float_format: NumFormat,
    /// Allow replacing an existing result file
    pub overwrite: bool,
}

/// Transposes column-major tracedata into row-major records.
///
/// Rows are produced up to the length of the shortest column, and rows
/// containing a non-finite value are dropped.
pub fn transpose_rows(tracedata: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let Some(row_count) = tracedata.iter().map(Vec::len).min() else {
        return Vec::new();
    };

    (0..row_count)
        .map(|i| tracedata.iter().map(|column| column[i]).collect::<Vec<_>>())
        .filter(|row: &Vec<f64>| row.iter().all(|v| v.is_finite()))
        .collect()
}

/// Path an extraction with this result stem writes to.
pub fn output_path(settings: &AppSettings, stem: &str) -> PathBuf {
    settings
        .profido_traces_dir
        .join(format!("{stem}_dat.trace"))
}

/// Extracts the tracedata of a converted trace into ProFiDo's format.
///
/// Returns the path of the written `_dat.trace` file.
pub fn extract_columns(options: &ExtractOptions, settings: &AppSettings) -> Result<PathBuf> {
    let trace = TraceDocument::load(&options.trace)?;
    let rows = transpose_rows(&trace.tracebody.tracedata);

    std::fs::create_dir_all(&settings.profido_traces_dir)?;
    let output = output_path(settings, &options.result_stem);
    check_overwrite(&output, options.overwrite)?;

    let mut content = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .map(|&value| options.float_format.render(value))
            .collect();
        content.push_str(&line.join("\t"));
        content.push('\n');
    }

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write ProFiDo extract: {}", output.display()))?;
    tracing::info!(
        "Extracted {} rows from {} into {}",
        rows.len(),
        options.trace.display(),
        output.display()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceBody, TraceDocument};
    use tempfile::TempDir;

    fn settings_with_dirs(dir: &TempDir) -> AppSettings {
        AppSettings {
            profido_traces_dir: dir.path().join("profido"),
            ..Default::default()
        }
    }

    fn write_trace(dir: &TempDir, tracedata: Vec<Vec<f64>>) -> PathBuf {
        let path = dir.path().join("trace.json");
        let trace = TraceDocument {
            tracebody: TraceBody {
                tracedata_description: Vec::new(),
                tracedata,
            },
            ..Default::default()
        };
        trace.save(&path).unwrap();
        path
    }

    #[test]
    fn test_transpose_rows() {
        let rows = transpose_rows(&[vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]]);
        assert_eq!(
            rows,
            vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]]
        );
    }

    #[test]
    fn test_transpose_truncates_to_shortest_column() {
        let rows = transpose_rows(&[vec![1.0, 2.0, 3.0], vec![10.0]]);
        assert_eq!(rows, vec![vec![1.0, 10.0]]);
    }

    #[test]
    fn test_transpose_drops_non_finite_rows() {
        let rows = transpose_rows(&[vec![1.0, f64::NAN, 3.0], vec![10.0, 20.0, 30.0]]);
        assert_eq!(rows, vec![vec![1.0, 10.0], vec![3.0, 30.0]]);
    }

    #[test]
    fn test_transpose_empty() {
        assert!(transpose_rows(&[]).is_empty());
    }

    #[test]
    fn test_extract_writes_tab_separated_scientific() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with_dirs(&dir);
        let trace = write_trace(&dir, vec![vec![1.0, 2.0], vec![0.5, 0.25]]);

        let output = extract_columns(
            &ExtractOptions {
                trace,
                result_stem: "example".to_owned(),
                float_format: NumFormat::Scientific(6),
                overwrite: false,
            },
            &settings,
        )
        .unwrap();

        assert!(output.ends_with("example_dat.trace"));
        let content = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            content,
            "1.000000e+00\t5.000000e-01\n2.000000e+00\t2.500000e-01\n"
        );
    }

    #[test]
    fn test_extract_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let settings = settings_with_dirs(&dir);
        let trace = write_trace(&dir, vec![vec![1.0]]);
        let options = ExtractOptions {
            trace,
            result_stem: "example".to_owned(),
            float_format: NumFormat::Shortest,
            overwrite: false,
        };

        extract_columns(&options, &settings).unwrap();
        let err = extract_columns(&options, &settings).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
