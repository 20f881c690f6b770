//! Raw CSV preparation ahead of conversion.
//!
//! Measurement logs rarely arrive as clean comma-separated tables. These
//! operations knock a raw file into shape: dropping leading lines, adding
//! a header, re-delimiting to CSV, rewriting timestamp columns to epoch
//! seconds and deriving inter-arrival time columns. All operations rewrite
//! the file in place except [`to_csv`], which writes a `.csv` sibling.

use anyhow::{Context as _, Result, anyhow, bail};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::{Path, PathBuf};

fn read_table(path: &Path, has_header: bool, skip_rows: usize, separator: u8) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default().with_separator(separator);
    CsvReadOptions::default()
        .with_has_header(has_header)
        .with_skip_rows(skip_rows)
        .with_infer_schema_length(Some(10000))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn write_table(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn numeric_column(df: &DataFrame, idx: usize) -> Result<Float64Chunked> {
    if idx >= df.width() {
        bail!(
            "column index {idx} out of range, the file has {} columns",
            df.width()
        );
    }
    let series = df.get_columns()[idx].as_materialized_series();
    let casted = series.cast(&DataType::Float64).with_context(|| {
        format!("column '{}' needs to contain numbers", series.name())
    })?;
    // a non-strict cast turns unparseable cells into nulls
    if casted.null_count() > series.null_count() {
        bail!("column '{}' needs to contain numbers", series.name());
    }
    Ok(casted.f64().map_err(|e| anyhow!(e))?.clone())
}

/// Drops the first `line_amount` lines of the file; the following line
/// becomes the header of the remaining table.
pub fn remove_first_rows(path: &Path, line_amount: usize) -> Result<()> {
    let mut df = read_table(path, true, line_amount, b',')?;
    write_table(&mut df, path)?;
    tracing::info!(
        "Removed the first {line_amount} line(s) from {}",
        path.display()
    );
    Ok(())
}

/// Places `header` on top of a headerless `.csv` file.
pub fn add_header(path: &Path, header: &[String]) -> Result<()> {
    if path.extension().and_then(|s| s.to_str()) != Some("csv") {
        bail!("headers can only be added to .csv files");
    }
    let mut df = read_table(path, false, 0, b',')?;
    if header.len() != df.width() {
        bail!(
            "the passed header has {} elements but {} are required",
            header.len(),
            df.width()
        );
    }
    df.set_column_names(header.iter().map(String::as_str))
        .map_err(|e| anyhow!(e))?;
    write_table(&mut df, path)?;
    tracing::info!("Header {header:?} added to {}", path.display());
    Ok(())
}

/// Re-delimits a table into a comma-separated `.csv` sibling.
///
/// `header` overrides the column names; with `first_line_is_header` unset
/// the first line is treated as data.
pub fn to_csv(
    path: &Path,
    delimiter: &str,
    header: Option<&[String]>,
    first_line_is_header: bool,
) -> Result<PathBuf> {
    let separator = match delimiter.as_bytes() {
        [b] => *b,
        _ => bail!("delimiter must be a single character, got '{delimiter}'"),
    };

    let mut df = read_table(path, first_line_is_header, 0, separator)?;
    if let Some(header) = header {
        if header.len() != df.width() {
            bail!(
                "the passed header has {} elements but {} are required",
                header.len(),
                df.width()
            );
        }
        df.set_column_names(header.iter().map(String::as_str))
            .map_err(|e| anyhow!(e))?;
    }

    let output = path.with_extension("csv");
    write_table(&mut df, &output)?;
    tracing::info!("{} converted to {}", path.display(), output.display());
    Ok(output)
}

fn cell_to_epoch(value: &str, format: &str) -> Result<f64> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(datetime.and_utc().timestamp() as f64);
    }
    // date-only formats parse without a time component
    let date = NaiveDate::parse_from_str(value, format).with_context(|| {
        format!("timestamp '{value}' could not be parsed with format '{format}'")
    })?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid date '{value}'"))?;
    Ok(midnight.and_utc().timestamp() as f64)
}

/// Rewrites timestamp columns as epoch seconds (UTC).
///
/// `formats` holds one strftime-style format per entry in `columns`.
pub fn timestamps_to_epoch(path: &Path, columns: &[usize], formats: &[String]) -> Result<()> {
    if columns.len() != formats.len() {
        bail!(
            "{} column index(es) but {} format string(s) given",
            columns.len(),
            formats.len()
        );
    }

    let mut df = read_table(path, true, 0, b',')?;
    for (&idx, format) in columns.iter().zip(formats) {
        if idx >= df.width() {
            bail!(
                "column index {idx} out of range, the file has {} columns",
                df.width()
            );
        }
        let series = df.get_columns()[idx].as_materialized_series();
        let name = series.name().clone();
        let casted = series.cast(&DataType::String).map_err(|e| anyhow!(e))?;
        let ca = casted.str().map_err(|e| anyhow!(e))?;

        let mut epochs: Vec<Option<f64>> = Vec::with_capacity(ca.len());
        for value in ca {
            match value {
                Some(value) => epochs.push(Some(cell_to_epoch(value, format)?)),
                None => epochs.push(None),
            }
        }
        let epoch_series =
            Float64Chunked::from_iter_options(name.clone(), epochs.into_iter()).into_series();
        df.replace(name.as_str(), epoch_series)
            .map_err(|e| anyhow!(e))?;
    }

    write_table(&mut df, path)?;
    tracing::info!("Timestamps of {} rewritten as epoch seconds", path.display());
    Ok(())
}

/// Appends (or overwrites) `result_name` with the row-to-row difference of
/// the addressed column; the first row stays empty.
pub fn interarrival_row_wise(path: &Path, column: usize, result_name: &str) -> Result<()> {
    let mut df = read_table(path, true, 0, b',')?;
    let ca = numeric_column(&df, column)?;
    let values: Vec<Option<f64>> = ca.into_iter().collect();

    let mut diffs: Vec<Option<f64>> = Vec::with_capacity(values.len());
    diffs.push(None);
    for pair in values.windows(2) {
        diffs.push(match (pair[0], pair[1]) {
            (Some(previous), Some(current)) => Some(current - previous),
            _ => None,
        });
    }

    let diff_series =
        Float64Chunked::from_iter_options(result_name.into(), diffs.into_iter()).into_series();
    df.with_column(diff_series).map_err(|e| anyhow!(e))?;
    write_table(&mut df, path)?;
    tracing::info!(
        "Row-wise difference of column {column} written to '{result_name}' in {}",
        path.display()
    );
    Ok(())
}

/// Appends (or overwrites) `result_name` with `first - second` per row.
pub fn interarrival_column_wise(
    path: &Path,
    first: usize,
    second: usize,
    result_name: &str,
) -> Result<()> {
    let mut df = read_table(path, true, 0, b',')?;
    let lhs = numeric_column(&df, first)?;
    let rhs = numeric_column(&df, second)?;

    let diffs: Vec<Option<f64>> = lhs
        .into_iter()
        .zip(&rhs)
        .map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some(a - b),
            _ => None,
        })
        .collect();

    let diff_series =
        Float64Chunked::from_iter_options(result_name.into(), diffs.into_iter()).into_series();
    df.with_column(diff_series).map_err(|e| anyhow!(e))?;
    write_table(&mut df, path)?;
    tracing::info!(
        "Column-wise difference ({first} - {second}) written to '{result_name}' in {}",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_remove_first_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "junk line\nanother\na,b\n1,2\n3,4\n");

        remove_first_rows(&path, 2).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_add_header() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "1,2\n3,4\n");

        add_header(&path, &["a".to_owned(), "b".to_owned()]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_add_header_wrong_arity() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "1,2\n3,4\n");

        let err = add_header(&path, &["a".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("1 elements but 2 are required"));
    }

    #[test]
    fn test_add_header_requires_csv_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.dat", "1,2\n");

        assert!(add_header(&path, &["a".to_owned(), "b".to_owned()]).is_err());
    }

    #[test]
    fn test_to_csv_from_semicolons() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.log", "a;b\n1;2\n3;4\n");

        let output = to_csv(&path, ";", None, true).unwrap();
        assert!(output.ends_with("t.csv"));
        let content = std::fs::read_to_string(output).unwrap();
        assert_eq!(content, "a,b\n1,2\n3,4\n");
    }

    #[test]
    fn test_to_csv_rejects_long_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.log", "a;;b\n");
        assert!(to_csv(&path, ";;", None, true).is_err());
    }

    #[test]
    fn test_timestamps_to_epoch() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "t.csv",
            "stamp,size\n1970-01-01 00:00:10,5\n1970-01-01 00:01:00,6\n",
        );

        timestamps_to_epoch(&path, &[0], &["%Y-%m-%d %H:%M:%S".to_owned()]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "stamp,size\n10.0,5\n60.0,6\n");
    }

    #[test]
    fn test_timestamps_format_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "stamp\n1970-01-01\n");

        let err = timestamps_to_epoch(&path, &[0, 1], &["%Y".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("format string"));
    }

    #[test]
    fn test_timestamps_unparseable_cell() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "stamp\nnot-a-date\n");

        let err = timestamps_to_epoch(&path, &[0], &["%Y-%m-%d".to_owned()]).unwrap_err();
        assert!(err.to_string().contains("could not be parsed"));
    }

    #[test]
    fn test_interarrival_row_wise() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "time\n10\n15\n25\n");

        interarrival_row_wise(&path, 0, "iat").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "time,iat\n10,\n15,5.0\n25,10.0\n");
    }

    #[test]
    fn test_interarrival_column_wise() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "end,start\n10,4\n20,5\n");

        interarrival_column_wise(&path, 0, 1, "duration").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "end,start,duration\n10,4,6.0\n20,5,15.0\n");
    }

    #[test]
    fn test_interarrival_rejects_text_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "t.csv", "name\nfoo\nbar\n");

        let err = interarrival_row_wise(&path, 0, "iat").unwrap_err();
        assert!(err.to_string().contains("needs to contain numbers"));
    }
}
