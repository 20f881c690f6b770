//! CSV to trace conversion pipeline.
//!
//! Takes a raw CSV file plus user-supplied metainformation, extracts the
//! requested columns, computes statistics, writes the standardized trace
//! JSON and annotates it with its content hash. Optionally chains a
//! ProFiDo extraction of the freshly converted trace.

use crate::config::AppSettings;
use crate::error::{Result, TraceConvError};
use crate::integrity::hasher;
use crate::profido;
use crate::trace::columns;
use crate::trace::statistics::{self, MIN_SAMPLES, NumFormat};
use crate::trace::{MetaInformation, TraceBody, TraceDocument, TraceHeader};
use std::path::{Path, PathBuf};

/// Everything the conversion step needs besides the app settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Raw CSV input file
    pub input: PathBuf,
    /// Column indexes to keep as tracedata
    pub columns: Vec<usize>,
    pub source: String,
    pub description: String,
    /// One entry per tracedata column
    pub tracedata_description: Vec<String>,
    pub user: String,
    /// Free-form entries; an empty list omits the field from the header
    pub additional_information: Vec<String>,
    /// Format applied to the computed statistics
    pub statistics_format: NumFormat,
    /// Stem of the result file; the trace lands at `<stem>_sf.json`
    pub result_stem: String,
    /// Allow replacing an existing result file
    pub overwrite: bool,
    /// When set, extract `<stem>_dat.trace` for ProFiDo after conversion
    pub profido_stem: Option<String>,
}

/// What the conversion produced.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub trace_path: PathBuf,
    /// False when the tracedata was too short for statistics
    pub statistics_computed: bool,
    pub profido_path: Option<PathBuf>,
}

/// Converts a raw CSV trace into the standardized trace format.
pub fn convert_trace(options: &ConvertOptions, settings: &AppSettings) -> Result<ConvertOutcome> {
    ensure_csv_file(&options.input)?;

    let tracedata = columns::tracedata_from_file(&options.input, &options.columns)?;
    let row_count = tracedata.first().map_or(0, Vec::len);

    let statistics_computed = row_count >= MIN_SAMPLES;
    let statistics = if statistics_computed {
        statistics::generate(&tracedata, &options.statistics_format)?
    } else {
        tracing::warn!(
            "Tracedata only contains {row_count} elements per column, \
             computing statistics requires {MIN_SAMPLES} or more"
        );
        Default::default()
    };

    let name = options
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_owned();

    let trace = TraceDocument {
        traceheader: TraceHeader {
            metainformation: MetaInformation {
                name,
                source: options.source.clone(),
                description: options.description.clone(),
                creation_timestamp: chrono::Local::now()
                    .format("%Y-%m-%d %H:%M:%S%.6f")
                    .to_string(),
                user: options.user.clone(),
                additional_information: if options.additional_information.is_empty() {
                    None
                } else {
                    Some(options.additional_information.clone())
                },
                hash_value: String::new(),
            },
            statistics,
        },
        tracebody: TraceBody {
            tracedata_description: options.tracedata_description.clone(),
            tracedata,
        },
    };

    std::fs::create_dir_all(&settings.converted_traces_dir)?;
    let trace_path = trace_output_path(settings, &options.result_stem);
    check_overwrite(&trace_path, options.overwrite)?;

    trace.save(&trace_path)?;
    hasher::add_hash_to_trace(&trace_path)?;
    tracing::info!(
        "{} was converted to {}",
        options.input.display(),
        trace_path.display()
    );

    let profido_path = match &options.profido_stem {
        Some(stem) => {
            let extract = profido::ExtractOptions {
                trace: trace_path.clone(),
                result_stem: stem.clone(),
                float_format: settings
                    .default_float_format
                    .parse()
                    .map_err(|e: anyhow::Error| TraceConvError::InvalidFormat(e.to_string()))?,
                overwrite: options.overwrite,
            };
            Some(profido::extract_columns(&extract, settings)?)
        }
        None => None,
    };

    Ok(ConvertOutcome {
        trace_path,
        statistics_computed,
        profido_path,
    })
}

/// Path a conversion with this result stem writes to.
pub fn trace_output_path(settings: &AppSettings, stem: &str) -> PathBuf {
    settings.converted_traces_dir.join(format!("{stem}_sf.json"))
}

fn ensure_csv_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(TraceConvError::InvalidPath(format!(
            "{} is not a file",
            path.display()
        )));
    }
    if path.extension().and_then(|s| s.to_str()) != Some("csv") {
        return Err(TraceConvError::InvalidPath(format!(
            "{} is not a .csv file",
            path.display()
        )));
    }
    Ok(())
}

/// Refuses to replace `path` unless `overwrite` is set.
pub fn check_overwrite(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(TraceConvError::Other(format!(
            "{} already exists, enable overwriting to replace it",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::validator;
    use tempfile::TempDir;

    fn test_settings(dir: &TempDir) -> AppSettings {
        AppSettings {
            raw_traces_dir: dir.path().join("raw"),
            converted_traces_dir: dir.path().join("converted"),
            profido_traces_dir: dir.path().join("profido"),
            ..Default::default()
        }
    }

    fn sample_options(input: PathBuf) -> ConvertOptions {
        ConvertOptions {
            input,
            columns: vec![0, 1],
            source: "testbed".to_owned(),
            description: "response times".to_owned(),
            tracedata_description: vec!["seconds".to_owned(), "bytes".to_owned()],
            user: "jane".to_owned(),
            additional_information: Vec::new(),
            statistics_format: NumFormat::Fixed(6),
            result_stem: "sample".to_owned(),
            overwrite: false,
            profido_stem: None,
        }
    }

    fn write_input(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("input.csv");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_convert_produces_valid_trace() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "time,size\n1,10\n2,20\n3,30\n4,40\n5,50\n");
        let settings = test_settings(&dir);

        let outcome = convert_trace(&sample_options(input), &settings).unwrap();
        assert!(outcome.statistics_computed);
        assert!(outcome.trace_path.ends_with("sample_sf.json"));

        let trace = TraceDocument::load(&outcome.trace_path).unwrap();
        assert_eq!(trace.traceheader.metainformation.name, "input.csv");
        assert_eq!(trace.column_count(), 2);
        assert_eq!(trace.traceheader.statistics.mean.len(), 2);
        assert!(!trace.traceheader.metainformation.hash_value.is_empty());

        // the converted trace passes both validations
        assert!(validator::hash_check(&outcome.trace_path).unwrap().passed);
        let report = validator::verify_statistics(&outcome.trace_path, 0.001).unwrap();
        assert!(report.valid, "{}", report.format_cli());
    }

    #[test]
    fn test_short_trace_gets_no_statistics() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "time,size\n1,10\n2,20\n3,30\n");
        let settings = test_settings(&dir);

        let outcome = convert_trace(&sample_options(input), &settings).unwrap();
        assert!(!outcome.statistics_computed);

        let trace = TraceDocument::load(&outcome.trace_path).unwrap();
        assert!(trace.traceheader.statistics.is_empty());
    }

    #[test]
    fn test_convert_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "time,size\n1,10\n2,20\n3,30\n4,40\n5,50\n");
        let settings = test_settings(&dir);
        let options = sample_options(input);

        convert_trace(&options, &settings).unwrap();
        let err = convert_trace(&options, &settings).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let forced = ConvertOptions {
            overwrite: true,
            ..options
        };
        convert_trace(&forced, &settings).unwrap();
    }

    #[test]
    fn test_convert_rejects_non_csv_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, "a,b\n1,2\n").unwrap();
        let settings = test_settings(&dir);

        let err = convert_trace(&sample_options(input), &settings).unwrap_err();
        assert!(err.to_string().contains("not a .csv file"));
    }

    #[test]
    fn test_convert_with_profido_extraction() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "time,size\n1,10\n2,20\n3,30\n4,40\n5,50\n");
        let settings = test_settings(&dir);
        let options = ConvertOptions {
            profido_stem: Some("sample".to_owned()),
            ..sample_options(input)
        };

        let outcome = convert_trace(&options, &settings).unwrap();
        let profido_path = outcome.profido_path.unwrap();
        assert!(profido_path.ends_with("sample_dat.trace"));

        let content = std::fs::read_to_string(profido_path).unwrap();
        let first_line = content.lines().next().unwrap();
        assert_eq!(first_line, "1.000000e+00\t1.000000e+01");
    }

    #[test]
    fn test_additional_information_omitted_when_empty() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "time,size\n1,10\n2,20\n3,30\n4,40\n5,50\n");
        let settings = test_settings(&dir);

        let outcome = convert_trace(&sample_options(input), &settings).unwrap();
        let json = std::fs::read_to_string(&outcome.trace_path).unwrap();
        assert!(!json.contains("additional information"));
    }
}
