//! Command line interface mirroring every GUI workflow for scripted use.

#![expect(clippy::print_stdout)]

use crate::config;
use crate::convert::{ConvertOptions, convert_trace};
use crate::filter;
use crate::integrity::validator;
use crate::prepare;
use crate::profido;
use crate::trace::NumFormat;
use crate::trace::columns::parse_column_indexes;
use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "traceconv",
    about = "Converts raw CSV measurement traces into a standardized, validated trace format"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a raw CSV trace into the standardized format
    Convert {
        /// Raw CSV input file
        file: PathBuf,

        /// Column indexes to keep, separated by semicolons or commas (e.g. "0;2")
        #[arg(short, long)]
        columns: String,

        /// Stem of the result file; defaults to the input file stem
        #[arg(short, long)]
        name: Option<String>,

        /// Origin of the measurement
        #[arg(long, default_value = "")]
        source: String,

        /// Description of the trace
        #[arg(long, default_value = "")]
        description: String,

        /// One entry per kept column, separated by semicolons
        #[arg(long, default_value = "")]
        tracedata_description: String,

        /// Name of the converting user
        #[arg(long, default_value = "")]
        user: String,

        /// Additional information entries, separated by semicolons
        #[arg(long, default_value = "")]
        additional_info: String,

        /// Statistics format string (e.g. "%.6f", "%e"); empty keeps full precision
        #[arg(long)]
        format: Option<String>,

        /// Also extract <STEM>_dat.trace for ProFiDo after conversion
        #[arg(long, value_name = "STEM")]
        profido: Option<String>,

        /// Replace existing result files
        #[arg(long)]
        force: bool,
    },

    /// Filter converted traces with a boolean expression over their statistics
    Filter {
        /// Expression over mean, median, skewness, kurtosis, autocorrelation, variance
        expression: String,

        /// Converted trace files to filter
        #[arg(required = true)]
        traces: Vec<PathBuf>,
    },

    /// Extract tracedata columns of a converted trace for usage in ProFiDo
    Extract {
        /// Converted trace file
        trace: PathBuf,

        /// Stem of the result file; defaults to the trace file stem
        #[arg(short, long)]
        name: Option<String>,

        /// Float format string (e.g. "%e")
        #[arg(long)]
        float_format: Option<String>,

        /// Replace an existing result file
        #[arg(long)]
        force: bool,
    },

    /// Recompute the statistics of a converted trace and compare within tolerance
    VerifyStats {
        /// Converted trace file
        trace: PathBuf,

        /// Relative tolerance between 0 and 1
        #[arg(short, long)]
        tolerance: Option<f64>,
    },

    /// Recompute the content hash of a converted trace and compare it to the stored one
    VerifyHash {
        /// Converted trace file
        trace: PathBuf,
    },

    /// Recompute statistics and hash of a converted trace in place
    Restore {
        /// Converted trace file
        trace: PathBuf,

        /// Statistics format string (e.g. "%.6f", "%e")
        #[arg(long)]
        format: Option<String>,
    },

    /// Prepare a raw CSV file for conversion
    Prepare {
        #[command(subcommand)]
        action: PrepareAction,
    },
}

#[derive(Subcommand)]
pub enum PrepareAction {
    /// Remove lines from the beginning of the file
    RemoveRows {
        file: PathBuf,

        /// Amount of lines to remove
        amount: usize,
    },

    /// Add a header to a headerless CSV file
    AddHeader {
        file: PathBuf,

        /// Header entries, comma separated
        header: String,
    },

    /// Convert a delimited file into a comma-separated .csv sibling
    ToCsv {
        file: PathBuf,

        /// Delimiter of the input file
        #[arg(short, long, default_value = ";")]
        delimiter: String,

        /// Header entries for the output, comma separated
        #[arg(long)]
        header: Option<String>,

        /// Treat the first line of the input as header
        #[arg(long)]
        first_line_is_header: bool,
    },

    /// Rewrite timestamp columns as epoch seconds
    Epoch {
        file: PathBuf,

        /// Column indexes, separated by semicolons or commas
        #[arg(short, long)]
        columns: String,

        /// One strftime format per column, separated by semicolons
        #[arg(short, long)]
        formats: String,
    },

    /// Append the row-to-row difference of a column
    DiffRows {
        file: PathBuf,

        /// Column index
        #[arg(short, long)]
        column: usize,

        /// Name of the result column
        #[arg(long, default_value = "interarrival")]
        result_column: String,
    },

    /// Append the per-row difference of two columns (first minus second)
    DiffColumns {
        file: PathBuf,

        /// Exactly two column indexes, separated by a semicolon or comma
        #[arg(short, long)]
        columns: String,

        /// Name of the result column
        #[arg(long, default_value = "interarrival")]
        result_column: String,
    },
}

/// Splits a semicolon-separated entry into trimmed, non-empty parts.
fn split_entries(entry: &str) -> Vec<String> {
    entry
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_format(entry: Option<String>, default: &str) -> Result<NumFormat> {
    entry
        .as_deref()
        .unwrap_or(default)
        .parse()
        .context("invalid format string")
}

fn file_stem(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".to_owned())
}

#[expect(clippy::too_many_lines)]
pub fn run_command(command: Commands) -> Result<()> {
    let settings = config::load_app_config();

    match command {
        Commands::Convert {
            file,
            columns,
            name,
            source,
            description,
            tracedata_description,
            user,
            additional_info,
            format,
            profido,
            force,
        } => {
            let options = ConvertOptions {
                columns: parse_column_indexes(&columns)?,
                source,
                description,
                tracedata_description: split_entries(&tracedata_description),
                user,
                additional_information: split_entries(&additional_info),
                statistics_format: parse_format(format, &settings.default_statistics_format)?,
                result_stem: name.unwrap_or_else(|| file_stem(&file)),
                overwrite: force,
                profido_stem: profido,
                input: file,
            };
            let outcome = convert_trace(&options, &settings)?;
            println!("Trace was converted to {}", outcome.trace_path.display());
            if !outcome.statistics_computed {
                println!("Statistics were not computed: tracedata is too short");
            }
            if let Some(profido_path) = outcome.profido_path {
                println!("Tracedata extracted to {}", profido_path.display());
            }
            Ok(())
        }

        Commands::Filter { expression, traces } => {
            let matches = filter::filter_traces(&expression, &traces)?;
            if matches.is_empty() {
                println!("No columns match '{expression}'");
                return Ok(());
            }
            println!(
                "{:<30} {:>3} {:>12} {:>12} {:>12} {:>12} {:>16} {:>12}",
                "name", "col", "mean", "median", "skewness", "kurtosis", "autocorrelation",
                "variance"
            );
            for m in &matches {
                let s = &m.statistics;
                println!(
                    "{:<30} {:>3} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>16.6} {:>12.6}",
                    m.trace_name, m.column, s.mean, s.median, s.skewness, s.kurtosis,
                    s.autocorrelation, s.variance
                );
            }
            Ok(())
        }

        Commands::Extract {
            trace,
            name,
            float_format,
            force,
        } => {
            let options = profido::ExtractOptions {
                result_stem: name.unwrap_or_else(|| file_stem(&trace)),
                float_format: parse_format(float_format, &settings.default_float_format)?,
                overwrite: force,
                trace,
            };
            let output = profido::extract_columns(&options, &settings)?;
            println!("Tracedata extracted to {}", output.display());
            Ok(())
        }

        Commands::VerifyStats { trace, tolerance } => {
            let tolerance = tolerance.unwrap_or(settings.default_tolerance);
            let report = validator::verify_statistics(&trace, tolerance)?;
            println!("{}", report.format_cli());
            if !report.valid {
                bail!("statistics validation failed");
            }
            Ok(())
        }

        Commands::VerifyHash { trace } => {
            let result = validator::hash_check(&trace)?;
            println!("{}", result.format_cli());
            if !result.passed {
                bail!("hash check failed");
            }
            Ok(())
        }

        Commands::Restore { trace, format } => {
            let format = parse_format(format, &settings.default_statistics_format)?;
            validator::restore_traceheader(&trace, &format)?;
            println!("Traceheader of {} restored", trace.display());
            Ok(())
        }

        Commands::Prepare { action } => match action {
            PrepareAction::RemoveRows { file, amount } => {
                prepare::remove_first_rows(&file, amount)?;
                println!("Removed the first {amount} line(s) from {}", file.display());
                Ok(())
            }
            PrepareAction::AddHeader { file, header } => {
                let entries: Vec<String> =
                    header.split(',').map(|s| s.trim().to_owned()).collect();
                prepare::add_header(&file, &entries)?;
                println!("Header added to {}", file.display());
                Ok(())
            }
            PrepareAction::ToCsv {
                file,
                delimiter,
                header,
                first_line_is_header,
            } => {
                let entries: Option<Vec<String>> = header
                    .map(|h| h.split(',').map(|s| s.trim().to_owned()).collect());
                let output =
                    prepare::to_csv(&file, &delimiter, entries.as_deref(), first_line_is_header)?;
                println!("File converted to {}", output.display());
                Ok(())
            }
            PrepareAction::Epoch {
                file,
                columns,
                formats,
            } => {
                let columns = parse_column_indexes(&columns)?;
                let formats = split_entries(&formats);
                prepare::timestamps_to_epoch(&file, &columns, &formats)?;
                println!("Timestamps of {} rewritten as epoch seconds", file.display());
                Ok(())
            }
            PrepareAction::DiffRows {
                file,
                column,
                result_column,
            } => {
                prepare::interarrival_row_wise(&file, column, &result_column)?;
                println!("Row-wise difference written to {}", file.display());
                Ok(())
            }
            PrepareAction::DiffColumns {
                file,
                columns,
                result_column,
            } => {
                let indexes = parse_column_indexes(&columns)?;
                let &[first, second] = indexes.as_slice() else {
                    bail!("pass exactly two column indexes to calculate the difference");
                };
                prepare::interarrival_column_wise(&file, first, second, &result_column)?;
                println!("Column-wise difference written to {}", file.display());
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_entries() {
        assert_eq!(split_entries("a; b;c"), vec!["a", "b", "c"]);
        assert!(split_entries("").is_empty());
        assert!(split_entries(" ; ").is_empty());
    }
}
