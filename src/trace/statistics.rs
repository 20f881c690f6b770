//! Descriptive statistics for tracedata columns.
//!
//! Six statistics are computed per column: mean, median, skewness,
//! kurtosis, lag-1 autocorrelation and variance. Definitions follow the
//! conventions of the wider trace tooling: bias-corrected sample skewness
//! and excess kurtosis, sample variance (ddof = 1), and autocorrelation as
//! the Pearson correlation of the column against itself shifted by one.
//!
//! Values are rendered through a printf-style [`NumFormat`] before being
//! stored in the trace header.

use crate::trace::document::{StatValue, StatisticalCharacteristics};
use anyhow::{Result, anyhow, bail};
use polars::prelude::*;
use std::str::FromStr;

/// Statistics are only meaningful from this many values per column.
pub const MIN_SAMPLES: usize = 5;

/// The six descriptive statistics of a single tracedata column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    pub mean: f64,
    pub median: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub autocorrelation: f64,
    pub variance: f64,
}

/// Computes the six statistics for one column.
///
/// Fails when the column has fewer than [`MIN_SAMPLES`] values. Statistics
/// that are undefined for the data (e.g. autocorrelation of a constant
/// column) come out as NaN, matching the behavior of the tooling the trace
/// format originates from.
pub fn column_statistics(values: &[f64]) -> Result<ColumnStatistics> {
    if values.len() < MIN_SAMPLES {
        bail!(
            "column only contains {} values, computing statistics requires at least {MIN_SAMPLES}",
            values.len()
        );
    }

    let series = Float64Chunked::from_vec("tracedata".into(), values.to_vec()).into_series();
    let ca = series.f64().map_err(|e| anyhow!(e))?;

    let mean = ca.mean().ok_or_else(|| anyhow!("mean undefined"))?;
    let median = ca.median().ok_or_else(|| anyhow!("median undefined"))?;
    let variance = ca.var(1).ok_or_else(|| anyhow!("variance undefined"))?;
    let skewness = series.skew(false)?.unwrap_or(f64::NAN);
    let kurtosis = series.kurtosis(true, false)?.unwrap_or(f64::NAN);
    let autocorrelation = lag1_autocorrelation(ca);

    Ok(ColumnStatistics {
        mean,
        median,
        skewness,
        kurtosis,
        autocorrelation,
        variance,
    })
}

/// Pearson correlation of the column against itself shifted by one.
fn lag1_autocorrelation(ca: &Float64Chunked) -> f64 {
    let n = ca.len();
    let head = ca.slice(0, n - 1);
    let tail = ca.slice(1, n - 1);
    polars::prelude::cov::pearson_corr(&head, &tail).unwrap_or(f64::NAN)
}

/// Computes statistics for every tracedata column and renders them through
/// `format` into a header-ready [`StatisticalCharacteristics`].
pub fn generate(
    tracedata: &[Vec<f64>],
    format: &NumFormat,
) -> Result<StatisticalCharacteristics> {
    let mut statistics = StatisticalCharacteristics::default();
    for values in tracedata {
        let stats = column_statistics(values)?;
        statistics
            .mean
            .push(StatValue::Text(format.render(stats.mean)));
        statistics
            .median
            .push(StatValue::Text(format.render(stats.median)));
        statistics
            .skewness
            .push(StatValue::Text(format.render(stats.skewness)));
        statistics
            .kurtosis
            .push(StatValue::Text(format.render(stats.kurtosis)));
        statistics
            .autocorrelation
            .push(StatValue::Text(format.render(stats.autocorrelation)));
        statistics
            .variance
            .push(StatValue::Text(format.render(stats.variance)));
    }
    Ok(statistics)
}

/// Printf-style numeric format used for statistics and ProFiDo extracts.
///
/// Supported: `""` (shortest round-trip representation), `%f`, `%.Nf`,
/// `%e`, `%.Ne` and `%g`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NumFormat {
    /// Shortest representation that round-trips (`format!("{v}")`)
    #[default]
    Shortest,
    /// Fixed-point with the given number of decimals
    Fixed(usize),
    /// C-style scientific notation with the given mantissa decimals
    Scientific(usize),
}

impl FromStr for NumFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Shortest);
        }
        let spec = s
            .strip_prefix('%')
            .ok_or_else(|| anyhow!("format string '{s}' must start with '%'"))?;
        let (precision, kind) = match spec.strip_prefix('.') {
            Some(rest) => {
                let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    bail!("format string '{s}' is missing a precision");
                }
                (Some(digits.parse::<usize>()?), &rest[digits.len()..])
            }
            None => (None, spec),
        };
        match kind {
            "f" => Ok(Self::Fixed(precision.unwrap_or(6))),
            "e" => Ok(Self::Scientific(precision.unwrap_or(6))),
            "g" if precision.is_none() => Ok(Self::Shortest),
            _ => bail!("unsupported format string '{s}'"),
        }
    }
}

impl NumFormat {
    /// Renders `value` according to the format.
    pub fn render(&self, value: f64) -> String {
        match self {
            Self::Shortest => format!("{value}"),
            Self::Fixed(precision) => format!("{value:.precision$}"),
            Self::Scientific(precision) => format_scientific(value, *precision),
        }
    }
}

/// C-style `%e` rendering, e.g. `1.000000e+00` or `-9.95e-03`.
fn format_scientific(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value == 0.0 {
        return format!("{:.precision$}e+00", 0.0);
    }

    let mut exponent = value.abs().log10().floor() as i32;
    let mut mantissa = value / 10f64.powi(exponent);

    // Rounding at the requested precision can carry the mantissa to 10.0
    let rendered = format!("{mantissa:.precision$}");
    if let Ok(carried) = rendered.parse::<f64>()
        && carried.abs() >= 10.0
    {
        exponent += 1;
        mantissa = value / 10f64.powi(exponent);
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    let magnitude = exponent.abs();
    format!("{mantissa:.precision$}e{sign}{magnitude:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_statistics_of_one_to_five() {
        let stats = column_statistics(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(close(stats.mean, 3.0));
        assert!(close(stats.median, 3.0));
        assert!(close(stats.variance, 2.5));
        assert!(close(stats.skewness, 0.0));
        assert!(close(stats.kurtosis, -1.2));
        assert!(close(stats.autocorrelation, 1.0));
    }

    #[test]
    fn test_skewness_sign() {
        // One large outlier pulls the tail to the right
        let stats = column_statistics(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert!(stats.skewness > 0.0);

        let stats = column_statistics(&[-100.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(stats.skewness < 0.0);
    }

    #[test]
    fn test_constant_column_autocorrelation_is_nan() {
        let stats = column_statistics(&[7.0, 7.0, 7.0, 7.0, 7.0]).unwrap();
        assert!(close(stats.variance, 0.0));
        assert!(stats.autocorrelation.is_nan());
    }

    #[test]
    fn test_too_few_values_is_an_error() {
        let err = column_statistics(&[1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(err.to_string().contains("at least 5"));
    }

    #[test]
    fn test_generate_fills_all_six_arrays() {
        let tracedata = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![5.0, 4.0, 3.0, 2.0, 1.0]];
        let statistics = generate(&tracedata, &NumFormat::Fixed(3)).unwrap();
        for (_, values) in statistics.named() {
            assert_eq!(values.len(), 2);
        }
        assert_eq!(statistics.mean[0], StatValue::Text("3.000".to_owned()));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("".parse::<NumFormat>().unwrap(), NumFormat::Shortest);
        assert_eq!("%g".parse::<NumFormat>().unwrap(), NumFormat::Shortest);
        assert_eq!("%.3f".parse::<NumFormat>().unwrap(), NumFormat::Fixed(3));
        assert_eq!("%f".parse::<NumFormat>().unwrap(), NumFormat::Fixed(6));
        assert_eq!("%e".parse::<NumFormat>().unwrap(), NumFormat::Scientific(6));
        assert_eq!(
            "%.2e".parse::<NumFormat>().unwrap(),
            NumFormat::Scientific(2)
        );
        assert!("abc".parse::<NumFormat>().is_err());
        assert!("%.x".parse::<NumFormat>().is_err());
        assert!("%d".parse::<NumFormat>().is_err());
    }

    #[test]
    fn test_fixed_rendering() {
        assert_eq!(NumFormat::Fixed(2).render(3.14159), "3.14");
        assert_eq!(NumFormat::Fixed(0).render(2.5), "2");
        assert_eq!(NumFormat::Shortest.render(3.5), "3.5");
    }

    #[test]
    fn test_scientific_rendering() {
        assert_eq!(NumFormat::Scientific(6).render(1.0), "1.000000e+00");
        assert_eq!(NumFormat::Scientific(2).render(123.456), "1.23e+02");
        assert_eq!(NumFormat::Scientific(2).render(-0.00995), "-9.95e-03");
        assert_eq!(NumFormat::Scientific(6).render(0.0), "0.000000e+00");
        // rounding carries the mantissa into the next decade
        assert_eq!(NumFormat::Scientific(2).render(9.999), "1.00e+01");
    }
}
