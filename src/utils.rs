use std::path::PathBuf;

/// Platform base directory for traceconv data (config, logs).
///
/// Falls back to the current directory when no platform data dir exists
/// (e.g. stripped-down containers).
pub fn base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("traceconv")
}

/// Formats an optional f64 to 4 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "—".to_owned(),
    }
}
