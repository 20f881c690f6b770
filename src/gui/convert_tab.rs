//! Convert workflow: raw CSV to standardized trace.

use crate::config::AppSettings;
use crate::convert::{self, ConvertOptions};
use crate::gui;
use crate::profido;
use crate::trace::NumFormat;
use crate::trace::columns::parse_column_indexes;
use anyhow::{Context as _, Result};
use eframe::egui;
use std::path::{Path, PathBuf};

#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ConvertTab {
    file: String,
    columns: String,
    source: String,
    description: String,
    tracedata_description: String,
    user: String,
    additional_info: String,
    statistics_format: String,
    result_stem: String,
    extract_profido: bool,
    profido_stem: String,

    #[serde(skip)]
    preview_title: String,
    #[serde(skip)]
    preview: String,
}

impl ConvertTab {
    /// Prefills empty entries from the configured defaults.
    pub fn apply_defaults(&mut self, settings: &AppSettings) {
        if self.columns.is_empty() {
            self.columns = settings.default_columns.clone();
        }
        if self.source.is_empty() {
            self.source = settings.default_source.clone();
        }
        if self.description.is_empty() {
            self.description = settings.default_description.clone();
        }
        if self.tracedata_description.is_empty() {
            self.tracedata_description = settings.default_tracedata_description.clone();
        }
        if self.user.is_empty() {
            self.user = settings.default_username.clone();
        }
        if self.statistics_format.is_empty() {
            self.statistics_format = settings.default_statistics_format.clone();
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &AppSettings, status: &mut String) {
        ui.heading("Convert Trace");
        ui.add_space(crate::theme::SPACING_SMALL);

        ui.horizontal(|ui| {
            if ui.button("Choose File").clicked()
                && let Some(path) =
                    gui::pick_file(&settings.raw_traces_dir, "CSV files", &["csv"])
            {
                self.file = path.display().to_string();
                self.preview_title = path
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.preview = gui::load_preview(&path);
            }
            ui.label(if self.file.is_empty() {
                "no file selected"
            } else {
                self.file.as_str()
            });
        });

        ui.add_space(crate::theme::SPACING_SMALL);
        gui::labeled_entry(ui, "Column Indexes for Tracedata", &mut self.columns);
        gui::labeled_entry(ui, "Tracesource", &mut self.source);
        gui::labeled_entry(ui, "Tracedescription", &mut self.description);
        gui::labeled_entry(ui, "Tracedatadescription", &mut self.tracedata_description);
        gui::labeled_entry(ui, "Username", &mut self.user);
        gui::labeled_entry(ui, "Additional Information", &mut self.additional_info);
        gui::labeled_entry(ui, "Statistics Format String", &mut self.statistics_format);
        gui::labeled_entry(ui, "Result Filename", &mut self.result_stem);

        ui.checkbox(
            &mut self.extract_profido,
            "Extract tracedata for usage in ProFiDo after conversion",
        );
        if self.extract_profido {
            gui::labeled_entry(ui, "ProFiDo Filename", &mut self.profido_stem);
        }

        ui.add_space(crate::theme::SPACING_SMALL);
        if ui.button("Convert Trace").clicked() {
            self.run_convert(settings, status);
        }

        if !self.preview.is_empty() {
            gui::file_preview(ui, &self.preview_title, &self.preview);
        }
    }

    fn result_stem_for(&self, input: &Path) -> String {
        if self.result_stem.trim().is_empty() {
            input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "trace".to_owned())
        } else {
            self.result_stem.trim().to_owned()
        }
    }

    fn build_options(&self, input: PathBuf, overwrite: bool) -> Result<ConvertOptions> {
        let split = |entry: &str| -> Vec<String> {
            entry
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        };

        let statistics_format: NumFormat = self
            .statistics_format
            .parse()
            .context("invalid statistics format string")?;

        Ok(ConvertOptions {
            columns: parse_column_indexes(&self.columns)
                .context("columns need to be integers separated by a semicolon")?,
            source: self.source.clone(),
            description: self.description.clone(),
            tracedata_description: split(&self.tracedata_description),
            user: self.user.clone(),
            additional_information: split(&self.additional_info),
            statistics_format,
            result_stem: self.result_stem_for(&input),
            overwrite,
            profido_stem: if self.extract_profido {
                Some(if self.profido_stem.trim().is_empty() {
                    self.result_stem_for(&input)
                } else {
                    self.profido_stem.trim().to_owned()
                })
            } else {
                None
            },
            input,
        })
    }

    fn run_convert(&mut self, settings: &AppSettings, status: &mut String) {
        let input = PathBuf::from(self.file.trim());
        if self.file.trim().is_empty() {
            *status = "No file selected, please choose a file first".to_owned();
            return;
        }

        // ask before replacing existing result files
        let trace_path = convert::trace_output_path(settings, &self.result_stem_for(&input));
        let mut existing = vec![trace_path];
        if self.extract_profido {
            let stem = if self.profido_stem.trim().is_empty() {
                self.result_stem_for(&input)
            } else {
                self.profido_stem.trim().to_owned()
            };
            existing.push(profido::output_path(settings, &stem));
        }
        let mut overwrite = false;
        for path in existing.iter().filter(|p| p.exists()) {
            if gui::confirm_overwrite(path) {
                overwrite = true;
            } else {
                *status = format!("Kept existing file {}", path.display());
                return;
            }
        }

        let options = match self.build_options(input, overwrite) {
            Ok(options) => options,
            Err(e) => {
                *status = format!("{e:#}");
                return;
            }
        };

        match convert::convert_trace(&options, settings) {
            Ok(outcome) => {
                *status = if outcome.statistics_computed {
                    format!("Trace successfully converted to {}", outcome.trace_path.display())
                } else {
                    format!(
                        "Trace converted to {} without statistics, tracedata is too short",
                        outcome.trace_path.display()
                    )
                };
                self.preview_title = outcome
                    .trace_path
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.preview = gui::load_preview(&outcome.trace_path);
            }
            Err(e) => *status = e.to_string(),
        }
    }
}
