//! ProFiDo workflow: extracting tracedata into tab-separated rows.

use crate::config::AppSettings;
use crate::gui;
use crate::profido::{self, ExtractOptions};
use eframe::egui;
use std::path::PathBuf;

#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ProfidoTab {
    trace: String,
    result_stem: String,
    float_format: String,

    #[serde(skip)]
    preview_title: String,
    #[serde(skip)]
    preview: String,
}

impl ProfidoTab {
    pub fn apply_defaults(&mut self, settings: &AppSettings) {
        if self.float_format.is_empty() {
            self.float_format = settings.default_float_format.clone();
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &AppSettings, status: &mut String) {
        ui.heading("Extract Tracedata for Usage in ProFiDo");
        ui.add_space(crate::theme::SPACING_SMALL);

        ui.horizontal(|ui| {
            if ui.button("Choose File").clicked()
                && let Some(path) =
                    gui::pick_file(&settings.converted_traces_dir, "JSON files", &["json"])
            {
                self.trace = path.display().to_string();
                self.preview_title = path
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.preview = gui::load_preview(&path);
            }
            ui.label(if self.trace.is_empty() {
                "no file selected"
            } else {
                self.trace.as_str()
            });
        });

        gui::labeled_entry(ui, "Result Filename", &mut self.result_stem);
        gui::labeled_entry(ui, "Float Format String", &mut self.float_format);

        ui.add_space(crate::theme::SPACING_SMALL);
        if ui.button("Extract Tracedata").clicked() {
            self.run_extract(settings, status);
        }

        if !self.preview.is_empty() {
            gui::file_preview(ui, &self.preview_title, &self.preview);
        }
    }

    fn run_extract(&mut self, settings: &AppSettings, status: &mut String) {
        if self.trace.trim().is_empty() {
            *status = "No file selected, please choose a trace first".to_owned();
            return;
        }
        let trace = PathBuf::from(self.trace.trim());

        let stem = if self.result_stem.trim().is_empty() {
            trace
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "trace".to_owned())
        } else {
            self.result_stem.trim().to_owned()
        };

        let float_format = match self.float_format.parse() {
            Ok(format) => format,
            Err(e) => {
                *status = format!("Please enter a valid format string: {e}");
                return;
            }
        };

        let output = profido::output_path(settings, &stem);
        let overwrite = output.exists() && gui::confirm_overwrite(&output);
        if output.exists() && !overwrite {
            *status = format!("Kept existing file {}", output.display());
            return;
        }

        let options = ExtractOptions {
            trace,
            result_stem: stem,
            float_format,
            overwrite,
        };
        match profido::extract_columns(&options, settings) {
            Ok(output) => {
                *status = format!("Tracedata extracted to {}", output.display());
                self.preview_title = output
                    .file_name()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.preview = gui::load_preview(&output);
            }
            Err(e) => *status = e.to_string(),
        }
    }
}
