//! Validate workflow: statistics tolerance checks, hash checks and
//! traceheader restoration.

use crate::config::AppSettings;
use crate::gui;
use crate::integrity::validator;
use crate::trace::NumFormat;
use eframe::egui;
use std::path::PathBuf;

#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ValidateTab {
    file: String,
    tolerance: String,
    statistics_format: String,

    #[serde(skip)]
    report: String,
}

impl ValidateTab {
    pub fn apply_defaults(&mut self, settings: &AppSettings) {
        if self.tolerance.is_empty() {
            self.tolerance = settings.default_tolerance.to_string();
        }
        if self.statistics_format.is_empty() {
            self.statistics_format = settings.default_statistics_format.clone();
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &AppSettings, status: &mut String) {
        ui.heading("Validate Trace");
        ui.add_space(crate::theme::SPACING_SMALL);

        ui.horizontal(|ui| {
            if ui.button("Choose File").clicked()
                && let Some(path) =
                    gui::pick_file(&settings.converted_traces_dir, "JSON files", &["json"])
            {
                self.file = path.display().to_string();
                self.report.clear();
            }
            ui.label(if self.file.is_empty() {
                "no file selected"
            } else {
                self.file.as_str()
            });
        });

        gui::labeled_entry(ui, "Relative Tolerance", &mut self.tolerance);
        gui::labeled_entry(ui, "Statistics Format String", &mut self.statistics_format);

        ui.add_space(crate::theme::SPACING_SMALL);
        ui.horizontal(|ui| {
            if ui.button("Validate Statistics").clicked() {
                self.run_verify_statistics(status);
            }
            if ui.button("Validate Hash").clicked() {
                self.run_hash_check(status);
            }
            if ui.button("Restore Traceheader").clicked() {
                self.run_restore(status);
            }
        });

        if !self.report.is_empty() {
            ui.add_space(crate::theme::SPACING_SMALL);
            crate::theme::card_frame(ui).show(ui, |ui| {
                ui.label(egui::RichText::new(&self.report).monospace());
            });
        }
    }

    fn trace_path(&self, status: &mut String) -> Option<PathBuf> {
        if self.file.trim().is_empty() {
            *status = "No file selected, please choose a trace first".to_owned();
            return None;
        }
        Some(PathBuf::from(self.file.trim()))
    }

    fn run_verify_statistics(&mut self, status: &mut String) {
        let Some(path) = self.trace_path(status) else {
            return;
        };
        let Ok(tolerance) = self.tolerance.trim().parse::<f64>() else {
            *status = "Please enter a valid tolerance between 0 and 1".to_owned();
            return;
        };

        match validator::verify_statistics(&path, tolerance) {
            Ok(report) => {
                *status = if report.valid {
                    "All statistics are close considering the passed relative tolerance".to_owned()
                } else {
                    format!("{} statistic(s) outside tolerance", report.mismatches.len())
                };
                self.report = report.format_cli();
            }
            Err(e) => *status = e.to_string(),
        }
    }

    fn run_hash_check(&mut self, status: &mut String) {
        let Some(path) = self.trace_path(status) else {
            return;
        };
        match validator::hash_check(&path) {
            Ok(result) => {
                *status = result.message.clone();
                self.report = result.format_cli();
            }
            Err(e) => *status = e.to_string(),
        }
    }

    fn run_restore(&mut self, status: &mut String) {
        let Some(path) = self.trace_path(status) else {
            return;
        };
        let format: NumFormat = match self.statistics_format.parse() {
            Ok(format) => format,
            Err(e) => {
                *status = format!("Please enter a valid format string: {e}");
                return;
            }
        };

        let confirmed = rfd::MessageDialog::new()
            .set_title("Overwriting File")
            .set_description("Restoring the traceheader will overwrite the file. Continue?")
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes;
        if !confirmed {
            *status = "Traceheader not restored".to_owned();
            return;
        }

        match validator::restore_traceheader(&path, &format) {
            Ok(()) => {
                *status = format!("Traceheader of {} restored", path.display());
                self.report.clear();
            }
            Err(e) => *status = e.to_string(),
        }
    }
}
