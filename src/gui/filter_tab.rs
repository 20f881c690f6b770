//! Filter workflow: selecting traces and evaluating a boolean expression
//! over their statistics.

use crate::config::AppSettings;
use crate::filter::{self, FilterMatch};
use crate::gui;
use crate::utils::fmt_opt;
use eframe::egui;
use std::path::PathBuf;

#[derive(Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct FilterTab {
    expression: String,
    selected: Vec<PathBuf>,

    #[serde(skip)]
    results: Vec<FilterMatch>,
}

impl FilterTab {
    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &AppSettings, status: &mut String) {
        ui.heading("Filter Traces");
        ui.add_space(crate::theme::SPACING_SMALL);

        ui.horizontal(|ui| {
            if ui.button("Choose Files").clicked()
                && let Some(paths) =
                    gui::pick_files(&settings.converted_traces_dir, "JSON files", &["json"])
            {
                for path in paths {
                    if !self.selected.contains(&path) {
                        self.selected.push(path);
                    }
                }
            }
            if ui.button("Clear Selection").clicked() {
                self.selected.clear();
                self.results.clear();
            }
        });

        if self.selected.is_empty() {
            ui.label(egui::RichText::new("No traces selected.").weak());
        } else {
            crate::theme::card_frame(ui).show(ui, |ui| {
                ui.label(egui::RichText::new("Selected Traces").strong());
                for path in &self.selected {
                    ui.label(
                        path.file_name()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_else(|| path.display().to_string()),
                    );
                }
            });
        }

        ui.add_space(crate::theme::SPACING_SMALL);
        gui::labeled_entry(ui, "Boolean Expression", &mut self.expression);
        if ui.button("Filter Traces").clicked() {
            if self.selected.is_empty() {
                *status = "No files selected, please choose traces first".to_owned();
            } else {
                match filter::filter_traces(&self.expression, &self.selected) {
                    Ok(results) => {
                        *status = format!("{} column(s) match the expression", results.len());
                        self.results = results;
                    }
                    Err(e) => {
                        *status = e.to_string();
                        self.results.clear();
                    }
                }
            }
        }

        if !self.results.is_empty() {
            ui.add_space(crate::theme::SPACING_SMALL);
            ui.label(egui::RichText::new("Results").strong());
            egui::Grid::new("filter_results")
                .striped(true)
                .min_col_width(60.0)
                .show(ui, |ui| {
                    for header in [
                        "Name",
                        "Column",
                        "Mean",
                        "Median",
                        "Skewness",
                        "Kurtosis",
                        "Autocorrelation",
                        "Variance",
                    ] {
                        ui.label(egui::RichText::new(header).strong());
                    }
                    ui.end_row();

                    for m in &self.results {
                        let s = &m.statistics;
                        ui.label(&m.trace_name);
                        ui.label(m.column.to_string());
                        ui.label(fmt_opt(Some(s.mean)));
                        ui.label(fmt_opt(Some(s.median)));
                        ui.label(fmt_opt(Some(s.skewness)));
                        ui.label(fmt_opt(Some(s.kurtosis)));
                        ui.label(fmt_opt(Some(s.autocorrelation)));
                        ui.label(fmt_opt(Some(s.variance)));
                        ui.end_row();
                    }
                });
        }
    }
}
