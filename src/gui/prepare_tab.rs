//! Prepare workflow: knocking raw files into clean CSV shape.

use crate::config::AppSettings;
use crate::gui;
use crate::prepare;
use crate::trace::columns::parse_column_indexes;
use eframe::egui;
use std::path::PathBuf;

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct PrepareTab {
    file: String,
    remove_amount: String,
    header: String,
    delimiter: String,
    csv_header: String,
    first_line_is_header: bool,
    date_columns: String,
    date_formats: String,
    row_diff_column: String,
    row_diff_result: String,
    col_diff_columns: String,
    col_diff_result: String,

    #[serde(skip)]
    preview_title: String,
    #[serde(skip)]
    preview: String,
}

impl Default for PrepareTab {
    fn default() -> Self {
        Self {
            file: String::new(),
            remove_amount: "1".to_owned(),
            header: String::new(),
            delimiter: ";".to_owned(),
            csv_header: String::new(),
            first_line_is_header: false,
            date_columns: String::new(),
            date_formats: "%Y-%m-%d %H:%M:%S".to_owned(),
            row_diff_column: "0".to_owned(),
            row_diff_result: "interarrival".to_owned(),
            col_diff_columns: "0;1".to_owned(),
            col_diff_result: "interarrival".to_owned(),
            preview_title: String::new(),
            preview: String::new(),
        }
    }
}

impl PrepareTab {
    pub fn ui(&mut self, ui: &mut egui::Ui, settings: &AppSettings, status: &mut String) {
        ui.heading("Prepare File");
        ui.add_space(crate::theme::SPACING_SMALL);

        ui.horizontal(|ui| {
            if ui.button("Choose File").clicked()
                && let Some(path) = gui::pick_file(&settings.raw_traces_dir, "All files", &["*"])
            {
                self.file = path.display().to_string();
                self.refresh_preview();
            }
            ui.label(if self.file.is_empty() {
                "no file selected"
            } else {
                self.file.as_str()
            });
        });

        if self.file.trim().is_empty() {
            ui.label(egui::RichText::new("Select a file to prepare it for conversion.").weak());
            return;
        }
        let path = PathBuf::from(self.file.trim());

        ui.add_space(crate::theme::SPACING_SMALL);
        crate::theme::card_frame(ui).show(ui, |ui| {
            ui.label(egui::RichText::new("Rows and header").strong());
            ui.horizontal(|ui| {
                ui.label("Amount of Rows");
                ui.text_edit_singleline(&mut self.remove_amount);
                if ui.button("Remove Rows").clicked() {
                    match self.remove_amount.trim().parse::<usize>() {
                        Ok(amount) => {
                            self.report(prepare::remove_first_rows(&path, amount), status);
                        }
                        Err(_) => {
                            *status = "Please enter an integer amount of rows".to_owned();
                        }
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label("Header");
                ui.text_edit_singleline(&mut self.header);
                if ui.button("Add Header to CSV").clicked() {
                    let entries: Vec<String> = self
                        .header
                        .split(',')
                        .map(|s| s.trim().to_owned())
                        .collect();
                    self.report(prepare::add_header(&path, &entries), status);
                }
            });
        });

        ui.add_space(crate::theme::SPACING_SMALL);
        crate::theme::card_frame(ui).show(ui, |ui| {
            ui.label(egui::RichText::new("Convert to CSV").strong());
            ui.horizontal(|ui| {
                ui.label("Delimiter");
                ui.text_edit_singleline(&mut self.delimiter);
                ui.label("Header");
                ui.text_edit_singleline(&mut self.csv_header);
            });
            ui.checkbox(&mut self.first_line_is_header, "Use first line as header");
            if ui.button("Convert to CSV").clicked() {
                let entries: Option<Vec<String>> = if self.csv_header.trim().is_empty() {
                    None
                } else {
                    Some(
                        self.csv_header
                            .split(',')
                            .map(|s| s.trim().to_owned())
                            .collect(),
                    )
                };
                match prepare::to_csv(
                    &path,
                    &self.delimiter,
                    entries.as_deref(),
                    self.first_line_is_header,
                ) {
                    Ok(output) => {
                        *status = format!("File successfully converted to {}", output.display());
                        self.file = output.display().to_string();
                        self.refresh_preview();
                    }
                    Err(e) => *status = format!("{e:#}"),
                }
            }
        });

        ui.add_space(crate::theme::SPACING_SMALL);
        crate::theme::card_frame(ui).show(ui, |ui| {
            ui.label(egui::RichText::new("Timestamps").strong());
            ui.horizontal(|ui| {
                ui.label("Column Indexes");
                ui.text_edit_singleline(&mut self.date_columns);
                ui.label("Timestamp Format Strings");
                ui.text_edit_singleline(&mut self.date_formats);
                if ui.button("Calculate Unix Time").clicked() {
                    let result = parse_column_indexes(&self.date_columns).and_then(|columns| {
                        let formats: Vec<String> = self
                            .date_formats
                            .split(';')
                            .map(|s| s.trim().to_owned())
                            .filter(|s| !s.is_empty())
                            .collect();
                        prepare::timestamps_to_epoch(&path, &columns, &formats)
                    });
                    self.report(result, status);
                }
            });
        });

        ui.add_space(crate::theme::SPACING_SMALL);
        crate::theme::card_frame(ui).show(ui, |ui| {
            ui.label(egui::RichText::new("Inter-arrival times").strong());
            ui.horizontal(|ui| {
                ui.label("Column Index");
                ui.text_edit_singleline(&mut self.row_diff_column);
                ui.label("Result Column Name");
                ui.text_edit_singleline(&mut self.row_diff_result);
                if ui.button("Calculate row-wise Difference").clicked() {
                    match self.row_diff_column.trim().parse::<usize>() {
                        Ok(column) => {
                            let result = prepare::interarrival_row_wise(
                                &path,
                                column,
                                self.row_diff_result.trim(),
                            );
                            self.report(result, status);
                        }
                        Err(_) => *status = "Please enter a valid column index".to_owned(),
                    }
                }
            });
            ui.horizontal(|ui| {
                ui.label("Column Indexes");
                ui.text_edit_singleline(&mut self.col_diff_columns);
                ui.label("Result Column Name");
                ui.text_edit_singleline(&mut self.col_diff_result);
                if ui.button("Calculate column-wise Difference").clicked() {
                    let result = parse_column_indexes(&self.col_diff_columns).and_then(|indexes| {
                        let &[first, second] = indexes.as_slice() else {
                            anyhow::bail!(
                                "pass exactly two column indexes to calculate the difference"
                            );
                        };
                        prepare::interarrival_column_wise(
                            &path,
                            first,
                            second,
                            self.col_diff_result.trim(),
                        )
                    });
                    self.report(result, status);
                }
            });
        });

        if !self.preview.is_empty() {
            gui::file_preview(ui, &self.preview_title, &self.preview);
        }
    }

    fn report(&mut self, result: anyhow::Result<()>, status: &mut String) {
        match result {
            Ok(()) => {
                *status = "File successfully updated".to_owned();
                self.refresh_preview();
            }
            Err(e) => *status = format!("{e:#}"),
        }
    }

    fn refresh_preview(&mut self) {
        let path = PathBuf::from(self.file.trim());
        self.preview_title = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.preview = gui::load_preview(&path);
    }
}
