//! Desktop application shell.
//!
//! A sidebar selects one of the five workflows; each workflow lives in its
//! own tab module and reports outcomes through the shared status line at
//! the bottom of the window.

use crate::config::{self, AppSettings};
use eframe::egui;
use std::path::{Path, PathBuf};

pub mod convert_tab;
pub mod filter_tab;
pub mod prepare_tab;
pub mod profido_tab;
pub mod validate_tab;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub enum Section {
    Prepare,
    #[default]
    Convert,
    Filter,
    Profido,
    Validate,
}

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TraceConvApp {
    section: Section,
    #[serde(skip)]
    status: String,
    #[serde(skip)]
    settings: AppSettings,

    prepare: prepare_tab::PrepareTab,
    convert: convert_tab::ConvertTab,
    filter: filter_tab::FilterTab,
    profido: profido_tab::ProfidoTab,
    validate: validate_tab::ValidateTab,
}

impl Default for TraceConvApp {
    fn default() -> Self {
        Self {
            section: Section::Convert,
            status: String::new(),
            settings: AppSettings::default(),
            prepare: prepare_tab::PrepareTab::default(),
            convert: convert_tab::ConvertTab::default(),
            filter: filter_tab::FilterTab::default(),
            profido: profido_tab::ProfidoTab::default(),
            validate: validate_tab::ValidateTab::default(),
        }
    }
}

impl TraceConvApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        crate::theme::apply_theme(&cc.egui_ctx);

        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        app.settings = config::load_app_config();
        // materialize an editable config on first run
        if !config::get_config_path().exists()
            && let Err(e) = config::save_app_config(&app.settings)
        {
            tracing::warn!("Could not write default config: {e}");
        }
        if let Err(e) = app.settings.ensure_directories() {
            tracing::warn!("Could not create trace directories: {e}");
        }

        app.convert.apply_defaults(&app.settings);
        app.profido.apply_defaults(&app.settings);
        app.validate.apply_defaults(&app.settings);
        app
    }

    fn render_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("TRACECONV")
                    .strong()
                    .size(20.0)
                    .color(crate::theme::ACCENT_COLOR),
            );
            ui.add_space(crate::theme::SPACING_LARGE);
        });

        let mut next_section = None;

        ui.vertical(|ui| {
            ui.spacing_mut().item_spacing.y = crate::theme::SPACING_SMALL;

            let entries = [
                (Section::Prepare, "Prepare File"),
                (Section::Convert, "Convert Trace"),
                (Section::Filter, "Filter Traces"),
                (Section::Profido, "Extract for ProFiDo"),
                (Section::Validate, "Validate Trace"),
            ];
            for (section, label) in entries {
                if Self::sidebar_button(ui, label, self.section == section).clicked() {
                    next_section = Some(section);
                }
            }
        });

        if let Some(section) = next_section {
            self.section = section;
            self.status.clear();
        }
    }

    fn sidebar_button(ui: &mut egui::Ui, text: &str, active: bool) -> egui::Response {
        let (rect, response) =
            ui.allocate_at_least(egui::vec2(ui.available_width(), 40.0), egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_fill = if active {
                crate::theme::ACCENT_COLOR
            } else if response.hovered() {
                ui.visuals().faint_bg_color
            } else {
                egui::Color32::TRANSPARENT
            };

            ui.painter().rect_filled(rect, 6.0, bg_fill);

            let text_color = if active {
                egui::Color32::WHITE
            } else if response.hovered() {
                ui.visuals().strong_text_color()
            } else {
                ui.visuals().weak_text_color()
            };

            ui.painter().text(
                rect.left_center() + egui::vec2(15.0, 0.0),
                egui::Align2::LEFT_CENTER,
                text,
                egui::FontId::proportional(14.0),
                text_color,
            );
        }

        response
    }

    fn render_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.status.is_empty() {
                    ui.label(egui::RichText::new("Ready").small().weak());
                } else {
                    ui.label(egui::RichText::new(&self.status).small());
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("traceconv v{}", env!("CARGO_PKG_VERSION")))
                            .small()
                            .weak(),
                    );
                });
            });
        });
    }
}

impl eframe::App for TraceConvApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("main_sidebar")
            .frame(crate::theme::sidebar_frame())
            .resizable(false)
            .default_width(200.0)
            .show(ctx, |ui| {
                self.render_sidebar(ui);
            });

        self.render_footer(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.section {
                Section::Prepare => self.prepare.ui(ui, &self.settings, &mut self.status),
                Section::Convert => self.convert.ui(ui, &self.settings, &mut self.status),
                Section::Filter => self.filter.ui(ui, &self.settings, &mut self.status),
                Section::Profido => self.profido.ui(ui, &self.settings, &mut self.status),
                Section::Validate => self.validate.ui(ui, &self.settings, &mut self.status),
            });
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }
}

/// Launches the desktop application. Blocks until the window is closed.
pub fn run() -> eframe::Result {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Trace Converting Tool")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "traceconv",
        native_options,
        Box::new(|cc| Ok(Box::new(TraceConvApp::new(cc)))),
    )
}

// Shared widgets and dialogs used by the tab modules

/// Opens a native file dialog starting in `dir`.
pub(crate) fn pick_file(dir: &Path, description: &str, extensions: &[&str]) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter(description, extensions)
        .set_directory(existing_or_current(dir))
        .pick_file()
}

/// Opens a native multi-file dialog starting in `dir`.
pub(crate) fn pick_files(dir: &Path, description: &str, extensions: &[&str]) -> Option<Vec<PathBuf>> {
    rfd::FileDialog::new()
        .add_filter(description, extensions)
        .set_directory(existing_or_current(dir))
        .pick_files()
}

fn existing_or_current(dir: &Path) -> PathBuf {
    if dir.is_dir() {
        dir.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Native yes/no question, used before overwriting existing result files.
pub(crate) fn confirm_overwrite(path: &Path) -> bool {
    rfd::MessageDialog::new()
        .set_title("File already exists")
        .set_description(format!(
            "{} already exists.\nWould you like to overwrite it?",
            path.display()
        ))
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        == rfd::MessageDialogResult::Yes
}

/// A labeled single-line entry.
pub(crate) fn labeled_entry(ui: &mut egui::Ui, label: &str, value: &mut String) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add_sized(
            egui::vec2(ui.available_width().min(420.0), 20.0),
            egui::TextEdit::singleline(value),
        );
    });
}

/// Read-only preview of a file's content, truncated for very large files.
pub(crate) fn file_preview(ui: &mut egui::Ui, title: &str, content: &str) {
    ui.add_space(crate::theme::SPACING_SMALL);
    ui.label(egui::RichText::new(title).strong());
    crate::theme::card_frame(ui).show(ui, |ui| {
        egui::ScrollArea::both()
            .max_height(360.0)
            .show(ui, |ui| {
                ui.label(egui::RichText::new(content).monospace());
            });
    });
}

/// Loads up to 100 kB of a file for the preview pane.
pub(crate) fn load_preview(path: &Path) -> String {
    const PREVIEW_LIMIT: usize = 100 * 1024;
    match std::fs::read_to_string(path) {
        Ok(content) if content.len() > PREVIEW_LIMIT => {
            let mut end = PREVIEW_LIMIT;
            while !content.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}\n… (truncated)", &content[..end])
        }
        Ok(content) => content,
        Err(e) => format!("Could not read {}: {e}", path.display()),
    }
}
