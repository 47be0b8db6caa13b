use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::export::{write_rows, ExportFormat};
use crate::data::model::{OptionSet, Selection};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – the two cascading dropdowns
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dashboard.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.strong("Select School ID");
    if let Some(picked) = dropdown(
        ui,
        "school_id",
        &state.primary_options,
        &state.selection.primary,
        false,
    ) {
        state.set_primary(picked);
    }

    ui.add_space(8.0);

    ui.strong("Select Class Code");
    let stale = state.secondary_is_stale();
    if let Some(picked) = dropdown(
        ui,
        "class_code",
        &state.secondary_options,
        &state.selection.secondary,
        stale,
    ) {
        state.set_secondary(picked);
    }
    if stale {
        ui.label(
            RichText::new("Not offered for this school")
                .small()
                .color(Color32::YELLOW),
        );
    }
}

/// A combo box over `options`; returns the newly clicked choice, if any.
fn dropdown(
    ui: &mut Ui,
    id: &str,
    options: &OptionSet,
    current: &Selection,
    stale: bool,
) -> Option<Selection> {
    let mut selected_text = RichText::new(current.to_string());
    if stale {
        selected_text = selected_text.color(Color32::YELLOW);
    }

    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in options.choices() {
                if ui
                    .selectable_label(choice == current, choice.to_string())
                    .clicked()
                {
                    picked = Some(choice.clone());
                }
            }
        });
    picked
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dashboard.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export view as CSV…"))
                .clicked()
            {
                export_file_dialog(state, ExportFormat::Csv);
                ui.close_menu();
            }
            if ui
                .add_enabled(can_export, egui::Button::new("Export view as JSON…"))
                .clicked()
            {
                export_file_dialog(state, ExportFormat::Json);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dash) = &state.dashboard {
            let source = dash
                .source()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{source}: {} records, {} groups, {} shown",
                dash.table().source_records(),
                dash.table().len(),
                state.visible_rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open survey data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV / TSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState, format: ExportFormat) {
    let ext = format.extension();
    let file = rfd::FileDialog::new()
        .set_title("Export current view")
        .set_file_name(format!("survey_view.{ext}"))
        .add_filter(ext.to_ascii_uppercase(), &[ext])
        .save_file();

    let Some(path) = file else {
        return;
    };

    let result = File::create(&path)
        .with_context(|| format!("creating {}", path.display()))
        .and_then(|f| write_rows(&state.visible_rows, format, BufWriter::new(f)));

    match result {
        Ok(()) => {
            log::info!(
                "Exported {} rows to {}",
                state.visible_rows.len(),
                path.display()
            );
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
