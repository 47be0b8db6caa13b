use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Measure, PRIMARY_COLUMN, SECONDARY_COLUMN};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Aggregate table (central panel)
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Render the filtered aggregate rows, one line per (school, class).
pub fn aggregate_table(ui: &mut Ui, state: &AppState) {
    if state.dashboard.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a survey file to view averages  (File → Open…)");
        });
        return;
    }

    if state
        .dashboard
        .as_ref()
        .is_some_and(|dash| dash.table().is_empty())
    {
        ui.label("The dataset has no survey records.");
        return;
    }

    let rows = &state.visible_rows;
    if rows.is_empty() {
        ui.label("No rows match the current filters.");
        return;
    }

    let mut titles = vec![PRIMARY_COLUMN, SECONDARY_COLUMN];
    titles.extend(Measure::ALL.iter().map(|m| m.label()));
    titles.push("Responses");

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(80.0))
        .columns(Column::auto().at_least(70.0), Measure::COUNT)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in &titles {
                header.col(|ui: &mut Ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut table_row| {
                let row = &rows[table_row.index()];
                let mut id_text = RichText::new(row.primary().to_string());
                if let Some(cm) = &state.color_map {
                    id_text = id_text.color(cm.color_for(row.primary()));
                }

                table_row.col(|ui: &mut Ui| {
                    ui.label(id_text);
                });
                table_row.col(|ui: &mut Ui| {
                    ui.label(row.secondary().to_string());
                });
                for measure in Measure::ALL {
                    table_row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.2}", row.mean(measure)));
                    });
                }
                table_row.col(|ui: &mut Ui| {
                    ui.label(row.records.to_string());
                });
            });
        });
}
