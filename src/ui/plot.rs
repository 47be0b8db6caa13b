use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::data::model::Measure;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Measure chart (bottom panel)
// ---------------------------------------------------------------------------

/// Fraction of each measure slot taken by its group of bars.
const GROUP_WIDTH: f64 = 0.8;

/// One bar group per measure, one bar per visible row, coloured by school.
pub fn measure_chart(ui: &mut Ui, state: &AppState) {
    let rows = &state.visible_rows;
    if rows.is_empty() {
        return;
    }

    let slot = GROUP_WIDTH / rows.len() as f64;

    Plot::new("measure_chart")
        .legend(Legend::default())
        .x_axis_label("Measure")
        .y_axis_label("Mean score")
        .x_axis_formatter(|mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            Measure::ALL
                .get(i as usize)
                .map(|m| m.label().to_string())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (j, row) in rows.iter().enumerate() {
                let offset = -GROUP_WIDTH / 2.0 + slot * (j as f64 + 0.5);
                let bars: Vec<Bar> = Measure::ALL
                    .iter()
                    .map(|m| {
                        Bar::new(m.index() as f64 + offset, row.mean(*m))
                            .width(slot * 0.9)
                            .name(m.label())
                    })
                    .collect();

                let color = state
                    .color_map
                    .as_ref()
                    .map(|cm| cm.color_for(row.primary()))
                    .unwrap_or(Color32::LIGHT_BLUE);

                let chart = BarChart::new(bars)
                    .name(format!("{} / {}", row.primary(), row.secondary()))
                    .color(color);

                plot_ui.bar_chart(chart);
            }
        });
}
