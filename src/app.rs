use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SurveyDashboardApp {
    pub state: AppState,
}

impl SurveyDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SurveyDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: dropdowns ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: measure chart ----
        egui::TopBottomPanel::bottom("chart_panel")
            .default_height(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::measure_chart(ui, &self.state);
            });

        // ---- Central panel: aggregate table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::aggregate_table(ui, &self.state);
        });
    }
}
