mod app;
mod color;
mod dashboard;
mod data;
mod state;
mod ui;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use app::SurveyDashboardApp;
use clap::Parser;
use dashboard::Dashboard;
use data::export::{write_rows, ExportFormat};
use data::loader::SchemaPolicy;
use data::model::{FilterSelection, Selection};
use eframe::egui;
use state::AppState;

#[derive(Parser)]
#[command(name = "survey-dashboard")]
#[command(about = "Average course-survey scores per school and class", long_about = None)]
struct Cli {
    /// Survey dataset (.csv, .tsv, .json, .parquet)
    #[arg(value_name = "DATA", default_value = "universal_db.csv")]
    data: PathBuf,

    /// Drop records without a UniversityID or ClassCode instead of failing
    #[arg(long)]
    skip_malformed: bool,

    /// Print the filtered view to stdout instead of opening a window
    #[arg(long)]
    print: bool,

    /// School ID to filter on with --print
    #[arg(long, default_value = "All")]
    primary: String,

    /// Class code to filter on with --print
    #[arg(long, default_value = "All")]
    secondary: String,

    /// Output format for --print
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let policy = if cli.skip_malformed {
        SchemaPolicy::Skip
    } else {
        SchemaPolicy::Reject
    };

    // No partial table: a load failure ends the process here.
    let dashboard = Dashboard::load(&cli.data, policy)
        .with_context(|| format!("loading {}", cli.data.display()))?;

    if cli.print {
        return print_view(&dashboard, &cli);
    }

    let mut state = AppState::new(policy);
    state.set_dashboard(dashboard);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Survey Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SurveyDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}

fn print_view(dashboard: &Dashboard, cli: &Cli) -> Result<()> {
    let mut out = io::stdout().lock();
    write_view(dashboard, cli, &mut out)?;
    out.flush().context("flushing stdout")
}

/// Filter by the `--primary`/`--secondary` values and write the view.
fn write_view<W: Write>(dashboard: &Dashboard, cli: &Cli, out: W) -> Result<()> {
    let selection = FilterSelection::new(
        Selection::parse(&cli.primary),
        Selection::parse(&cli.secondary),
    );
    let rows = dashboard.on_filter_change(&selection);
    log::debug!("{} rows match {selection:?}", rows.len());
    write_rows(&rows, cli.format, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::build_aggregate_table;
    use crate::data::aggregate::tests::example_records;

    fn printed(args: &[&str]) -> String {
        let cli = Cli::parse_from(args);
        let dashboard = Dashboard::new(build_aggregate_table(&example_records()));
        let mut out = Vec::new();
        write_view(&dashboard, &cli, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn unknown_filter_values_print_an_empty_view() {
        let json = printed(&["survey-dashboard", "--print", "--primary", "99"]);
        assert_eq!(json.trim(), "[]");

        let csv = printed(&[
            "survey-dashboard",
            "--print",
            "--secondary",
            "Q",
            "--format",
            "csv",
        ]);
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("UniversityID,ClassCode,"));
    }

    #[test]
    fn print_filters_by_both_values() {
        let json = printed(&[
            "survey-dashboard",
            "--print",
            "--primary",
            "1",
            "--secondary",
            "B",
        ]);
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["UniversityID"], 1);
        assert_eq!(rows[0]["ClassCode"], "B");
    }
}
