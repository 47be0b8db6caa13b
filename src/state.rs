use std::path::Path;

use crate::color::ColorMap;
use crate::dashboard::Dashboard;
use crate::data::loader::SchemaPolicy;
use crate::data::model::{AggregateRow, FilterSelection, OptionSet, Selection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dashboard: Option<Dashboard>,

    /// Current dropdown values.
    pub selection: FilterSelection,

    /// Choices for the School ID dropdown.
    pub primary_options: OptionSet,

    /// Choices for the Class Code dropdown, derived from the primary value.
    pub secondary_options: OptionSet,

    /// Rows passing the current selection (cached).
    pub visible_rows: Vec<AggregateRow>,

    /// Colour per primary id.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Applied to files opened from the UI.
    pub schema_policy: SchemaPolicy,
}

impl AppState {
    pub fn new(schema_policy: SchemaPolicy) -> Self {
        Self {
            dashboard: None,
            selection: FilterSelection::default(),
            primary_options: OptionSet::default(),
            secondary_options: OptionSet::default(),
            visible_rows: Vec::new(),
            color_map: None,
            status_message: None,
            schema_policy,
        }
    }

    /// Ingest a newly loaded dataset and reset both dropdowns to `All`.
    pub fn set_dashboard(&mut self, dashboard: Dashboard) {
        let options = dashboard.initial_options();
        self.color_map = Some(ColorMap::new(options.primary.ids()));
        self.primary_options = options.primary;
        self.secondary_options = options.secondary;
        self.selection = FilterSelection::default();
        self.visible_rows = dashboard.on_filter_change(&self.selection);

        self.dashboard = Some(dashboard);
        self.status_message = None;
    }

    /// Load `path`; on failure the current dataset stays in place.
    pub fn load_path(&mut self, path: &Path) {
        match Dashboard::load(path, self.schema_policy) {
            Ok(dashboard) => {
                let skipped = dashboard.skipped();
                self.set_dashboard(dashboard);
                if skipped > 0 {
                    self.status_message = Some(format!("Skipped {skipped} malformed records"));
                }
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Change the School ID. Class Code choices are rederived; the Class Code
    /// value itself is kept even if it is no longer among them.
    pub fn set_primary(&mut self, primary: Selection) {
        if self.selection.primary == primary {
            return;
        }
        self.selection.primary = primary;
        if let Some(dash) = &self.dashboard {
            self.secondary_options = dash.on_primary_change(&self.selection.primary);
        }
        self.refilter();
    }

    pub fn set_secondary(&mut self, secondary: Selection) {
        if self.selection.secondary == secondary {
            return;
        }
        self.selection.secondary = secondary;
        self.refilter();
    }

    /// Recompute `visible_rows` after a selection change.
    pub fn refilter(&mut self) {
        if let Some(dash) = &self.dashboard {
            self.visible_rows = dash.on_filter_change(&self.selection);
        }
    }

    /// The Class Code value is not offered under the current School ID.
    pub fn secondary_is_stale(&self) -> bool {
        !self.secondary_options.contains(&self.selection.secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::build_aggregate_table;
    use crate::data::aggregate::tests::example_records;
    use crate::data::model::GroupId;

    fn loaded() -> AppState {
        let mut state = AppState::new(SchemaPolicy::Reject);
        state.set_dashboard(Dashboard::new(build_aggregate_table(&example_records())));
        state
    }

    #[test]
    fn starts_unfiltered() {
        let state = loaded();
        assert_eq!(state.visible_rows.len(), 3);
        assert_eq!(state.primary_options.choices().len(), 3);
        assert_eq!(state.secondary_options.choices().len(), 3);
        assert!(state.color_map.is_some());
    }

    #[test]
    fn primary_change_cascades_to_secondary_options() {
        let mut state = loaded();
        state.set_primary(Selection::Only(GroupId::Integer(2)));
        assert_eq!(
            state.secondary_options.choices(),
            &[Selection::All, Selection::Only(GroupId::from("A"))]
        );
        assert_eq!(state.visible_rows.len(), 1);
    }

    #[test]
    fn stale_secondary_is_kept_not_reset() {
        let mut state = loaded();
        state.set_secondary(Selection::Only(GroupId::from("B")));
        assert_eq!(state.visible_rows.len(), 1);

        state.set_primary(Selection::Only(GroupId::Integer(2)));
        assert_eq!(state.selection.secondary, Selection::Only(GroupId::from("B")));
        assert!(state.secondary_is_stale());
        assert!(state.visible_rows.is_empty());

        state.set_secondary(Selection::All);
        assert!(!state.secondary_is_stale());
        assert_eq!(state.visible_rows.len(), 1);
    }

    #[test]
    fn failed_load_keeps_previous_table() {
        let mut state = loaded();
        state.load_path(Path::new("/nonexistent/universal_db.csv"));
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error:"));
        assert_eq!(state.visible_rows.len(), 3);
        assert!(state.dashboard.is_some());
    }

    #[test]
    fn skip_policy_reports_dropped_records() {
        use std::io::Write;

        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(
            tmp,
            "UniversityID,ClassCode,WeekPace,AcademicSupport,ConceptMastering,\
             instructorEngagement,instructorClarity,instructorknowledgeable\n\
             1,A,80,4,3,5,4,5\n\
             ,A,90,4,3,5,4,5\n\
             2,B,70,2,2,2,2,2\n"
        )
        .unwrap();

        let mut state = AppState::new(SchemaPolicy::Skip);
        state.load_path(tmp.path());

        assert_eq!(
            state.status_message.as_deref(),
            Some("Skipped 1 malformed records")
        );
        let dash = state.dashboard.as_ref().unwrap();
        assert_eq!(dash.skipped(), 1);
        assert_eq!(dash.table().source_records(), 2);
        assert_eq!(state.visible_rows.len(), 2);
    }
}
