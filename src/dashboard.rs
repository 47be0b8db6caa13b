use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::aggregate::{build_aggregate_table, AggregateTable};
use crate::data::error::DataLoadError;
use crate::data::filter::{derive_secondary_options, filter_rows};
use crate::data::loader::{load_file, SchemaPolicy};
use crate::data::model::{AggregateRow, FilterSelection, OptionSet, Selection};

// ---------------------------------------------------------------------------
// Dashboard – the boundary the UI (or CLI) calls into
// ---------------------------------------------------------------------------

/// Dropdown contents right after a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialOptions {
    pub primary: OptionSet,
    pub secondary: OptionSet,
}

/// A loaded dataset: the shared, read-only aggregate table plus where it came
/// from. Cloning shares the table.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Arc<AggregateTable>,
    source: Option<PathBuf>,
    skipped: usize,
}

impl Dashboard {
    pub fn new(table: AggregateTable) -> Self {
        Self {
            table: Arc::new(table),
            source: None,
            skipped: 0,
        }
    }

    /// Read `path` once and build the table. Nothing is returned on failure.
    pub fn load(path: &Path, policy: SchemaPolicy) -> Result<Self, DataLoadError> {
        let loaded = load_file(path, policy)?;
        let table = build_aggregate_table(&loaded.records);
        log::info!(
            "Loaded {} records into {} groups from {}",
            table.source_records(),
            table.len(),
            path.display()
        );
        if loaded.skipped > 0 {
            log::warn!("Skipped {} malformed records", loaded.skipped);
        }
        Ok(Self {
            source: Some(path.to_path_buf()),
            skipped: loaded.skipped,
            ..Self::new(table)
        })
    }

    pub fn table(&self) -> &AggregateTable {
        &self.table
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Records dropped under [`SchemaPolicy::Skip`].
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn initial_options(&self) -> InitialOptions {
        InitialOptions {
            primary: self.table.primary_options().clone(),
            secondary: derive_secondary_options(&self.table, &Selection::All),
        }
    }

    /// Owned copy of the rows matching `selection`.
    pub fn on_filter_change(&self, selection: &FilterSelection) -> Vec<AggregateRow> {
        filter_rows(&self.table, selection)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn on_primary_change(&self, primary: &Selection) -> OptionSet {
        derive_secondary_options(&self.table, primary)
    }
}
