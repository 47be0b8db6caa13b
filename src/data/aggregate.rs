use std::collections::BTreeMap;

use super::model::{AggregateRow, GroupId, GroupKey, Measure, OptionSet, Record};

// ---------------------------------------------------------------------------
// AggregateTable – grouped averages, built once per load
// ---------------------------------------------------------------------------

/// Rows sorted by primary id then secondary id, one per distinct key.
/// Never mutated after [`build_aggregate_table`] returns.
#[derive(Debug, Clone, Default)]
pub struct AggregateTable {
    rows: Vec<AggregateRow>,
    primary_options: OptionSet,
    source_records: usize,
}

impl AggregateTable {
    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    /// `All` plus every distinct primary id, in table order.
    pub fn primary_options(&self) -> &OptionSet {
        &self.primary_options
    }

    /// Number of raw records the table was built from.
    pub fn source_records(&self) -> usize {
        self.source_records
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Running sums for one group. Blank measures are not counted.
#[derive(Debug, Default)]
struct Accumulator {
    sums: [f64; Measure::COUNT],
    counts: [usize; Measure::COUNT],
    records: usize,
}

impl Accumulator {
    fn push(&mut self, record: &Record) {
        self.records += 1;
        for measure in Measure::ALL {
            if let Some(v) = record.measure(measure) {
                self.sums[measure.index()] += v;
                self.counts[measure.index()] += 1;
            }
        }
    }

    /// At least one measure of one record was answered.
    fn has_answers(&self) -> bool {
        self.counts.iter().any(|&n| n > 0)
    }

    fn finish(self, key: GroupKey) -> AggregateRow {
        // A measure nobody in the group answered is filled with 0.
        let means = std::array::from_fn(|i| match self.counts[i] {
            0 => 0.0,
            n => self.sums[i] / n as f64,
        });
        AggregateRow {
            key,
            means,
            records: self.records,
        }
    }
}

/// Group `records` by (primary, secondary) and average each measure.
///
/// A group in which every measure of every record is blank produces no row,
/// and so never appears among the dropdown options either.
pub fn build_aggregate_table(records: &[Record]) -> AggregateTable {
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for record in records {
        groups.entry(record.key()).or_default().push(record);
    }

    let rows: Vec<AggregateRow> = groups
        .into_iter()
        .filter(|(_, acc)| acc.has_answers())
        .map(|(key, acc)| acc.finish(key))
        .collect();

    // Rows are sorted by primary first, so equal primaries are adjacent.
    let mut primary_ids: Vec<GroupId> = rows.iter().map(|r| r.primary().clone()).collect();
    primary_ids.dedup();

    AggregateTable {
        rows,
        primary_options: OptionSet::new(primary_ids),
        source_records: records.len(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::model::Selection;

    pub(crate) fn record(primary: i64, secondary: &str, pace: Option<f64>) -> Record {
        Record {
            primary: GroupId::Integer(primary),
            secondary: GroupId::from(secondary),
            measures: [pace, Some(1.0), None, None, None, None],
        }
    }

    /// The four-record example used across the filter tests.
    pub(crate) fn example_records() -> Vec<Record> {
        vec![
            record(1, "A", Some(80.0)),
            record(1, "A", Some(90.0)),
            record(1, "B", Some(50.0)),
            record(2, "A", Some(100.0)),
        ]
    }

    #[test]
    fn averages_per_key() {
        let table = build_aggregate_table(&example_records());
        assert_eq!(table.len(), 3);
        assert_eq!(table.source_records(), 4);

        let row = &table.rows()[0];
        assert_eq!(row.primary(), &GroupId::Integer(1));
        assert_eq!(row.secondary(), &GroupId::from("A"));
        assert_eq!(row.mean(Measure::Pace), 85.0);
        assert_eq!(row.mean(Measure::Support), 1.0);
        assert_eq!(row.records, 2);
    }

    #[test]
    fn measure_without_values_is_zero() {
        let table = build_aggregate_table(&example_records());
        for row in table.rows() {
            assert_eq!(row.mean(Measure::ConceptMastery), 0.0);
        }
    }

    #[test]
    fn blank_cells_do_not_drag_the_mean() {
        let records = vec![record(1, "A", Some(60.0)), record(1, "A", None)];
        let table = build_aggregate_table(&records);
        assert_eq!(table.rows()[0].mean(Measure::Pace), 60.0);
        assert_eq!(table.rows()[0].records, 2);
    }

    #[test]
    fn rows_sorted_by_primary_then_secondary() {
        let records = vec![
            record(10, "B", Some(1.0)),
            record(2, "Z", Some(1.0)),
            record(10, "A", Some(1.0)),
            record(2, "C", Some(1.0)),
        ];
        let table = build_aggregate_table(&records);
        let keys: Vec<String> = table
            .rows()
            .iter()
            .map(|r| format!("{}/{}", r.primary(), r.secondary()))
            .collect();
        assert_eq!(keys, ["2/C", "2/Z", "10/A", "10/B"]);

        let primaries: Vec<&Selection> = table.primary_options().choices().iter().collect();
        assert_eq!(
            primaries,
            [
                &Selection::All,
                &Selection::Only(GroupId::Integer(2)),
                &Selection::Only(GroupId::Integer(10)),
            ]
        );
    }

    #[test]
    fn unrelated_record_leaves_aggregate_alone() {
        let mut records = example_records();
        let before = build_aggregate_table(&records).rows()[0].clone();

        records[2].measures[0] = Some(0.0);
        records.push(record(3, "A", Some(5.0)));
        let after = build_aggregate_table(&records).rows()[0].clone();

        assert_eq!(before, after);
    }

    #[test]
    fn group_without_any_answer_is_dropped() {
        let silent = Record {
            primary: GroupId::Integer(1),
            secondary: GroupId::from("A"),
            measures: [None; Measure::COUNT],
        };
        let silent_school = Record {
            primary: GroupId::Integer(9),
            ..silent.clone()
        };
        let records = vec![silent, record(1, "B", Some(70.0)), silent_school];
        let table = build_aggregate_table(&records);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].secondary(), &GroupId::from("B"));
        assert_eq!(table.source_records(), 3);
        assert_eq!(
            table.primary_options().choices(),
            &[Selection::All, Selection::Only(GroupId::Integer(1))]
        );
        let options = crate::data::filter::derive_secondary_options(&table, &Selection::All);
        assert_eq!(options.ids().collect::<Vec<_>>(), [&GroupId::from("B")]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = build_aggregate_table(&[]);
        assert!(table.is_empty());
        assert_eq!(table.primary_options().choices().len(), 1);
    }
}
