use std::collections::HashSet;

use super::aggregate::AggregateTable;
use super::model::{AggregateRow, FilterSelection, GroupId, OptionSet, Selection};

// ---------------------------------------------------------------------------
// Two-stage filter: primary, then secondary
// ---------------------------------------------------------------------------

/// Rows surviving only the primary filter, in table order.
fn primary_view<'a>(table: &'a AggregateTable, primary: &Selection) -> Vec<&'a AggregateRow> {
    table
        .rows()
        .iter()
        .filter(|row| primary.matches(row.primary()))
        .collect()
}

/// Rows matching both dropdowns, in table order.
///
/// * `All` on a dimension applies no constraint on it.
/// * A value absent from the table matches nothing; the result is simply empty.
pub fn filter_rows<'a>(
    table: &'a AggregateTable,
    selection: &FilterSelection,
) -> Vec<&'a AggregateRow> {
    let mut rows = primary_view(table, &selection.primary);
    rows.retain(|row| selection.secondary.matches(row.secondary()));
    rows
}

/// Secondary dropdown choices valid under `primary`: `All` followed by the
/// distinct secondary ids in order of first appearance among the rows
/// [`filter_rows`] would return for `(primary, All)`.
///
/// The current secondary selection is not consulted and never reset here.
pub fn derive_secondary_options(table: &AggregateTable, primary: &Selection) -> OptionSet {
    let mut seen: HashSet<&GroupId> = HashSet::new();
    let mut ids: Vec<GroupId> = Vec::new();
    for row in primary_view(table, primary) {
        if seen.insert(row.secondary()) {
            ids.push(row.secondary().clone());
        }
    }
    OptionSet::new(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::build_aggregate_table;
    use crate::data::aggregate::tests::{example_records, record};
    use crate::data::model::Measure;

    fn only(id: impl Into<GroupId>) -> Selection {
        Selection::Only(id.into())
    }

    fn int(i: i64) -> Selection {
        Selection::Only(GroupId::Integer(i))
    }

    fn keys(rows: &[&AggregateRow]) -> Vec<String> {
        rows.iter()
            .map(|r| format!("{}/{}", r.primary(), r.secondary()))
            .collect()
    }

    #[test]
    fn all_all_returns_whole_table_in_order() {
        let table = build_aggregate_table(&example_records());
        let rows = filter_rows(&table, &FilterSelection::default());
        let expected: Vec<&AggregateRow> = table.rows().iter().collect();
        assert_eq!(rows, expected);
    }

    #[test]
    fn secondary_only_filter() {
        let table = build_aggregate_table(&example_records());
        let rows = filter_rows(&table, &FilterSelection::new(Selection::All, only("A")));
        assert_eq!(keys(&rows), ["1/A", "2/A"]);
        assert_eq!(rows[0].mean(Measure::Pace), 85.0);
        assert_eq!(rows[1].mean(Measure::Pace), 100.0);
    }

    #[test]
    fn primary_only_filter() {
        let table = build_aggregate_table(&example_records());
        let rows = filter_rows(&table, &FilterSelection::new(int(1), Selection::All));
        assert_eq!(keys(&rows), ["1/A", "1/B"]);
    }

    #[test]
    fn concrete_pair_yields_at_most_one_row() {
        let table = build_aggregate_table(&example_records());
        for row in table.rows() {
            let selection = FilterSelection::new(row.primary().clone(), row.secondary().clone());
            let rows = filter_rows(&table, &selection);
            assert_eq!(rows, vec![row]);
        }
        let missing = FilterSelection::new(int(2), only("B"));
        assert!(filter_rows(&table, &missing).is_empty());
    }

    #[test]
    fn unknown_values_match_nothing() {
        let table = build_aggregate_table(&example_records());
        let unknown_primary = FilterSelection::new(int(99), Selection::All);
        let unknown_secondary = FilterSelection::new(Selection::All, only("Q"));
        assert!(filter_rows(&table, &unknown_primary).is_empty());
        assert!(filter_rows(&table, &unknown_secondary).is_empty());
    }

    #[test]
    fn filtering_is_idempotent_and_leaves_table_untouched() {
        let table = build_aggregate_table(&example_records());
        let snapshot = table.rows().to_vec();
        let selection = FilterSelection::new(int(1), only("B"));

        let first = filter_rows(&table, &selection);
        let second = filter_rows(&table, &selection);

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(table.rows(), snapshot.as_slice());
    }

    #[test]
    fn secondary_options_follow_primary() {
        let table = build_aggregate_table(&example_records());

        let for_one = derive_secondary_options(&table, &int(1));
        assert_eq!(for_one.choices(), &[Selection::All, only("A"), only("B")]);

        let for_two = derive_secondary_options(&table, &int(2));
        assert_eq!(for_two.choices(), &[Selection::All, only("A")]);

        let for_unknown = derive_secondary_options(&table, &int(7));
        assert_eq!(for_unknown.choices(), &[Selection::All]);
    }

    #[test]
    fn secondary_options_for_all_are_distinct_in_first_appearance_order() {
        let records = vec![
            record(1, "B", Some(1.0)),
            record(2, "A", Some(1.0)),
            record(2, "B", Some(1.0)),
            record(3, "C", Some(1.0)),
        ];
        let table = build_aggregate_table(&records);
        let options = derive_secondary_options(&table, &Selection::All);
        assert_eq!(
            options.choices(),
            &[Selection::All, only("B"), only("A"), only("C")]
        );

        // Same order as the secondary ids of the unfiltered view.
        let mut from_rows: Vec<&GroupId> = Vec::new();
        for row in filter_rows(&table, &FilterSelection::default()) {
            if !from_rows.contains(&row.secondary()) {
                from_rows.push(row.secondary());
            }
        }
        assert_eq!(options.ids().collect::<Vec<_>>(), from_rows);
    }
}
