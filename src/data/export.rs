use std::io::Write;

use super::model::{AggregateRow, Measure, PRIMARY_COLUMN, SECONDARY_COLUMN};

/// Serialization format for a view of aggregate rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Column headers of an exported view, in output order.
pub fn header() -> Vec<&'static str> {
    let mut cols = vec![PRIMARY_COLUMN, SECONDARY_COLUMN];
    cols.extend(Measure::ALL.iter().map(|m| m.column()));
    cols
}

pub fn write_csv<W: Write>(rows: &[AggregateRow], writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(header())?;
    for row in rows {
        let mut fields = vec![row.primary().to_string(), row.secondary().to_string()];
        fields.extend(row.means.iter().map(f64::to_string));
        out.write_record(&fields)?;
    }
    out.flush()?;
    Ok(())
}

/// Pretty JSON array of records objects keyed by source column name.
pub fn write_json<W: Write>(rows: &[AggregateRow], mut writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_rows<W: Write>(
    rows: &[AggregateRow],
    format: ExportFormat,
    writer: W,
) -> anyhow::Result<()> {
    match format {
        ExportFormat::Csv => write_csv(rows, writer)?,
        ExportFormat::Json => write_json(rows, writer)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::build_aggregate_table;
    use crate::data::aggregate::tests::example_records;

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let table = build_aggregate_table(&example_records());
        let mut buf = Vec::new();
        write_csv(table.rows(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + table.len());
        assert_eq!(lines[0], header().join(","));
        assert_eq!(lines[1], "1,A,85,1,0,0,0,0");
    }

    #[test]
    fn json_is_records_array() {
        let table = build_aggregate_table(&example_records());
        let mut buf = Vec::new();
        write_json(table.rows(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["UniversityID"], 2);
        assert_eq!(records[2]["ClassCode"], "A");
        assert_eq!(records[2]["WeekPace"], 100.0);
    }

    #[test]
    fn empty_view_still_has_shape() {
        let mut buf = Vec::new();
        write_rows(&[], ExportFormat::Csv, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim(), header().join(","));

        let mut buf = Vec::new();
        write_rows(&[], ExportFormat::Json, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().trim(), "[]");
    }
}
