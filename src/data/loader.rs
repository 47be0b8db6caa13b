use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::{DataLoadError, SchemaError};
use super::model::{GroupId, Measure, Record, PRIMARY_COLUMN, SECONDARY_COLUMN};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// What to do with a record that has no primary or secondary id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Fail the whole load with [`DataLoadError::Schema`].
    #[default]
    Reject,
    /// Drop the record, count it in [`LoadedRecords::skipped`].
    Skip,
}

/// Records read from one source file.
#[derive(Debug, Clone, Default)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    /// Records dropped under [`SchemaPolicy::Skip`].
    pub skipped: usize,
}

/// Load survey records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row, one record per line
/// * `.json`         – `[{ "UniversityID": 1, "ClassCode": "A", "WeekPace": 80, ... }, ...]`
/// * `.parquet`      – flat columns with the same names
pub fn load_file(path: &Path, policy: SchemaPolicy) -> Result<LoadedRecords, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => load_delimited(path, b',', policy),
        "tsv" => load_delimited(path, b'\t', policy),
        "json" => load_json(path, policy),
        "parquet" | "pq" => load_parquet(path, policy),
        other => Err(DataLoadError::UnsupportedExtension(other.to_string())),
    }
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Shared helpers: column lookup and record assembly
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header.
#[derive(Debug)]
struct ColumnMap {
    primary: usize,
    secondary: usize,
    measures: [usize; Measure::COUNT],
}

impl ColumnMap {
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, DataLoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
        };

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            find(name).unwrap_or_else(|| {
                missing.push(name.to_string());
                usize::MAX
            })
        };

        let primary = require(PRIMARY_COLUMN);
        let secondary = require(SECONDARY_COLUMN);
        let measures = Measure::ALL.map(|m| require(m.column()));

        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }
        Ok(Self {
            primary,
            secondary,
            measures,
        })
    }
}

/// Collects records while applying the [`SchemaPolicy`].
struct RecordSink {
    policy: SchemaPolicy,
    loaded: LoadedRecords,
}

impl RecordSink {
    fn new(policy: SchemaPolicy) -> Self {
        Self {
            policy,
            loaded: LoadedRecords::default(),
        }
    }

    fn push(
        &mut self,
        row: usize,
        primary: Option<GroupId>,
        secondary: Option<GroupId>,
        measures: [Option<f64>; Measure::COUNT],
    ) -> Result<(), DataLoadError> {
        let (primary, secondary) = match (primary, secondary) {
            (Some(p), Some(s)) => (p, s),
            (None, _) => return self.reject(row, PRIMARY_COLUMN),
            (_, None) => return self.reject(row, SECONDARY_COLUMN),
        };
        self.loaded.records.push(Record {
            primary,
            secondary,
            measures,
        });
        Ok(())
    }

    fn reject(&mut self, row: usize, column: &'static str) -> Result<(), DataLoadError> {
        let err = SchemaError { row, column };
        match self.policy {
            SchemaPolicy::Reject => Err(err.into()),
            SchemaPolicy::Skip => {
                log::warn!("Skipping malformed {err}");
                self.loaded.skipped += 1;
                Ok(())
            }
        }
    }

    fn finish(self) -> LoadedRecords {
        self.loaded
    }
}

/// Blank and `NaN` cells are unanswered; anything else must be a number.
fn parse_measure(cell: &str, row: usize, measure: Measure) -> Result<Option<f64>, DataLoadError> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(|v| (!v.is_nan()).then_some(v))
        .map_err(|_| DataLoadError::InvalidMeasure {
            row,
            column: measure.column(),
            value: cell.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row required; columns beyond the required ones are ignored.
/// Short rows are accepted and their missing trailing cells read as blank.
fn load_delimited(
    path: &Path,
    delimiter: u8,
    policy: SchemaPolicy,
) -> Result<LoadedRecords, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(open(path)?));

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = ColumnMap::resolve(&headers)?;
    let mut sink = RecordSink::new(policy);

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let mut measures = [None; Measure::COUNT];
        for (slot, (measure, &idx)) in measures
            .iter_mut()
            .zip(Measure::ALL.iter().zip(columns.measures.iter()))
        {
            *slot = parse_measure(cell(idx), row, *measure)?;
        }

        sink.push(
            row,
            GroupId::parse(cell(columns.primary)),
            GroupId::parse(cell(columns.secondary)),
            measures,
        )?;
    }

    Ok(sink.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). A column counts as
/// missing only if no object carries it.
fn load_json(path: &Path, policy: SchemaPolicy) -> Result<LoadedRecords, DataLoadError> {
    let objects: Vec<JsonMap<String, JsonValue>> =
        serde_json::from_reader(BufReader::new(open(path)?))?;

    let required = [PRIMARY_COLUMN, SECONDARY_COLUMN]
        .into_iter()
        .chain(Measure::ALL.iter().map(|m| m.column()));
    let missing: Vec<String> = required
        .filter(|name| !objects.iter().any(|obj| json_field(obj, name).is_some()))
        .map(str::to_string)
        .collect();
    // An empty array has no columns at all; that is just an empty dataset.
    if !objects.is_empty() && !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let mut sink = RecordSink::new(policy);
    for (i, obj) in objects.iter().enumerate() {
        let row = i + 1;
        let mut measures = [None; Measure::COUNT];
        for (slot, measure) in measures.iter_mut().zip(Measure::ALL) {
            *slot = json_measure(json_field(obj, measure.column()), row, measure)?;
        }
        sink.push(
            row,
            json_group_id(json_field(obj, PRIMARY_COLUMN)),
            json_group_id(json_field(obj, SECONDARY_COLUMN)),
            measures,
        )?;
    }

    Ok(sink.finish())
}

fn json_field<'a>(obj: &'a JsonMap<String, JsonValue>, name: &str) -> Option<&'a JsonValue> {
    obj.get(name).or_else(|| {
        obj.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

fn json_group_id(val: Option<&JsonValue>) -> Option<GroupId> {
    match val? {
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(GroupId::Integer(i)),
            None => GroupId::parse(&n.to_string()),
        },
        JsonValue::String(s) => GroupId::parse(s),
        JsonValue::Bool(b) => Some(GroupId::Text(b.to_string())),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn json_measure(
    val: Option<&JsonValue>,
    row: usize,
    measure: Measure,
) -> Result<Option<f64>, DataLoadError> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) => parse_measure(s, row, measure),
        Some(other) => Err(DataLoadError::InvalidMeasure {
            row,
            column: measure.column(),
            value: other.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat survey columns.
///
/// Id columns may be any integer type or UTF-8; measure columns any numeric
/// type. Nulls follow the same rules as blank CSV cells. Works with files
/// written by both **Pandas** (`df.to_parquet()`) and **Polars**.
fn load_parquet(path: &Path, policy: SchemaPolicy) -> Result<LoadedRecords, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let columns = ColumnMap::resolve(&names)?;
    let reader = builder.build()?;

    let mut sink = RecordSink::new(policy);
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let primary = id_cells(batch.column(columns.primary), PRIMARY_COLUMN)?;
        let secondary = id_cells(batch.column(columns.secondary), SECONDARY_COLUMN)?;
        let measure_cols = Measure::ALL
            .iter()
            .zip(columns.measures.iter())
            .map(|(m, &idx)| measure_cells(batch.column(idx), *m))
            .collect::<Result<Vec<_>, _>>()?;

        for (i, (p, s)) in primary.into_iter().zip(secondary).enumerate() {
            let measures = std::array::from_fn(|m| measure_cols[m][i]);
            sink.push(row_offset + i + 1, p, s, measures)?;
        }
        row_offset += batch.num_rows();
    }

    Ok(sink.finish())
}

// -- Parquet / Arrow helpers --

fn is_integer(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Read an id column into per-row group ids (`None` for null or blank).
fn id_cells(col: &ArrayRef, column: &'static str) -> Result<Vec<Option<GroupId>>, DataLoadError> {
    let data_type = col.data_type();
    if is_integer(data_type) {
        let ints = cast(col.as_ref(), &DataType::Int64)?;
        let ints = ints.as_primitive::<Int64Type>();
        return Ok(ints.iter().map(|v| v.map(GroupId::Integer)).collect());
    }
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let text = cast(col.as_ref(), &DataType::Utf8)?;
            let text = text.as_string::<i32>();
            Ok(text.iter().map(|v| v.and_then(GroupId::parse)).collect())
        }
        other => Err(DataLoadError::UnsupportedColumnType {
            column,
            data_type: other.to_string(),
        }),
    }
}

/// Read a numeric measure column as `f64` cells (`None` for null or NaN).
fn measure_cells(col: &ArrayRef, measure: Measure) -> Result<Vec<Option<f64>>, DataLoadError> {
    if !col.data_type().is_numeric() {
        return Err(DataLoadError::UnsupportedColumnType {
            column: measure.column(),
            data_type: col.data_type().to_string(),
        });
    }
    let floats = cast(col.as_ref(), &DataType::Float64)?;
    let floats = floats.as_primitive::<Float64Type>();
    Ok(floats
        .iter()
        .map(|v| v.filter(|f| !f.is_nan()))
        .collect())
}
