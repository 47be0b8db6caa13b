use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

const MEASURE_COLUMNS: [&str; 6] = [
    "WeekPace",
    "AcademicSupport",
    "ConceptMastering",
    "instructorEngagement",
    "instructorClarity",
    "instructorknowledgeable",
];

const CLASS_CODES: [&str; 8] = [
    "BIO101", "CHEM110", "CS101", "CS201", "ECON100", "HIST210", "MATH140", "PHYS150",
];

/// Share of answers left blank.
const BLANK_RATE: f64 = 0.04;

#[derive(Parser)]
#[command(name = "generate_sample")]
#[command(about = "Write a synthetic course-survey dataset", long_about = None)]
struct Args {
    /// Output file (.csv or .parquet)
    #[arg(default_value = "universal_db.csv")]
    out: PathBuf,

    /// Number of universities
    #[arg(long, default_value_t = 6)]
    universities: i64,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// A 1-5 Likert answer around `centre`, or blank.
    fn answer(&mut self, centre: f64) -> Option<f64> {
        if self.next_f64() < BLANK_RATE {
            return None;
        }
        Some(self.gauss(centre, 0.8).round().clamp(1.0, 5.0))
    }
}

/// Column-oriented sample rows.
#[derive(Default)]
struct Survey {
    university: Vec<i64>,
    class_code: Vec<String>,
    measures: [Vec<Option<f64>>; 6],
}

fn generate(args: &Args) -> Survey {
    let mut rng = SimpleRng::new(args.seed);
    let mut survey = Survey::default();

    for university in 1..=args.universities {
        // Each school offers a random subset of classes.
        let n_classes = 3 + rng.below(CLASS_CODES.len() - 2);
        let first = rng.below(CLASS_CODES.len());
        for k in 0..n_classes {
            let code = CLASS_CODES[(first + k) % CLASS_CODES.len()];
            let centres: Vec<f64> = (0..MEASURE_COLUMNS.len())
                .map(|_| 2.5 + 2.0 * rng.next_f64())
                .collect();
            let respondents = 5 + rng.below(20);

            for _ in 0..respondents {
                survey.university.push(university);
                survey.class_code.push(code.to_string());
                for (column, centre) in survey.measures.iter_mut().zip(&centres) {
                    column.push(rng.answer(*centre));
                }
            }
        }
    }

    survey
}

fn write_csv(survey: &Survey, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["UniversityID", "ClassCode"];
    header.extend(MEASURE_COLUMNS);
    writer.write_record(&header)?;

    for row in 0..survey.university.len() {
        let mut fields = vec![
            survey.university[row].to_string(),
            survey.class_code[row].clone(),
        ];
        fields.extend(
            survey
                .measures
                .iter()
                .map(|column| column[row].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(survey: &Survey, path: &Path) -> Result<()> {
    let mut fields = vec![
        Field::new("UniversityID", DataType::Int64, false),
        Field::new("ClassCode", DataType::Utf8, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(survey.university.clone())),
        Arc::new(StringArray::from(survey.class_code.clone())),
    ];
    for (name, column) in MEASURE_COLUMNS.iter().zip(&survey.measures) {
        fields.push(Field::new(*name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from(column.clone())));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let survey = generate(&args);

    let is_parquet = matches!(
        args.out.extension().and_then(|e| e.to_str()),
        Some("parquet" | "pq")
    );
    if is_parquet {
        write_parquet(&survey, &args.out)?;
    } else {
        write_csv(&survey, &args.out)?;
    }

    println!(
        "Wrote {} survey responses from {} universities to {}",
        survey.university.len(),
        args.universities,
        args.out.display()
    );
    Ok(())
}
