/// Data layer: core types, loading, aggregation, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<Record>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by (UniversityID, ClassCode), mean per measure
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  primary then secondary → rows + secondary options
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  rows → CSV / JSON records
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
