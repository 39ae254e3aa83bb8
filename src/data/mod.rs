/// Data layer: core types, loading, cleaning, segmenting and aggregating.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read sheet → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  drop excluded cards, project → FuelTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ segment   │  gasoline / diesel / additive
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  mean metric per driver
///   └──────────┘
/// ```

pub mod aggregate;
pub mod clean;
pub mod loader;
pub mod model;
pub mod segment;
