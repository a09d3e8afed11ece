/// Data layer: table types, loading, cleaning and the derived ratio.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse sheet → ObservationTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  required columns present and numeric
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  drop all-missing rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  append soc_rr = ln(elev / amb)
///   └──────────┘
/// ```

pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
