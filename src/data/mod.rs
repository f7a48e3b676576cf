//! Data layer: loading, reshaping, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawTable, normalize headers (schema)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ reshape   │  wide → long: one Observation per row × worker column
//!   └──────────┘
//!        │
//!        ▼
//!   ┌────────────────┐
//!   │ WorkforceDataset │  immutable, shared behind an Arc
//!   └────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  state → district → worker type/area/gender → industry
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────────┐
//!   │ aggregate/usecase │  grouped views → pipeline::Dashboard → ui / export
//!   └──────────────────┘
//! ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod reshape;
pub mod schema;
pub mod usecase;
