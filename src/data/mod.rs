//! Data layer: core types, loading, filtering, aggregation and export.
//!
//! Architecture:
//! ```text
//!  damage_data.parquet ─┐
//!  damage_data.csv ─────┤  first one that exists
//!                       ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (memoized by DataSource)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  Vec<Report>, source column list
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterCriteria → filtered Dataset
//!   └──────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌───────────┐  ┌──────────┐
//!   │ aggregate  │  │  export   │  CSV with BOM
//!   └───────────┘  └──────────┘
//!   top-N damage types, summary metrics
//! ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
