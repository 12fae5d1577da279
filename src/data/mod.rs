//! Data layer: records, loading, caching, filter resolution and filtering.
//!
//! Architecture:
//! ```text
//!  bundled CSV / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐        ┌──────────┐
//!   │  loader   │ ─────▶ │  cache    │  Arc<Dataset>, reloaded after a TTL
//!   └──────────┘        └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  resolve  │  PartialFilterSet → canonical FilterSet
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterSet → filtered indices
//!   └──────────┘
//! ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod resolve;
