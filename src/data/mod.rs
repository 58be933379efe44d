//! Data layer: run files, coordinates, resampling.
//!
//! Architecture:
//! ```text
//!  <prefix><experiment>_*.txt
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  header   │  `name = value` pairs + variable names
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  numeric body → RunMatrix
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  model    │  CoordinateDomain: merged, sorted axes
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  sampler  │  nearest-row lookup on the shared time grid
//!   └──────────┘
//! ```
//!
//! `filter` selects sub-slices of a finished dataset.

pub mod filter;
pub mod header;
pub mod loader;
pub mod model;
pub mod sampler;
