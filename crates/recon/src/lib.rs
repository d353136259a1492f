//! `laborgrid-recon`: labor-market annex reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded source reading, infers its layout
//! and returns the canonical concept × (year, month) grid together with the
//! column report, validation findings and the styled export plan.
//! No CLI or IO dependencies.

pub mod alias;
pub mod calendar;
pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod header;
pub mod long;
pub mod matrix;
pub mod model;
pub mod normalize;
pub mod profile;
pub mod render;
pub mod schema;
pub mod validate;

pub use calendar::Month;
pub use config::GridConfig;
pub use engine::{run, AnnexResult, Layout};
pub use error::GridError;
pub use grid::{CanonicalGrid, Concept, YearBlock};
pub use model::{Cell, ColumnLabel, RawTable, SheetGrid, SourceReading};
