// File I/O operations

pub mod csv;
pub mod export;
pub mod ingest;
pub mod store;
pub mod xlsx;

pub use export::{save_annex, write_annex, ExportError};
pub use ingest::{read_source, IngestError, MAX_INPUT_BYTES};
pub use store::{Artifact, ArtifactId, ArtifactStore};
