use serde::Serialize;
use tracing::{debug, warn};

use crate::config::GridConfig;
use crate::grid::CanonicalGrid;
use crate::header;
use crate::model::SourceReading;
use crate::profile::{profile_table, ColumnReport, WorkingTable};
use crate::render::{display, export_plan, DisplayGrid, ExportPlan};
use crate::schema::detect_long_schema;
use crate::validate::{validate, ValidationFinding};
use crate::{long, matrix};

/// Which reconciler produced the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    Long,
    Matrix,
    Skeleton,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Matrix => write!(f, "matrix"),
            Self::Skeleton => write!(f, "skeleton"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnexMeta {
    pub engine_version: String,
    pub run_at: String,
    pub layout: Layout,
}

/// Everything one request produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnexResult {
    pub meta: AnnexMeta,
    pub columns: Vec<ColumnReport>,
    pub findings: Vec<ValidationFinding>,
    pub working: WorkingTable,
    pub grid: CanonicalGrid,
}

impl AnnexResult {
    pub fn layout(&self) -> Layout {
        self.meta.layout
    }

    pub fn display(&self) -> DisplayGrid {
        display(&self.grid)
    }

    pub fn export_plan(&self) -> ExportPlan {
        export_plan(&self.grid)
    }
}

/// Pick a layout and build the canonical grid.
///
/// Long format wins when its four columns are present. Otherwise a two-level
/// header is looked for in the header-less reading. Neither yields the
/// skeleton grid.
pub fn build_grid(config: &GridConfig, reading: &SourceReading) -> (Layout, CanonicalGrid) {
    if let Some(schema) = detect_long_schema(&reading.table) {
        debug!(?schema, "long layout");
        return (Layout::Long, long::reconcile(&reading.table, &schema));
    }

    if let Some(grid) = &reading.grid {
        if let Some(table) = header::discover(grid, config.header_scan_rows) {
            debug!(columns = table.width(), "matrix layout");
            return (Layout::Matrix, matrix::reconcile(&table));
        }
    }

    warn!("no recognizable layout, emitting skeleton grid");
    (Layout::Skeleton, CanonicalGrid::skeleton())
}

/// Run the whole pipeline over one source reading. Never fails: unusable
/// input degrades to findings and a skeleton grid.
pub fn run(config: &GridConfig, reading: &SourceReading) -> AnnexResult {
    let profile = profile_table(&reading.table, config);
    let findings = validate(&reading.table, &profile, config);
    let (layout, grid) = build_grid(config, reading);

    debug!(
        %layout,
        year_blocks = grid.year_blocks().len(),
        columns = grid.column_count(),
        findings = findings.len(),
        "annex built"
    );

    AnnexResult {
        meta: AnnexMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            layout,
        },
        columns: profile.reports,
        findings,
        working: profile.working,
        grid,
    }
}
