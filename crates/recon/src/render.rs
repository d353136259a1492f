//! Grid projections: the preview structure and the styled export plan.
//!
//! Both are pure functions of one [`CanonicalGrid`]; the io crate executes
//! the plan without making layout decisions of its own.

use serde::Serialize;

use crate::grid::CanonicalGrid;

pub const SHEET_NAME: &str = "Datos_Deseados";
pub const BORDER_COLOR: u32 = 0xE5E7EB;
pub const FILL_COLOR: u32 = 0xFFFFFF;
pub const VALUE_FORMAT: &str = "0.00";
pub const LABEL_HEADER_TEXT: &str = "Concepto";

pub const LABEL_COLUMN_WIDTH: f64 = 42.0;
pub const VALUE_COLUMN_WIDTH: f64 = 12.0;

/// Header rows above the concept rows: years, then months.
const HEADER_ROWS: usize = 2;

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayYear {
    pub year: i32,
    pub months: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub concept: String,
    pub values: Vec<String>,
}

/// Preview of the grid: year/month headers and two-decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayGrid {
    pub year_blocks: Vec<DisplayYear>,
    pub rows: Vec<DisplayRow>,
}

/// Two decimals; absent is the empty string.
pub fn format_value(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

pub fn display(grid: &CanonicalGrid) -> DisplayGrid {
    let year_blocks = grid
        .year_blocks()
        .iter()
        .map(|b| DisplayYear {
            year: b.year(),
            months: b.months().iter().map(|m| m.abbrev().to_string()).collect(),
        })
        .collect();
    let rows = grid
        .rows()
        .iter()
        .map(|r| DisplayRow {
            concept: r.concept().label().to_string(),
            values: r.values().iter().map(|v| format_value(*v)).collect(),
        })
        .collect();
    DisplayGrid { year_blocks, rows }
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Borders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Borders {
    pub const ALL: Borders = Borders {
        top: true,
        bottom: true,
        left: true,
        right: true,
    };

    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub align: HAlign,
    pub borders: Borders,
    pub num_format: Option<&'static str>,
    pub fill: u32,
    pub border_color: u32,
}

impl CellStyle {
    fn plain(align: HAlign) -> Self {
        Self {
            bold: false,
            align,
            borders: Borders::default(),
            num_format: None,
            fill: FILL_COLOR,
            border_color: BORDER_COLOR,
        }
    }

    fn header() -> Self {
        Self {
            bold: true,
            ..Self::plain(HAlign::Center)
        }
    }

    fn value() -> Self {
        Self {
            num_format: Some(VALUE_FORMAT),
            ..Self::plain(HAlign::Right)
        }
    }

    fn framed(self, borders: Borders) -> Self {
        Self { borders, ..self }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One write against the target sheet. Rows and columns are zero-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    Merge {
        first_row: usize,
        first_col: usize,
        last_row: usize,
        last_col: usize,
        text: String,
        style: CellStyle,
    },
    Text {
        row: usize,
        col: usize,
        text: String,
        style: CellStyle,
    },
    Number {
        row: usize,
        col: usize,
        value: f64,
        style: CellStyle,
    },
    Blank {
        row: usize,
        col: usize,
        style: CellStyle,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnWidth {
    pub col: usize,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    pub sheet_name: &'static str,
    pub hide_gridlines: bool,
    pub column_widths: Vec<ColumnWidth>,
    pub ops: Vec<WriteOp>,
}

/// Position of a sheet column relative to the year blocks.
#[derive(Debug, Clone, Copy)]
struct Edge {
    block_start: bool,
    block_end: bool,
}

/// Translate the grid into sheet writes.
///
/// Layout: row 0 holds merged year headers, row 1 the month headers, then one
/// row per concept. Column 0 carries the "Concepto" header (merged A1:A2) and
/// the concept labels. Borders frame each year block and the outer edge.
pub fn export_plan(grid: &CanonicalGrid) -> ExportPlan {
    let last_row = HEADER_ROWS + grid.rows().len() - 1;
    let mut ops = Vec::new();

    let frame_row = |row: usize, edge: Edge| Borders {
        top: row == 0,
        bottom: row == last_row,
        left: edge.block_start,
        right: edge.block_end,
    };
    let label_edge = Edge {
        block_start: true,
        block_end: true,
    };

    ops.push(WriteOp::Merge {
        first_row: 0,
        first_col: 0,
        last_row: 1,
        last_col: 0,
        text: LABEL_HEADER_TEXT.to_string(),
        style: CellStyle::header().framed(Borders::ALL),
    });

    // Sheet column of each grid column, plus its block edges.
    let mut edges: Vec<Edge> = Vec::with_capacity(grid.column_count());
    let mut col = 1;
    for block in grid.year_blocks() {
        let first = col;
        let last = col + block.months().len() - 1;
        let year = block.year().to_string();
        let year_style = CellStyle::header().framed(Borders {
            top: true,
            bottom: false,
            left: true,
            right: true,
        });
        if first == last {
            ops.push(WriteOp::Text {
                row: 0,
                col: first,
                text: year,
                style: year_style,
            });
        } else {
            ops.push(WriteOp::Merge {
                first_row: 0,
                first_col: first,
                last_row: 0,
                last_col: last,
                text: year,
                style: year_style,
            });
        }

        for (i, month) in block.months().iter().enumerate() {
            let edge = Edge {
                block_start: i == 0,
                block_end: first + i == last,
            };
            ops.push(WriteOp::Text {
                row: 1,
                col: first + i,
                text: month.abbrev().to_string(),
                style: CellStyle::header().framed(frame_row(1, edge)),
            });
            edges.push(edge);
        }
        col = last + 1;
    }

    for (i, concept_row) in grid.rows().iter().enumerate() {
        let row = HEADER_ROWS + i;
        ops.push(WriteOp::Text {
            row,
            col: 0,
            text: concept_row.concept().label().to_string(),
            style: CellStyle::plain(HAlign::Left).framed(frame_row(row, label_edge)),
        });
        for (j, (value, edge)) in concept_row.values().iter().zip(&edges).enumerate() {
            let style = CellStyle::value().framed(frame_row(row, *edge));
            let col = 1 + j;
            ops.push(match value {
                Some(value) => WriteOp::Number {
                    row,
                    col,
                    value: *value,
                    style,
                },
                None => WriteOp::Blank { row, col, style },
            });
        }
    }

    let mut column_widths = vec![ColumnWidth {
        col: 0,
        width: LABEL_COLUMN_WIDTH,
    }];
    column_widths.extend((1..=grid.column_count()).map(|col| ColumnWidth {
        col,
        width: VALUE_COLUMN_WIDTH,
    }));

    ExportPlan {
        sheet_name: SHEET_NAME,
        hide_gridlines: true,
        column_widths,
        ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Month;
    use crate::grid::{Concept, YearBlock};

    fn sample() -> CanonicalGrid {
        let candidates = vec![
            YearBlock::new(2023, vec![Month::Jan, Month::Feb]),
            YearBlock::new(2024, vec![Month::Jan]),
        ];
        CanonicalGrid::from_fn(candidates, |c, y, m| match (c, y, m) {
            (Concept::GlobalParticipation, 2023, Month::Jan) => Some(77.9),
            (Concept::GlobalParticipation, 2023, Month::Feb) => Some(63.4),
            (Concept::Occupation, 2024, Month::Jan) => Some(55.0),
            _ => None,
        })
    }

    #[test]
    fn display_formats_two_decimals() {
        let d = display(&sample());
        assert_eq!(d.year_blocks[0].months, vec!["Ene", "Feb"]);
        assert_eq!(d.rows[1].concept, "Tasa Global de Participación (TGP)");
        assert_eq!(d.rows[1].values, vec!["77.90", "63.40", ""]);
        assert_eq!(d.rows[0].values, vec!["", "", ""]);
    }

    #[test]
    fn year_headers_merge_only_multi_month_blocks() {
        let plan = export_plan(&sample());
        let merges: Vec<_> = plan
            .ops
            .iter()
            .filter_map(|op| match op {
                WriteOp::Merge {
                    first_col,
                    last_col,
                    text,
                    ..
                } => Some((*first_col, *last_col, text.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(merges, vec![(0, 0, "Concepto"), (1, 2, "2023")]);
        assert!(plan.ops.iter().any(|op| matches!(
            op,
            WriteOp::Text { row: 0, col: 3, text, style } if text == "2024" && style.bold
        )));
    }

    #[test]
    fn values_are_right_aligned_and_framed_per_block() {
        let plan = export_plan(&sample());
        let style_at = |r: usize, c: usize| {
            plan.ops.iter().find_map(|op| match op {
                WriteOp::Number { row, col, style, .. } | WriteOp::Blank { row, col, style }
                    if *row == r && *col == c =>
                {
                    Some(*style)
                }
                _ => None,
            })
        };
        let first = style_at(3, 1).unwrap();
        assert_eq!(first.align, HAlign::Right);
        assert_eq!(first.num_format, Some(VALUE_FORMAT));
        assert!(!first.bold);
        assert!(first.borders.left && !first.borders.right);
        let last_of_block = style_at(3, 2).unwrap();
        assert!(last_of_block.borders.right);
        let bottom = style_at(4, 3).unwrap();
        assert!(bottom.borders.bottom && bottom.borders.left && bottom.borders.right);
        assert!(plan.ops.iter().all(|op| match op {
            WriteOp::Merge { style, .. }
            | WriteOp::Text { style, .. }
            | WriteOp::Number { style, .. }
            | WriteOp::Blank { style, .. } => style.fill == FILL_COLOR && style.border_color == BORDER_COLOR,
        }));
    }

    #[test]
    fn display_and_plan_agree() {
        let grid = sample();
        let d = display(&grid);
        let plan = export_plan(&grid);
        for op in &plan.ops {
            match op {
                WriteOp::Number { row, col, value, .. } => {
                    assert_eq!(d.rows[row - 2].values[col - 1], format_value(Some(*value)));
                }
                WriteOp::Blank { row, col, .. } => {
                    assert_eq!(d.rows[row - 2].values[col - 1], "");
                }
                _ => {}
            }
        }
    }

    #[test]
    fn skeleton_renders_concept_column_only() {
        let plan = export_plan(&CanonicalGrid::skeleton());
        assert_eq!(plan.column_widths, vec![ColumnWidth { col: 0, width: LABEL_COLUMN_WIDTH }]);
        assert_eq!(plan.ops.len(), 4);
        assert!(plan.hide_gridlines);
        assert_eq!(plan.sheet_name, "Datos_Deseados");
    }
}
