//! Accumulates consecutive table-row lines into one table block.
//!
//! The accumulator is a two-state machine local to a single render call:
//! closed until the first row arrives, open until the first non-table line
//! (or end of input) flushes the block. The first accumulated row is the
//! header. Column sizing uses one global maximum cell width shared by every
//! column, so a block can never come out jagged.

use tracing::debug;

use crate::{
    node::{RenderNode, TableBlock, TableRow, TextRun},
    style::StyleSheet,
};

/// Estimated pixel width of one rendered character.
const CELL_CHAR_WIDTH: f64 = 10.0;

#[derive(Debug, Default)]
pub struct TableAccumulator {
    rows: Vec<Vec<String>>,
    max_cell_width: f64,
}

impl TableAccumulator {
    pub fn new() -> TableAccumulator {
        TableAccumulator::default()
    }

    pub fn is_open(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Add one detected table row. Cells are expected pre-trimmed.
    pub fn push_row(&mut self, cells: Vec<&str>) {
        for cell in &cells {
            let width = cell.chars().count() as f64 * CELL_CHAR_WIDTH;
            if width > self.max_cell_width {
                self.max_cell_width = width;
            }
        }
        self.rows.push(cells.into_iter().map(str::to_string).collect());
    }

    /// Close the block and emit it, or `None` if no rows accumulated.
    ///
    /// Rows longer than the header are truncated to the header's cell count
    /// so every row satisfies `cells.len() <= header.len()`; short rows stay
    /// short.
    pub fn finish(&mut self, styles: &StyleSheet) -> Option<RenderNode> {
        if self.rows.is_empty() {
            return None;
        }

        let rows = std::mem::take(&mut self.rows);
        let max_cell_width = std::mem::replace(&mut self.max_cell_width, 0.0);
        let header_len = rows[0].len();

        debug!(rows = rows.len(), columns = header_len, "closing table block");

        let rows: Vec<TableRow> = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut cells)| {
                let is_header = i == 0;
                cells.truncate(header_len);

                let row_style = if is_header {
                    styles.table_row.merge(&styles.table_header)
                } else {
                    styles.table_row.clone()
                };

                let cells = cells
                    .into_iter()
                    .map(|cell| {
                        let mut style = styles.table_cell.clone();
                        if is_header {
                            style = style.merge(&styles.first_row);
                        }

                        // Cells carrying bold markers render bold with the
                        // markers stripped
                        let bold = cell.contains("**");
                        let text = if bold {
                            cell.replace("**", "").trim().to_string()
                        } else {
                            cell
                        };

                        RenderNode::Text(TextRun {
                            text,
                            style,
                            bold,
                            italic: false,
                        })
                    })
                    .collect();

                TableRow {
                    cells,
                    is_header,
                    style: row_style,
                }
            })
            .collect();

        Some(RenderNode::Table(TableBlock {
            rows,
            column_widths: vec![max_cell_width; header_len],
            style: styles.table.clone(),
        }))
    }
}
