use crate::grid::{Hex, HexGrid};
use derive_more::Display;
use serde::Serialize;

/// An axial-style coordinate label for a hex, relative to the middle of the
/// grid. `q` grows to the right, `r` grows **upward** (opposite of pixel
/// space), and the hex nearest the visual center of the grid is `0,0`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, Serialize)]
#[display(fmt = "{},{}", "self.q", "self.r")]
pub struct HexLabel {
    pub q: i64,
    pub r: i64,
}

/// Assigns [HexLabel]s to the hexes of a grid. Built from the same lattice
/// that's being drawn, so labels always line up with their hexes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Labeler {
    center_row: i64,
    center_col: i64,
}

impl Labeler {
    /// Create a labeler for a grid with the given dimensions. `row_count` is
    /// the number of rows, `col_count` is the max column index. See
    /// [HexGrid::row_count] and [HexGrid::col_count].
    pub fn new(row_count: u32, col_count: u32) -> Self {
        Self {
            center_row: (row_count / 2) as i64,
            center_col: (col_count / 2) as i64,
        }
    }

    /// Create a labeler centered on a particular grid
    pub fn for_grid(grid: &HexGrid) -> Self {
        Self::new(grid.row_count(), grid.col_count())
    }

    /// Get the label for a grid position
    pub fn label_at(&self, row: u32, col: u32) -> HexLabel {
        HexLabel {
            q: col as i64 - self.center_col,
            r: self.center_row - row as i64,
        }
    }

    pub fn label(&self, hex: &Hex) -> HexLabel {
        self.label_at(hex.row, hex.col)
    }
}
