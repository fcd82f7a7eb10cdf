//! Hex lattice enumeration.
//!
//! ## Layout
//!
//! Hexes are flat-topped. Columns march left-to-right one horizontal pitch
//! (`3/4` of a hex width) apart, starting with column 0 centered on the left
//! edge of the image. Rows stack top-to-bottom one vertical pitch (one hex
//! height) apart, starting with row 0 centered on the top edge. Every other
//! column (the odd ones) is pushed down by half a hex height, so that each
//! column's hexes nest into the gaps between its neighbors' hexes:
//!
//! ```text
//!  __    __
//! /  \__/  \__
//! \__/  \__/  \
//! /  \__/  \__/
//! \__/  \__/  \
//!    \__/  \__/
//! ```
//!
//! The lattice extends one pitch past the right and bottom edges, which
//! guarantees that every pixel of the image falls within some hex and that
//! partially visible border hexes are included.

use crate::{
    geometry::{hex_vertices, HexVertices, InvalidParameter, Point2},
    util::is_positive_finite,
};
use serde::Serialize;

/// Scale parameters of a grid, and every spacing value derived from them. The
/// derived values are computed once on construction, so whenever one of the
/// inputs changes you need a new instance.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct GridParams {
    pixels_per_mile: f64,
    hex_miles: f64,
    hex_radius: f64,
    hex_width: f64,
    hex_height: f64,
    h_spacing: f64,
    v_spacing: f64,
}

impl GridParams {
    /// Compute grid spacing for the given scale. `hex_miles` is the distance
    /// across a hex (vertex to opposite vertex). Both parameters must be
    /// finite and greater than zero, otherwise pitches would be zero or
    /// negative and the lattice would never end.
    pub fn new(
        pixels_per_mile: f64,
        hex_miles: f64,
    ) -> Result<Self, InvalidParameter> {
        if !is_positive_finite(pixels_per_mile) {
            return Err(InvalidParameter::new(
                "pixels_per_mile",
                format!("must be finite and > 0, but was {}", pixels_per_mile),
            ));
        }
        if !is_positive_finite(hex_miles) {
            return Err(InvalidParameter::new(
                "hex_diameter",
                format!("must be finite and > 0, but was {}", hex_miles),
            ));
        }

        let hex_diameter = pixels_per_mile * hex_miles;
        // Two valid inputs can still multiply out to 0 or infinity
        if !is_positive_finite(hex_diameter) {
            return Err(InvalidParameter::new(
                "hex_diameter",
                format!(
                    "hex diameter of {} px is unusable ({} px/mi * {} mi)",
                    hex_diameter, pixels_per_mile, hex_miles
                ),
            ));
        }

        let hex_radius = hex_diameter / 2.0;
        let hex_width = 2.0 * hex_radius;
        let hex_height = 3.0_f64.sqrt() * hex_radius;
        Ok(Self {
            pixels_per_mile,
            hex_miles,
            hex_radius,
            hex_width,
            hex_height,
            h_spacing: 0.75 * hex_width,
            v_spacing: hex_height,
        })
    }

    pub fn pixels_per_mile(&self) -> f64 {
        self.pixels_per_mile
    }

    pub fn hex_miles(&self) -> f64 {
        self.hex_miles
    }

    /// Distance across a hex, from one vertex to the opposite vertex, in
    /// pixels.
    pub fn hex_diameter(&self) -> f64 {
        self.hex_width
    }

    /// Distance from the center of a hex to any of its vertices. This is also
    /// the length of one side.
    pub fn hex_radius(&self) -> f64 {
        self.hex_radius
    }

    /// Width of a hex, vertex to vertex. Same as [Self::hex_diameter].
    pub fn hex_width(&self) -> f64 {
        self.hex_width
    }

    /// Height of a hex, flat side to flat side.
    pub fn hex_height(&self) -> f64 {
        self.hex_height
    }

    /// Horizontal distance between the centers of adjacent columns.
    pub fn h_spacing(&self) -> f64 {
        self.h_spacing
    }

    /// Vertical distance between the centers of adjacent rows.
    pub fn v_spacing(&self) -> f64 {
        self.v_spacing
    }
}

/// One cell of the lattice. Hexes are cheap, derived values: they're
/// recomputed from the grid parameters every time they're needed and never
/// stored long-term.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Hex {
    pub row: u32,
    pub col: u32,
    /// Center of the hex, with the odd-column shift already applied
    pub center: Point2,
    /// Was this hex pushed down half a hex height? True for odd columns.
    pub shifted: bool,
}

impl Hex {
    /// Get the six vertices of this hex, in canonical order
    pub fn vertices(&self, params: &GridParams) -> HexVertices {
        hex_vertices(self.center, params.hex_radius())
    }
}

/// The full lattice of hexes covering a `width × height` image. The grid
/// doesn't store any hexes, it just knows the lattice bounds and computes
/// hexes on demand.
#[derive(Copy, Clone, Debug)]
pub struct HexGrid {
    params: GridParams,
    rows: u32,
    cols: u32,
}

impl HexGrid {
    /// Upper bound on the number of rows or columns in a lattice
    pub const MAX_STEPS: u32 = 1 << 20;
    /// Upper bound on the total number of hexes in a lattice
    pub const MAX_HEXES: u64 = 1 << 26;

    /// Lay out a grid over an image. An empty image (either dimension zero)
    /// gets an empty grid. Returns an error if the hexes are so small
    /// relative to the image that the lattice would be absurdly large.
    pub fn new(
        params: GridParams,
        width: u32,
        height: u32,
    ) -> Result<Self, InvalidParameter> {
        if width == 0 || height == 0 {
            return Ok(Self {
                params,
                rows: 0,
                cols: 0,
            });
        }

        let rows = Self::steps(params.v_spacing(), height as f64)?;
        let cols = Self::steps(params.h_spacing(), width as f64)?;
        let total = rows as u64 * cols as u64;
        if total > Self::MAX_HEXES {
            return Err(InvalidParameter::new(
                "hex_diameter",
                format!(
                    "{} px hexes need {}x{} = {} hexes to cover a {}x{} image \
                    (limit is {})",
                    params.hex_diameter(),
                    rows,
                    cols,
                    total,
                    width,
                    height,
                    Self::MAX_HEXES
                ),
            ));
        }

        Ok(Self { params, rows, cols })
    }

    /// Count the positions `k * pitch` (for `k = 0, 1, ...`) that fall
    /// before `extent + pitch`. The last position is always at or past the
    /// edge, which gives the one-pitch margin.
    fn steps(pitch: f64, extent: f64) -> Result<u32, InvalidParameter> {
        let estimate = extent / pitch + 1.0;
        if estimate > Self::MAX_STEPS as f64 {
            return Err(InvalidParameter::new(
                "hex_diameter",
                format!(
                    "{} px hex pitch needs ~{} hexes to span {} px \
                    (limit is {})",
                    pitch,
                    estimate.ceil(),
                    extent,
                    Self::MAX_STEPS
                ),
            ));
        }

        // Count with the same multiplication that positions hexes, so the
        // two can't disagree at the edge
        let mut count = 0;
        while pitch * (count as f64) < extent + pitch {
            count += 1;
        }
        Ok(count)
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Number of rows in the lattice, i.e. the max row index plus one
    pub fn row_count(&self) -> u32 {
        self.rows
    }

    /// The max column index in the lattice. **Not** the number of columns,
    /// which is one more than this. Labels are centered on half of this
    /// value. Zero for an empty grid.
    pub fn col_count(&self) -> u32 {
        self.cols.saturating_sub(1)
    }

    /// Number of hexes in each row
    pub fn row_len(&self) -> u32 {
        self.cols
    }

    /// Total number of hexes in the lattice
    pub fn len(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the hex at a particular position. Doesn't check that the position
    /// is within the lattice bounds.
    pub fn hex(&self, row: u32, col: u32) -> Hex {
        let shifted = col % 2 == 1;
        let y_offset = if shifted {
            self.params.hex_height() / 2.0
        } else {
            0.0
        };
        Hex {
            row,
            col,
            center: Point2::new(
                col as f64 * self.params.h_spacing(),
                row as f64 * self.params.v_spacing() + y_offset,
            ),
            shifted,
        }
    }

    /// Iterate over the hexes in a single row, left to right. Rows don't
    /// depend on each other, so this is the place to split up work on huge
    /// images.
    pub fn row(&self, row: u32) -> impl Iterator<Item = Hex> + '_ {
        (0..self.cols).map(move |col| self.hex(row, col))
    }

    /// Iterate over every hex in the lattice, row by row
    pub fn hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        (0..self.rows).flat_map(move |row| self.row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn params(pixels_per_mile: f64, hex_miles: f64) -> GridParams {
        GridParams::new(pixels_per_mile, hex_miles).unwrap()
    }

    #[test]
    fn test_derived_spacing() {
        let params = params(10.0, 1.0);
        assert_approx_eq!(params.hex_diameter(), 10.0);
        assert_approx_eq!(params.hex_radius(), 5.0);
        assert_approx_eq!(params.hex_width(), 10.0);
        assert_approx_eq!(params.hex_height(), 5.0 * 3.0_f64.sqrt());
        assert_approx_eq!(params.h_spacing(), 7.5);
        assert_approx_eq!(params.v_spacing(), params.hex_height());
    }

    #[test]
    fn test_invalid_params() {
        assert_eq!(
            GridParams::new(0.0, 6.0).unwrap_err().name,
            "pixels_per_mile"
        );
        assert_eq!(
            GridParams::new(-3.0, 6.0).unwrap_err().name,
            "pixels_per_mile"
        );
        assert_eq!(GridParams::new(22.0, 0.0).unwrap_err().name, "hex_miles");
        assert_eq!(
            GridParams::new(22.0, f64::NAN).unwrap_err().name,
            "hex_miles"
        );
        assert_eq!(
            GridParams::new(f64::INFINITY, 1.0).unwrap_err().name,
            "pixels_per_mile"
        );
        // Each is fine alone, but the product overflows
        assert!(GridParams::new(1e200, 1e200).is_err());
    }

    #[test]
    fn test_lattice_too_large() {
        let params = params(1e-6, 1e-6);
        let err = HexGrid::new(params, 4000, 3000).unwrap_err();
        assert_eq!(err.name, "hex_diameter");
    }

    #[test]
    fn test_lattice_too_many_hexes() {
        // Each axis is under the step limit, but together they're way over
        let params = params(1e-3, 1.0);
        assert!(HexGrid::steps(params.h_spacing(), 700.0).unwrap() > 900_000);
        assert!(HexGrid::steps(params.v_spacing(), 700.0).unwrap() > 800_000);
        let err = HexGrid::new(params, 700, 700).unwrap_err();
        assert_eq!(err.name, "hex_diameter");

        // A big map with small hexes is still fine
        let big_map = GridParams::new(1.0, 5.0).unwrap();
        let grid = HexGrid::new(big_map, 20_000, 20_000).unwrap();
        assert!(grid.len() as u64 <= HexGrid::MAX_HEXES);
    }

    #[test]
    fn test_empty_image() {
        let params = params(10.0, 1.0);
        for (width, height) in &[(0, 0), (0, 100), (100, 0)] {
            let grid = HexGrid::new(params, *width, *height).unwrap();
            assert!(grid.is_empty());
            assert_eq!(grid.hexes().count(), 0);
            assert_eq!(grid.row_count(), 0);
            assert_eq!(grid.col_count(), 0);
        }
    }

    #[test]
    fn test_lattice_bounds() {
        // h_spacing = 7.5, v_spacing = 8.66
        let grid = HexGrid::new(params(10.0, 1.0), 100, 100).unwrap();
        let h_spacing = grid.params().h_spacing();
        let v_spacing = grid.params().v_spacing();

        // Last column/row must be at or past the edge, but by less than a
        // full pitch
        let last_x = grid.col_count() as f64 * h_spacing;
        assert!(last_x >= 100.0, "last column at {}", last_x);
        assert!(last_x < 100.0 + h_spacing, "last column at {}", last_x);
        let last_y = (grid.row_count() - 1) as f64 * v_spacing;
        assert!(last_y >= 100.0, "last row at {}", last_y);
        assert!(last_y < 100.0 + v_spacing, "last row at {}", last_y);

        assert_eq!(grid.col_count(), 14);
        assert_eq!(grid.row_len(), 15);
        assert_eq!(grid.row_count(), 13);
        assert_eq!(grid.len(), 15 * 13);
        assert_eq!(grid.hexes().count(), grid.len());
    }

    #[test]
    fn test_enumeration_order() {
        let grid = HexGrid::new(params(10.0, 1.0), 20, 20).unwrap();
        let positions: Vec<(u32, u32)> =
            grid.hexes().map(|hex| (hex.row, hex.col)).collect();
        let cols = grid.row_len();
        assert_eq!(positions[0], (0, 0));
        assert_eq!(positions[1], (0, 1));
        assert_eq!(positions[cols as usize], (1, 0));
        assert_eq!(grid.row(1).count(), cols as usize);
    }

    #[test]
    fn test_column_parity_shift() {
        let grid = HexGrid::new(params(10.0, 1.0), 100, 100).unwrap();
        let half_height = grid.params().hex_height() / 2.0;

        let even = grid.hex(2, 4);
        assert!(!even.shifted);
        assert_approx_eq!(even.center.x, 30.0);
        assert_approx_eq!(even.center.y, 2.0 * grid.params().v_spacing());

        let odd = grid.hex(2, 5);
        assert!(odd.shifted);
        assert_approx_eq!(odd.center.x, 37.5);
        assert_approx_eq!(odd.center.y, even.center.y + half_height);
    }

    /// Adjacent hexes should share edges exactly: no gaps, no overlaps. Two
    /// neighbors share an edge iff they share two vertices.
    #[test]
    fn test_neighbors_share_edges() {
        let grid = HexGrid::new(params(10.0, 1.0), 100, 100).unwrap();
        let params = *grid.params();
        let shared = |a: Hex, b: Hex| {
            let va = a.vertices(&params);
            let vb = b.vertices(&params);
            va.iter()
                .filter(|p| vb.iter().any(|q| p.distance_to(*q) < 1e-9))
                .count()
        };

        // Even column: same-row neighbor to the right is its lower-right
        assert_eq!(shared(grid.hex(3, 2), grid.hex(3, 3)), 2);
        assert_eq!(shared(grid.hex(3, 2), grid.hex(2, 3)), 2);
        // Odd column: same-row neighbor to the right is its upper-right
        assert_eq!(shared(grid.hex(3, 3), grid.hex(3, 4)), 2);
        assert_eq!(shared(grid.hex(3, 3), grid.hex(4, 4)), 2);
        // Vertical neighbors
        assert_eq!(shared(grid.hex(3, 3), grid.hex(4, 3)), 2);
        // Not neighbors
        assert_eq!(shared(grid.hex(3, 2), grid.hex(4, 3)), 0);
        assert_eq!(shared(grid.hex(3, 2), grid.hex(5, 2)), 0);
    }
}
