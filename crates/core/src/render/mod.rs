pub mod color;
#[cfg(feature = "svg")]
pub mod svg;

use crate::{
    config::OverlayConfig,
    geometry::Point2,
    grid::{GridParams, Hex, HexGrid},
    label::{HexLabel, Labeler},
    mask::Mask,
    render::color::Color,
    timed,
};
use anyhow::Context;
use log::info;
use serde::Serialize;
use validator::Validate;

/// Something that hex outlines and labels can be drawn onto. The renderer
/// only ever describes *what* to draw, in pixel space, so a surface can be a
/// canvas, a vector document, or just a recording for tests.
pub trait Surface {
    /// Draw the outline of a closed polygon. The path runs through the
    /// vertices in order and closes back to the first one.
    fn stroke_polygon(
        &mut self,
        vertices: &[Point2],
        color: Color,
        line_width: f64,
    );

    /// Draw text centered (horizontally and vertically) on a point
    fn fill_text(
        &mut self,
        position: Point2,
        text: &str,
        color: Color,
        font_size: f64,
    );
}

/// Summary of a single render pass
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Number of hexes in the lattice
    pub total: usize,
    /// Number of hexes that made it through the mask, i.e. were drawn
    pub accepted: usize,
}

/// Metadata for one hex of the lattice, for callers that want to know about
/// the grid without drawing it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HexRecord {
    pub row: u32,
    pub col: u32,
    /// X coordinate of the hex center, in pixels
    pub x: f64,
    /// Y coordinate of the hex center, in pixels
    pub y: f64,
    /// Did the hex pass the mask?
    pub accepted: bool,
    /// Coordinate label, for accepted hexes only
    pub label: Option<String>,
}

/// An overlay renderer draws a hex grid over an image of a particular size.
/// A renderer is created using a particular [OverlayConfig], and from there
/// can be used to render any number of images any number of times.
///
/// Rendering is a pure function of the image dimensions, the config and the
/// mask. The renderer holds no state between calls, so rendering the same
/// inputs twice always draws the same hexes and labels.
///
/// Config options cannot be changed after creating a renderer, but renderers
/// are very cheap to create so if you need to change the config, just create
/// a new renderer.
#[derive(Clone, Debug)]
pub struct OverlayRenderer {
    config: OverlayConfig,
    params: GridParams,
}

impl OverlayRenderer {
    /// Outline width for every hex, in pixels
    pub const LINE_WIDTH: f64 = 1.0;

    /// Initialize a new renderer with the given options. Returns an error if
    /// the config is invalid.
    pub fn new(config: OverlayConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let params = config
            .grid
            .params()
            .context("error computing grid spacing")?;
        Ok(Self { config, params })
    }

    /// Get a reference to the config that this renderer uses
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Get the grid spacing that this renderer lays hexes out with
    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Lay out the lattice for an image of the given size
    pub fn grid(&self, width: u32, height: u32) -> anyhow::Result<HexGrid> {
        HexGrid::new(self.params, width, height).with_context(|| {
            format!("error laying out grid for {}x{} image", width, height)
        })
    }

    /// Draw the overlay for a `width × height` image onto a surface. Every
    /// hex that the mask accepts gets its outline stroked, and if labels are
    /// enabled, its coordinate label written at its center. Hexes are drawn
    /// independently, so edges shared by two hexes get drawn twice.
    pub fn render(
        &self,
        width: u32,
        height: u32,
        mask: &Mask,
        surface: &mut impl Surface,
    ) -> anyhow::Result<RenderStats> {
        let outline = self.config.grid.outline;
        let label_config = self.config.label;
        let stats = timed!(
            "Overlay render",
            self.visit(width, height, mask, |hex, label| {
                if let Some(label) = label {
                    surface.stroke_polygon(
                        &hex.vertices(&self.params),
                        outline,
                        Self::LINE_WIDTH,
                    );
                    if label_config.enabled {
                        surface.fill_text(
                            hex.center,
                            &label.to_string(),
                            label_config.color,
                            label_config.font_size,
                        );
                    }
                }
            })?
        );

        info!(
            "Rendered {}/{} hexes over {}x{} image",
            stats.accepted, stats.total, width, height
        );
        Ok(stats)
    }

    /// Compute metadata for every hex in the lattice, without drawing
    /// anything. Records are in row-major order.
    pub fn survey(
        &self,
        width: u32,
        height: u32,
        mask: &Mask,
    ) -> anyhow::Result<Vec<HexRecord>> {
        let mut records = Vec::new();
        self.visit(width, height, mask, |hex, label| {
            records.push(HexRecord {
                row: hex.row,
                col: hex.col,
                x: hex.center.x,
                y: hex.center.y,
                accepted: label.is_some(),
                label: label.map(|label| label.to_string()),
            })
        })?;
        Ok(records)
    }

    /// Render the overlay as a standalone SVG document, sized to match the
    /// image it goes over
    #[cfg(feature = "svg")]
    pub fn render_as_svg(
        &self,
        width: u32,
        height: u32,
        mask: &Mask,
    ) -> anyhow::Result<self::svg::SvgSurface> {
        let mut surface = self::svg::SvgSurface::new(width, height);
        self.render(width, height, mask, &mut surface)?;
        Ok(surface)
    }

    /// Enumerate the lattice once, passing each hex to the visitor along with
    /// its label. The label is `None` iff the mask rejected the hex. Strokes,
    /// labels and metadata all come from this one pass, so they can't
    /// disagree about where a hex is.
    fn visit(
        &self,
        width: u32,
        height: u32,
        mask: &Mask,
        mut visitor: impl FnMut(&Hex, Option<HexLabel>),
    ) -> anyhow::Result<RenderStats> {
        let grid = self.grid(width, height)?;
        let labeler = Labeler::for_grid(&grid);
        let mut stats = RenderStats {
            total: grid.len(),
            accepted: 0,
        };

        for hex in grid.hexes() {
            if mask.accepts_hex(&hex, &self.params) {
                stats.accepted += 1;
                visitor(&hex, Some(labeler.label(&hex)));
            } else {
                visitor(&hex, None);
            }
        }

        Ok(stats)
    }
}

/// Serialize hex metadata (see [OverlayRenderer::survey]) as pretty JSON
#[cfg(feature = "json")]
pub fn hex_records_to_json(records: &[HexRecord]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
