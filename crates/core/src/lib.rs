//! Hexcrawl overlays a regular flat-top hex grid onto a raster map at a real
//! world scale (pixels per mile, hex size in miles). Hexes can be masked out
//! of regions of the map with arbitrary polygons, and re-included with more
//! polygons (carve a lake out of the grid, then put an island back in). This
//! crate holds all of the grid geometry. Image decoding and encoding live in
//! the CLI crate.
//!
//! ```
//! use hexcrawl::{Mask, OverlayConfig, OverlayRenderer};
//!
//! let renderer = OverlayRenderer::new(OverlayConfig::default()).unwrap();
//! let records = renderer.survey(1024, 768, &Mask::default()).unwrap();
//! println!("{} hexes", records.len());
//! ```
//!
//! See [OverlayConfig] for details on how the overlay can be customized.

mod config;
mod geometry;
mod grid;
mod label;
mod mask;
mod render;
mod util;

pub use crate::{
    config::{GridConfig, LabelConfig, OverlayConfig, RegionConfig},
    geometry::{
        hex_vertices, point_in_polygon, HexVertices, InvalidParameter,
        Point2, Polygon,
    },
    grid::{GridParams, Hex, HexGrid},
    label::{HexLabel, Labeler},
    mask::{Mask, MaskBook, PolygonId},
    render::{
        color::{Color, NamedColor},
        HexRecord, OverlayRenderer, RenderStats, Surface,
    },
};

#[cfg(feature = "svg")]
pub use crate::render::svg::SvgSurface;

#[cfg(feature = "json")]
pub use crate::render::hex_records_to_json;
