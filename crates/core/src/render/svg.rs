use crate::{
    geometry::Point2,
    render::{color::Color, Surface},
};
use std::{fmt, mem};
use svg::{
    node::{
        element::{Polygon, Text},
        Node,
    },
    Document,
};

/// A [Surface] that builds an SVG document. The document has the same pixel
/// dimensions as the image the overlay is meant for, with a transparent
/// background, so it can be layered directly on top of the image.
pub struct SvgSurface {
    document: Document,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let document = Document::new()
            .set("xmlns", "http://www.w3.org/2000/svg")
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0, 0, width, height));
        Self { document }
    }

    /// Get the finished document
    pub fn into_document(self) -> Document {
        self.document
    }

    fn add(&mut self, node: impl Node) {
        // The svg API only adds nodes by value
        let document = mem::replace(&mut self.document, Document::new());
        self.document = document.add(node);
    }
}

impl Surface for SvgSurface {
    fn stroke_polygon(
        &mut self,
        vertices: &[Point2],
        color: Color,
        line_width: f64,
    ) {
        let points = vertices
            .iter()
            .map(|vertex| (vertex.x, vertex.y))
            .collect::<Vec<_>>();
        self.add(
            Polygon::new()
                .set("points", points)
                .set("fill", "none")
                .set("stroke", color.to_html_rgb())
                .set("stroke-opacity", color.opacity())
                .set("stroke-width", line_width),
        );
    }

    fn fill_text(
        &mut self,
        position: Point2,
        text: &str,
        color: Color,
        font_size: f64,
    ) {
        self.add(
            Text::new()
                .set("x", position.x)
                .set("y", position.y)
                .set("text-anchor", "middle")
                .set("dominant-baseline", "central")
                .set("font-family", "sans-serif")
                .set("font-size", font_size)
                .set("fill", color.to_html_rgb())
                .set("fill-opacity", color.opacity())
                .add(svg::node::Text::new(text)),
        );
    }
}

impl fmt::Display for SvgSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)
    }
}
