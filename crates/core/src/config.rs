use crate::{
    geometry::{InvalidParameter, Point2},
    grid::GridParams,
    mask::MaskBook,
    render::color::Color,
    util::is_positive_finite,
};
use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// Configuration that defines an overlay. Two renders of the same image with
/// the same config will always be identical.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OverlayConfig {
    /// Scale and appearance of the grid itself
    #[validate]
    pub grid: GridConfig,

    /// Config for the coordinate labels written on each hex
    #[validate]
    pub label: LabelConfig,

    /// Mask polygons, in the order they were drawn. Every region knocks hexes
    /// out of the grid, and selected regions put hexes back in. See
    /// [MaskBook] for how the two interact.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<RegionConfig>,
}

/// Configuration for the scale and look of the hex grid.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Map scale: how many pixels of the image make up one mile. Must be
    /// finite and greater than zero.
    pub pixels_per_mile: f64,

    /// Size of each hex, in miles. This is the distance across the hex from
    /// one vertex to the opposite vertex. Must be finite and greater than
    /// zero.
    pub hex_miles: f64,

    /// Color of the hex outlines
    pub outline: Color,
}

/// Configuration for hex coordinate labels. Labels are axial `q,r` pairs,
/// centered on the middle of the grid. See [crate::Labeler].
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Should labels be drawn at all?
    pub enabled: bool,

    /// Text color for labels
    pub color: Color,

    /// Font size for labels, in pixels. Must be finite and at least 1.
    pub font_size: f64,
}

/// A single mask polygon, as loaded from a config file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Selected regions re-include hexes inside them
    pub selected: bool,

    /// Boundary of the region, in pixel space. Regions with fewer than 3
    /// points are ignored.
    pub points: Vec<Point2>,
}

impl OverlayConfig {
    /// Load all the configured regions into a fresh [MaskBook]. Regions that
    /// don't have enough points to enclose any area are skipped with a
    /// warning. Returns an error if any point isn't finite.
    pub fn mask_book(&self) -> anyhow::Result<MaskBook> {
        let mut book = MaskBook::new();
        for (i, region) in self.regions.iter().enumerate() {
            let id = book
                .add_polygon(region.points.iter().copied())
                .with_context(|| format!("invalid region {}", i))?;
            match id {
                Some(id) if region.selected => {
                    book.toggle_selected(id);
                }
                Some(_) => {}
                None => warn!(
                    "Skipping region {}: {} point(s) isn't enough for a \
                    polygon",
                    i,
                    region.points.len()
                ),
            }
        }
        Ok(book)
    }
}

impl GridConfig {
    /// Compute the grid spacing for this config
    pub fn params(&self) -> Result<GridParams, InvalidParameter> {
        GridParams::new(self.pixels_per_mile, self.hex_miles)
    }
}

/// Scale values have to be checked for NaN/infinity as well as range, which
/// the derive can't express, so this is implemented by hand. Each bad field
/// gets an `invalid_parameter` error.
impl Validate for GridConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("pixels_per_mile", self.pixels_per_mile),
            ("hex_miles", self.hex_miles),
        ] {
            if !is_positive_finite(value) {
                let message = "must be finite and greater than 0";
                errors.add(field, invalid_parameter(message, value));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Same deal as [GridConfig]: a plain range check would let NaN and infinity
/// through.
impl Validate for LabelConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if !(self.font_size.is_finite() && self.font_size >= 1.0) {
            let message = "must be finite and at least 1";
            errors.add("font_size", invalid_parameter(message, self.font_size));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn invalid_parameter(message: &'static str, value: f64) -> ValidationError {
    let mut error = ValidationError::new("invalid_parameter");
    error.message = Some(Cow::Borrowed(message));
    error.add_param(Cow::Borrowed("value"), &value.to_string());
    error
}

impl Default for GridConfig {
    fn default() -> Self {
        // Scale of the first map this was built for. 6-mile hexes are the
        // usual size for a hexcrawl.
        Self {
            pixels_per_mile: 22.56,
            hex_miles: 6.0,
            outline: Color::BLACK,
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            font_size: 10.0,
        }
    }
}
