use anyhow::{anyhow, Context};
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use resvg::usvg;
use std::{io::Cursor, path::Path};
use tiny_skia::{Pixmap, Transform};

/// Rasterize an SVG overlay into an RGBA image. The SVG's user space is
/// mapped 1:1 onto pixels, so the document should already be sized to
/// `width × height`.
pub fn rasterize(
    svg: &str,
    width: u32,
    height: u32,
) -> anyhow::Result<RgbaImage> {
    let mut options = usvg::Options::default();
    // Needed for labels, otherwise text silently renders as nothing
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)
        .context("error parsing SVG overlay")?;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        anyhow!("error allocating {}x{} overlay", width, height)
    })?;
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha, image wants straight alpha
    let mut overlay = RgbaImage::new(width, height);
    for (pixel, color) in overlay.pixels_mut().zip(pixmap.pixels()) {
        let color = color.demultiply();
        *pixel =
            Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    Ok(overlay)
}

/// Alpha-composite an overlay onto the top-left corner of an image
pub fn composite(image: &DynamicImage, overlay: &RgbaImage) -> RgbaImage {
    let mut output = image.to_rgba8();
    imageops::overlay(&mut output, overlay, 0, 0);
    output
}

/// Encode a composited image in the format matching the output file's
/// extension. If the format can't store alpha, or the source image never had
/// any, the alpha channel is dropped.
pub fn encode(
    output: RgbaImage,
    keep_alpha: bool,
    path: &Path,
) -> anyhow::Result<Vec<u8>> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("unknown image format for {:?}", path))?;
    let mut output = DynamicImage::ImageRgba8(output);
    if !(keep_alpha && supports_alpha(format)) {
        output = DynamicImage::ImageRgb8(output.to_rgb8());
    }

    let mut bytes = Cursor::new(Vec::new());
    output
        .write_to(&mut bytes, format)
        .with_context(|| format!("error encoding {:?} image", format))?;
    Ok(bytes.into_inner())
}

fn supports_alpha(format: ImageFormat) -> bool {
    !matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Pnm | ImageFormat::Farbfeld
    )
}
