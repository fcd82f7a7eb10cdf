mod raster;

use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use hexcrawl::{
    hex_records_to_json, timed, Color, Mask, OverlayConfig, OverlayRenderer,
};
use image::DynamicImage;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for overlaying a hex grid onto a map image, at the map's real scale.
#[derive(Debug, StructOpt)]
#[structopt(name = "hexcrawl")]
struct Opt {
    /// Path to the map image to draw the grid over
    #[structopt(parse(from_os_str))]
    image: PathBuf,

    /// Path to a config file that defines the overlay, including any mask
    /// regions. Supported formats: JSON, TOML. Command line flags take
    /// precedence over the file.
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Map scale, in pixels per mile [default: 22.56]
    #[structopt(long)]
    ppm: Option<f64>,

    /// Size of each hex in miles, measured vertex to opposite vertex
    /// [default: 6.0]
    #[structopt(long)]
    hex_miles: Option<f64>,

    /// Color of hex outlines, as a name (black, white, red, ...) or a hex
    /// code (#rgb, #rrggbb, #rrggbbaa). Invalid colors fall back to black
    /// [default: black]
    #[structopt(long)]
    outline: Option<String>,

    /// Write axial coordinate labels in the middle of each hex
    #[structopt(long)]
    labels: bool,

    /// Where to write the output. Defaults to `<name>_hexed.<ext>` next to
    /// the input image. Non-image formats replace the extension with their
    /// own. See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the overlay in. Supported formats:
    ///
    /// image - The input image with the grid drawn over it (default)
    ///
    /// svg - The grid alone, as an SVG the same size as the image
    ///
    /// json - Position, mask status and label of every hex in the grid
    ///
    /// cfg - The full config used for the overlay, in TOML format
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// Just print how many hexes the grid would have, then exit. Only reads
    /// the image header.
    #[structopt(long)]
    dry_run: bool,

    /// The logging level to use. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// The source image with the overlay composited on top
    Image,
    /// Just the overlay, as a vector image
    Svg,
    /// Metadata for every hex in the grid
    Json,
    /// Export the overlay's full config in a human-readable file
    Cfg,
    /* If you change this, make sure to update the help text for
     * `--output-formats`! */
}

impl OutputFormat {
    /// File extension for this format. `None` means the output keeps the
    /// extension it was given, i.e. the image's own format.
    fn file_ext(self) -> Option<&'static str> {
        match self {
            Self::Image => None,
            Self::Svg => Some("svg"),
            Self::Json => Some("json"),
            Self::Cfg => Some("toml"),
        }
    }

    fn output_path(self, base: &Path) -> PathBuf {
        match self.file_ext() {
            None => base.to_owned(),
            Some(ext) => base.with_extension(ext),
        }
    }
}

/// The input image, plus everything needed to draw on it
struct Overlay {
    image: DynamicImage,
    renderer: OverlayRenderer,
    mask: Mask,
}

fn load_config(config_path: &Path) -> anyhow::Result<OverlayConfig> {
    // Load config
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Build the overlay config from the config file (if any) and the command
/// line flags. Flags win.
fn build_config(opt: &Opt) -> anyhow::Result<OverlayConfig> {
    let mut config = match &opt.config {
        Some(config_path) => load_config(config_path)?,
        None => OverlayConfig::default(),
    };
    if let Some(ppm) = opt.ppm {
        config.grid.pixels_per_mile = ppm;
    }
    if let Some(hex_miles) = opt.hex_miles {
        config.grid.hex_miles = hex_miles;
    }
    if let Some(outline) = &opt.outline {
        config.grid.outline = Color::parse_or_default(outline);
    }
    if opt.labels {
        config.label.enabled = true;
    }
    Ok(config)
}

/// Default output location: `<stem>_hexed.<ext>` next to the input
fn default_output_path(image_path: &Path) -> anyhow::Result<PathBuf> {
    let stem = image_path
        .file_stem()
        .ok_or_else(|| anyhow!("invalid image path {:?}", image_path))?;
    let mut file_name = stem.to_owned();
    file_name.push("_hexed");
    let mut output_path = image_path.with_file_name(file_name);
    if let Some(ext) = image_path.extension() {
        output_path.set_extension(ext);
    }
    Ok(output_path)
}

/// Generate an output form of the overlay in the given format.
fn gen_output(
    output_path: &Path,
    output_format: OutputFormat,
    overlay: &Overlay,
) -> anyhow::Result<()> {
    fn generate_bytes(
        output_path: &Path,
        output_format: OutputFormat,
        overlay: &Overlay,
    ) -> anyhow::Result<Vec<u8>> {
        let image = &overlay.image;
        let (width, height) = (image.width(), image.height());
        let renderer = &overlay.renderer;
        Ok(match output_format {
            OutputFormat::Image => {
                // Rasterize the grid and draw it over the source image
                let svg = renderer
                    .render_as_svg(width, height, &overlay.mask)?
                    .to_string();
                let layer = timed!(
                    "Rasterizing overlay",
                    raster::rasterize(&svg, width, height)?
                );
                let output = raster::composite(image, &layer);
                raster::encode(output, image.color().has_alpha(), output_path)?
            }
            OutputFormat::Svg => {
                // Render just the grid in 2D
                renderer
                    .render_as_svg(width, height, &overlay.mask)?
                    .to_string()
                    .into_bytes()
            }
            OutputFormat::Json => {
                let records =
                    renderer.survey(width, height, &overlay.mask)?;
                hex_records_to_json(&records)?.into_bytes()
            }
            OutputFormat::Cfg => {
                // Serialize just the config via toml
                toml::to_string_pretty(renderer.config())
                    .context("error serializing config")?
                    .into_bytes()
            }
        })
    }

    timed!(
        format!(
            "Generating {} output and writing to {:?}",
            output_format, output_path
        ),
        log::Level::Info,
        {
            let bytes = generate_bytes(output_path, output_format, overlay)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(output_path)
                .with_context(|| {
                    format!("error opening output file {:?}", output_path)
                })?;
            file.write_all(&bytes).with_context(|| {
                format!("error writing to file {:?}", output_path)
            })?;
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let config = build_config(&opt)?;
    let mask = config.mask_book()?.mask();
    let renderer =
        OverlayRenderer::new(config).context("invalid overlay config")?;

    if opt.dry_run {
        // Only the header is needed to count hexes
        let (width, height) = image::image_dimensions(&opt.image)
            .with_context(|| format!("error reading image {:?}", opt.image))?;
        let grid = renderer.grid(width, height)?;
        println!(
            "{} hexes ({} rows x {} columns) over {}x{} image",
            grid.len(),
            grid.row_count(),
            grid.row_len(),
            width,
            height
        );
        return Ok(());
    }

    let image = timed!(
        format!("Loading {:?}", opt.image),
        image::open(&opt.image)
            .with_context(|| format!("error loading image {:?}", opt.image))?
    );
    info!(
        "Loaded {}x{} image from {:?}",
        image.width(),
        image.height(),
        opt.image
    );

    let output_base = match &opt.output {
        Some(output_path) => output_path.clone(),
        None => default_output_path(&opt.image)?,
    };
    if output_base == opt.image {
        bail!("refusing to overwrite input image {:?}", opt.image);
    }
    if let Some(parent) = output_base.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let output_formats = if opt.output_formats.is_empty() {
        vec![OutputFormat::Image]
    } else {
        opt.output_formats
    };
    let overlay = Overlay {
        image,
        renderer,
        mask,
    };
    for output_format in output_formats {
        let output_path = output_format.output_path(&output_base);
        gen_output(&output_path, output_format, &overlay)?;
        println!("Wrote {}", output_path.display());
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
