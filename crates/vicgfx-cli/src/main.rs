//! vicgfx - Convert images to and from VIC-II bitmap formats
//!
//! A command-line tool for turning PNG images into Koala or Hires program files and back.

mod prg;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};
use vicgfx::{
    decode_hires, decode_koala, render_clashes, IndexedImage, Layout, Mode, PaletteCatalog,
    Picture, PixelGrid, PixelSource, VicError,
};

const PALETTE_CONFIG: &str = ".config/vic-palettes.json";

#[derive(Parser)]
#[command(name = "vicgfx")]
#[command(version)]
#[command(about = "Convert images to and from VIC-II bitmap formats", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON file with additional palettes (default: ~/.config/vic-palettes.json)
    #[arg(long, global = true)]
    palettes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// 160×200 with 4 colors per 4×8 cell (Koala)
    Multicolor,
    /// 320×200 with 2 colors per 8×8 cell
    Hires,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Multicolor => Mode::Multicolor,
            ModeArg::Hires => Mode::Hires,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an image to a Koala or Hires program file
    Encode {
        /// Input image file (PNG or GIF)
        input: PathBuf,

        /// Output file (default: input with .kla or .hir extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bitmap mode
        #[arg(short, long, value_enum, default_value = "multicolor")]
        mode: ModeArg,

        /// Background color for multicolor mode (0-15)
        #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..16))]
        background: u8,

        /// Pad the segments to 1 KiB boundaries
        #[arg(long)]
        align: bool,

        /// Write screen and color data before the bitmap
        #[arg(long)]
        metadata_first: bool,

        /// Horizontal offset into the image in logical pixels
        #[arg(short = 'x', long, default_value_t = 0, allow_negative_numbers = true)]
        x_offset: i32,

        /// Vertical offset into the image in pixels
        #[arg(short = 'y', long, default_value_t = 0, allow_negative_numbers = true)]
        y_offset: i32,

        /// Load address written in front of the data ($4000, 0x4000 or decimal)
        #[arg(short, long, default_value = "$4000", value_parser = prg::parse_address)]
        address: u16,

        /// Palette to map the image with (default: best match)
        #[arg(short, long)]
        palette: Option<String>,

        /// Write a PNG marking the cells with too many colors
        #[arg(long)]
        clashes: Option<PathBuf>,

        /// Fail when any cell has too many colors
        #[arg(long)]
        strict: bool,
    },

    /// Decode a Koala or Hires program file to PNG
    Decode {
        /// Input program file
        input: PathBuf,

        /// Output PNG file (default: input with .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bitmap mode
        #[arg(short, long, value_enum, default_value = "multicolor")]
        mode: ModeArg,

        /// Palette to render with
        #[arg(short, long, default_value = "pepto")]
        palette: String,

        /// Segments are padded to 1 KiB boundaries
        #[arg(long)]
        align: bool,

        /// Screen and color data come before the bitmap
        #[arg(long)]
        metadata_first: bool,
    },

    /// List the known palettes
    Palettes,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_catalog(path: Option<&Path>) -> Result<PaletteCatalog, VicError> {
    let mut catalog = PaletteCatalog::builtin();
    match path {
        Some(path) => {
            catalog.load_file(path)?;
        }
        None => {
            if let Some(home) = std::env::var_os("HOME") {
                let default = Path::new(&home).join(PALETTE_CONFIG);
                if default.is_file() {
                    catalog.load_file(&default)?;
                }
            }
        }
    }
    Ok(catalog)
}

fn with_extension(input: &Path, extension: &str) -> PathBuf {
    let mut path = input.to_path_buf();
    path.set_extension(extension);
    path
}

fn write_rgb_png(
    path: &Path,
    width: usize,
    height: usize,
    rgb: Vec<u8>,
) -> Result<(), Box<dyn std::error::Error>> {
    let img = image::RgbImage::from_raw(width as u32, height as u32, rgb)
        .ok_or("Failed to create image from rendered data")?;
    img.save(path)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let catalog = load_catalog(cli.palettes.as_deref())?;

    match cli.command {
        Commands::Encode {
            input,
            output,
            mode,
            background,
            align,
            metadata_first,
            x_offset,
            y_offset,
            address,
            palette,
            clashes,
            strict,
        } => {
            let mode = Mode::from(mode);
            let img = image::open(&input)
                .map_err(|e| format!("Failed to open '{}': {}", input.display(), e))?;
            let rgb_img = img.to_rgb8();
            let (width, height) = rgb_img.dimensions();
            let image = IndexedImage::from_rgb(width as usize, height as usize, rgb_img.as_raw())?;

            let palette = match &palette {
                Some(name) => catalog.by_name(name),
                None => catalog.best_match(&image.colors_present()),
            };
            info!(
                "Encoding '{}' ({}x{}) as {} with palette {:?}",
                input.display(),
                width,
                height,
                mode,
                palette.name()
            );

            let grid = PixelGrid::from_indexed(&image, palette);
            let source = PixelSource::new(&grid, mode, background);
            let encoded = Picture::encode(&source, x_offset, y_offset);

            for clash in &encoded.clashes {
                warn!("{clash}");
            }
            if !encoded.is_clean() {
                warn!("{} cells have too many colors", encoded.clashes.len());
            }

            if let Some(path) = &clashes {
                let map = render_clashes(&source, x_offset, y_offset, &encoded.clashes, palette);
                match write_rgb_png(path, map.width, map.height, map.pixels) {
                    Ok(()) => info!("Clash map written to '{}'", path.display()),
                    Err(e) => warn!("Failed to write clash map '{}': {}", path.display(), e),
                }
            }

            if strict && !encoded.is_clean() {
                return Err(format!("{} cells have too many colors", encoded.clashes.len()).into());
            }

            let layout = Layout::new(align, metadata_first);
            let bytes = prg::with_load_address(address, &encoded.picture.to_bytes(&layout)?);
            let output_path = output.unwrap_or_else(|| {
                with_extension(
                    &input,
                    match mode {
                        Mode::Multicolor => "kla",
                        Mode::Hires => "hir",
                    },
                )
            });
            fs::write(&output_path, &bytes).map_err(|e| VicError::io(&output_path, e))?;

            eprintln!(
                "Written {} bytes to '{}' (load address ${:04X})",
                bytes.len(),
                output_path.display(),
                address
            );
        }

        Commands::Decode {
            input,
            output,
            mode,
            palette,
            align,
            metadata_first,
        } => {
            let data = fs::read(&input).map_err(|e| VicError::io(&input, e))?;
            let (address, payload) = prg::strip_load_address(&data)?;
            info!(
                "Decoding '{}' ({} bytes, load address ${:04X})",
                input.display(),
                payload.len(),
                address
            );

            let mode = Mode::from(mode);
            let picture = if align || metadata_first {
                Picture::from_bytes(payload, mode, &Layout::new(align, metadata_first))?
            } else {
                match mode {
                    Mode::Multicolor => Picture::Koala(decode_koala(payload)?),
                    Mode::Hires => Picture::Hires(decode_hires(payload)?),
                }
            };

            let grid = picture.to_pixel_grid()?;
            let rgb = grid.to_rgb(catalog.by_name(&palette));
            let output_path = output.unwrap_or_else(|| with_extension(&input, "png"));
            write_rgb_png(&output_path, grid.width(), grid.height(), rgb)?;

            eprintln!(
                "Decoded: {}x{} pixels -> '{}'",
                grid.width(),
                grid.height(),
                output_path.display()
            );
        }

        Commands::Palettes => {
            for palette in catalog.iter() {
                println!("{}: {}", palette.name(), palette.hex_strings().join(":"));
            }
        }
    }

    Ok(())
}
