//! QR Code symbol generation (JIS X 0510 / ISO/IEC 18004) with byte-exact
//! GIF and PNG output plus ASCII, HTML-table and SVG-path views.
//!
//! A [`QrSymbol`] collects data segments, picks the smallest fitting
//! version when asked to, Reed-Solomon-protects the payload, lays out the
//! module grid and commits the lowest-penalty mask. Renderers only ever see
//! the finished dark/light grid.
//!
//! ```
//! use qrforge::{ErrorLevel, QrSymbol};
//!
//! let mut symbol = QrSymbol::new(0, ErrorLevel::M)?;
//! symbol.add_data("https://example.com/");
//! symbol.make()?;
//!
//! assert!(symbol.module_count()? >= 21);
//! let url = symbol.png_data_url(4, 16, None, None)?;
//! assert!(url.starts_with("data:image/png;base64,"));
//! # Ok::<(), qrforge::QrError>(())
//! ```

mod bits;
mod checksum;
mod codewords;
mod deflate;
mod error;
mod gf256;
mod gif;
mod matrix;
mod penalty;
mod png;
mod render;
mod segments;
mod tables;
mod types;

pub use error::{QrError, Result};
pub use png::Rgb;
pub use render::ModuleSource;
pub use segments::Segment;
pub use types::{EncodeMode, ErrorLevel, MaskPattern, Version};

use log::debug;
use matrix::Modules;

/// A finished build: the resolved version, the committed mask, and the
/// module grid.
#[derive(Debug, Clone)]
struct Built {
    version: Version,
    mask: MaskPattern,
    grid: Modules,
}

/// A QR Code symbol under construction.
///
/// Appending segments invalidates any previous build; `make()` (re)builds
/// the grid in place. Read and render operations require a completed
/// `make()` and fail with [`QrError::OutOfRange`] before it.
#[derive(Debug, Clone)]
pub struct QrSymbol {
    requested: Option<Version>,
    level: ErrorLevel,
    segments: Vec<Segment>,
    built: Option<Built>,
}

impl QrSymbol {
    /// Create a symbol. `version` 0 selects the smallest version that holds
    /// the data; 1..=40 pins the version. Values above 40 are outside the
    /// standard's tables.
    pub fn new(version: u8, level: ErrorLevel) -> Result<Self> {
        let requested = match version {
            0 => None,
            n => Some(Version::new(n).ok_or_else(|| {
                QrError::internal(format!("version {n} is outside 1..=40"))
            })?),
        };
        Ok(Self {
            requested,
            level,
            segments: Vec::new(),
            built: None,
        })
    }

    /// Create a symbol from a level name ("L", "M", "Q" or "H").
    pub fn with_level_name(version: u8, level: &str) -> Result<Self> {
        Self::new(version, ErrorLevel::from_name(level)?)
    }

    /// Append text as a Byte-mode segment.
    pub fn add_data(&mut self, text: &str) {
        self.add_segment(Segment::byte_text(text));
    }

    /// Append text in an explicit mode.
    pub fn add_data_in_mode(&mut self, text: &str, mode: EncodeMode) {
        self.add_segment(Segment::in_mode(text, mode));
    }

    /// Append text in a mode given by name ("Numeric", "Alphanumeric",
    /// "Byte" or "Kanji").
    pub fn add_data_with_mode_name(&mut self, text: &str, mode: &str) -> Result<()> {
        self.add_data_in_mode(text, EncodeMode::from_name(mode)?);
        Ok(())
    }

    /// Append a pre-built segment.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.built = None;
    }

    /// Finalise the symbol: resolve the version, encode the codeword
    /// stream, and build the grid with the best mask. Must be called before
    /// any read or render operation; calling it again without new data
    /// rebuilds the identical grid.
    pub fn make(&mut self) -> Result<()> {
        let version = match self.requested {
            Some(version) => version,
            None => self.auto_version()?,
        };
        let data = codewords::build_codewords(version, self.level, &self.segments)?;
        let (mask, grid) = matrix::choose_mask(version, self.level, &data);
        self.built = Some(Built {
            version,
            mask,
            grid,
        });
        Ok(())
    }

    /// Smallest version whose payload capacity holds the segments.
    fn auto_version(&self) -> Result<Version> {
        for version in Version::all() {
            let bits = codewords::encoded_bit_len(version, &self.segments)?;
            let capacity = 8 * tables::data_codewords(version, self.level);
            if bits <= capacity {
                debug!(
                    "auto-selected version {} ({bits} of {capacity} bits)",
                    version.number()
                );
                return Ok(version);
            }
        }
        Err(QrError::CodeOverflow {
            bits: codewords::encoded_bit_len(Version::MAX, &self.segments)?,
            capacity: 8 * tables::data_codewords(Version::MAX, self.level),
        })
    }

    fn built(&self) -> Result<&Built> {
        self.built.as_ref().ok_or(QrError::OutOfRange {
            row: 0,
            col: 0,
            size: 0,
        })
    }

    /// Side length of the built symbol in modules.
    pub fn module_count(&self) -> Result<usize> {
        Ok(self.built()?.grid.size())
    }

    /// Darkness of the module at (row, col).
    pub fn is_dark(&self, row: usize, col: usize) -> Result<bool> {
        let grid = &self.built()?.grid;
        let size = grid.size();
        if row >= size || col >= size {
            return Err(QrError::OutOfRange { row, col, size });
        }
        Ok(grid.is_dark(row, col))
    }

    /// The error correction level the symbol was created with.
    pub fn error_level(&self) -> ErrorLevel {
        self.level
    }

    /// The resolved version of the built symbol.
    pub fn version(&self) -> Result<Version> {
        Ok(self.built()?.version)
    }

    /// The mask pattern committed by the last `make()`.
    pub fn mask_pattern(&self) -> Result<MaskPattern> {
        Ok(self.built()?.mask)
    }

    /// ASCII rendering. A `cell_size` of 2 or more draws block-character
    /// cells; 1 (or 0, which defaults to 1) compresses two module rows per
    /// text line with half blocks. `margin` counts light modules.
    pub fn ascii_text(&self, cell_size: usize, margin: usize) -> Result<String> {
        Ok(render::ascii_text(&self.built()?.grid, cell_size, margin))
    }

    /// HTML table rendering with pixel sizes in inline styles.
    pub fn html_table(&self, cell_size: usize, margin: usize) -> Result<String> {
        Ok(render::html_table(&self.built()?.grid, cell_size, margin))
    }

    /// SVG path `d` string covering the dark modules.
    pub fn svg_path(&self, cell_size: usize, margin: usize) -> Result<String> {
        Ok(render::svg_path(&self.built()?.grid, cell_size, margin))
    }

    /// GIF87a bytes; `cell_size` and `margin` in pixels.
    pub fn gif_bytes(&self, cell_size: usize, margin: usize) -> Result<Vec<u8>> {
        Ok(gif::gif_bytes(&self.built()?.grid, cell_size, margin))
    }

    /// GIF rendering as a `data:image/gif;base64,` URL.
    pub fn gif_data_url(&self, cell_size: usize, margin: usize) -> Result<String> {
        Ok(gif::gif_data_url(&self.built()?.grid, cell_size, margin))
    }

    /// PNG bytes; grayscale unless a colour pair is given. A single given
    /// colour is completed with black-on-white defaults.
    pub fn png_bytes(
        &self,
        cell_size: usize,
        margin: usize,
        fg: Option<Rgb>,
        bg: Option<Rgb>,
    ) -> Result<Vec<u8>> {
        let colors = resolve_colors(fg, bg);
        Ok(png::png_bytes(&self.built()?.grid, cell_size, margin, colors))
    }

    /// PNG rendering as a `data:image/png;base64,` URL.
    pub fn png_data_url(
        &self,
        cell_size: usize,
        margin: usize,
        fg: Option<Rgb>,
        bg: Option<Rgb>,
    ) -> Result<String> {
        let colors = resolve_colors(fg, bg);
        Ok(png::png_data_url(
            &self.built()?.grid,
            cell_size,
            margin,
            colors,
        ))
    }
}

fn resolve_colors(fg: Option<Rgb>, bg: Option<Rgb>) -> Option<(Rgb, Rgb)> {
    match (fg, bg) {
        (None, None) => None,
        (fg, bg) => Some((fg.unwrap_or([0, 0, 0]), bg.unwrap_or([255, 255, 255]))),
    }
}
