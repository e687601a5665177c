//! Certificate image to single-page PDF conversion.
//!
//! Stored certificates arrive in one of three encodings: a data URL
//! (`data:image/png;base64,...`), plain base64, or a Postgres `bytea` hex
//! literal (`\x89504e47...`). [`decode_blob`] turns any of them into raw
//! image bytes. [`GenPdfConverter`] then fits the image to an A4 page in
//! the orientation of the image, flattens transparency over white, and
//! renders it with `genpdf`.
//!
//! `genpdf` embeds images from files, so the fitted image is written to a
//! temporary PNG first. The file lives until rendering is done.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use genpdf::elements::Image as PdfImage;
use genpdf::{Alignment, Document, Size};
use image::imageops::FilterType;
use image::{load_from_memory, DynamicImage, GenericImageView, RgbImage};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use thiserror::Error;

const MARGIN_MM: u32 = 10;
const IMAGE_DPI: f64 = 150.0;
const MM_PER_INCH: f64 = 25.4;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid certificate data: {0}")]
    Decode(String),

    #[error("Unsupported certificate image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to encode certificate image: {0}")]
    Png(#[from] png::EncodingError),

    #[error("Failed to load fonts from {0}")]
    Font(String),

    #[error("Failed to render PDF: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Converts raw image bytes into PDF bytes. Implementations are blocking.
pub trait PdfConverter: Send + Sync {
    fn convert(&self, image: &[u8]) -> Result<Vec<u8>, ConvertError>;
}

/// Decodes a stored certificate blob into raw image bytes.
pub fn decode_blob(blob: &str) -> Result<Vec<u8>, ConvertError> {
    let blob = blob.trim();
    if let Some(rest) = blob.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ConvertError::Decode("data URL without payload".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(ConvertError::Decode(format!(
                "unsupported data URL encoding `{header}`"
            )));
        }
        return decode_base64(payload);
    }
    if let Some(hex) = blob.strip_prefix("\\x") {
        let bytes = decode_hex(hex)?;
        // bytea columns written from text hold the data URL itself
        return match std::str::from_utf8(&bytes) {
            Ok(text) if text.starts_with("data:") => decode_blob(text),
            _ => Ok(bytes),
        };
    }
    decode_base64(blob)
}

fn decode_base64(payload: &str) -> Result<Vec<u8>, ConvertError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact)
        .map_err(|e| ConvertError::Decode(e.to_string()))
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, ConvertError> {
    if hex.len() % 2 != 0 {
        return Err(ConvertError::Decode("odd-length hex literal".to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ConvertError::Decode(format!("invalid hex at offset {i}")))
        })
        .collect()
}

/// Paper the certificate is laid out on, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub width_mm: u32,
    pub height_mm: u32,
}

impl Page {
    pub const A4_PORTRAIT: Page = Page {
        width_mm: 210,
        height_mm: 297,
    };
    pub const A4_LANDSCAPE: Page = Page {
        width_mm: 297,
        height_mm: 210,
    };

    /// Landscape for wide images, portrait otherwise.
    pub fn for_image(width: u32, height: u32) -> Page {
        if width > height {
            Page::A4_LANDSCAPE
        } else {
            Page::A4_PORTRAIT
        }
    }

    /// Printable area in image pixels at the embedding DPI.
    fn content_px(&self) -> (f64, f64) {
        let to_px = |mm: u32| (mm - 2 * MARGIN_MM) as f64 / MM_PER_INCH * IMAGE_DPI;
        (to_px(self.width_mm), to_px(self.height_mm))
    }
}

/// Scales `img` down to the printable area of its page, keeping the aspect
/// ratio, and flattens any alpha channel over a white background.
pub fn fit_to_page(img: DynamicImage) -> (RgbImage, Page) {
    let (orig_w, orig_h) = img.dimensions();
    let page = Page::for_image(orig_w, orig_h);
    let (max_w, max_h) = page.content_px();

    let scale = (max_w / orig_w as f64)
        .min(max_h / orig_h as f64)
        .min(1.0);
    let resized = if scale >= 1.0 {
        img
    } else {
        let new_w = (orig_w as f64 * scale).max(1.0).round() as u32;
        let new_h = (orig_h as f64 * scale).max(1.0).round() as u32;
        img.resize(new_w, new_h, FilterType::Lanczos3)
    };

    let rgba = resized.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    (DynamicImage::ImageRgba8(background).to_rgb8(), page)
}

fn write_png(image: &RgbImage) -> Result<NamedTempFile, ConvertError> {
    let (w, h) = image.dimensions();
    let mut tmp = tempfile::Builder::new().suffix(".png").tempfile()?;
    {
        let mut encoder = PngEncoder::new(tmp.as_file_mut(), w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_raw())?;
    }
    Ok(tmp)
}

/// Renders with `genpdf`, using TrueType fonts from `fonts_dir`.
pub struct GenPdfConverter {
    fonts_dir: PathBuf,
}

impl GenPdfConverter {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
        }
    }

    // Arial when its TTFs were added to the fonts directory, LiberationSans otherwise.
    fn load_font(
        &self,
    ) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, ConvertError> {
        if let Ok(family) = genpdf::fonts::from_files(&self.fonts_dir, "Arial", None) {
            return Ok(family);
        }
        genpdf::fonts::from_files(&self.fonts_dir, "LiberationSans", None)
            .map_err(|_| ConvertError::Font(self.fonts_dir.display().to_string()))
    }
}

impl PdfConverter for GenPdfConverter {
    fn convert(&self, image: &[u8]) -> Result<Vec<u8>, ConvertError> {
        let (fitted, page) = fit_to_page(load_from_memory(image)?);
        let png = write_png(&fitted)?;

        let mut doc = Document::new(self.load_font()?);
        doc.set_title("Certificate");
        doc.set_paper_size(Size::new(page.width_mm, page.height_mm));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(MARGIN_MM);
        doc.set_page_decorator(decorator);

        let mut element = PdfImage::from_path(png.path())
            .map_err(|e| ConvertError::Render(e.to_string()))?;
        element.set_dpi(IMAGE_DPI);
        element.set_alignment(Alignment::Center);
        doc.push(element);

        let mut out = Vec::new();
        doc.render(&mut out)
            .map_err(|e| ConvertError::Render(e.to_string()))?;
        Ok(out)
    }
}
