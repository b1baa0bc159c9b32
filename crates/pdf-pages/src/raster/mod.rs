//! Rasterization seam
//!
//! The engine never decodes page content itself. A `Rasterizer` opens a
//! document for rendering; dropping the returned `RasterDocument` releases
//! its decode resources.

#[cfg(feature = "pdfium")]
mod pdfium;
mod thumbnail;

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;
pub use thumbnail::{encode_jpeg, generate_thumbnail};

use crate::types::Result;
use image::DynamicImage;

/// Opens PDF bytes for rendering
pub trait Rasterizer: Send + Sync {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>>;
}

/// An open document. Page indices are zero-based.
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    /// Page width and height at scale 1, in points
    fn page_size(&self, page_index: usize) -> Result<(f32, f32)>;

    fn render(&self, page_index: usize, scale: f32) -> Result<DynamicImage>;
}
