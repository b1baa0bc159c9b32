use super::{RasterDocument, Rasterizer};
use crate::types::{PagesError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;

fn render_error(e: PdfiumError) -> PagesError {
    PagesError::Render(format!("{:?}", e))
}

/// Rasterizer backed by the pdfium library
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind pdfium, trying the vendored library first, then falling back to system
    pub fn new() -> Result<Self> {
        // When running from cargo, the working directory is the workspace root
        let vendor_path = std::env::current_dir().ok().and_then(|mut p| {
            p.push("vendor/pdfium/lib");
            if p.exists() { Some(p) } else { None }
        });

        if let Some(vendor_path) = vendor_path {
            if let Ok(binding) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&vendor_path))
            {
                return Ok(Self {
                    pdfium: Pdfium::new(binding),
                });
            }
        }

        let binding = Pdfium::bind_to_system_library().map_err(render_error)?;
        Ok(Self {
            pdfium: Pdfium::new(binding),
        })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(render_error)?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, page_index: usize) -> Result<PdfPage<'a>> {
        let index = u16::try_from(page_index).map_err(|_| PagesError::IndexOutOfRange {
            index: page_index,
            len: self.page_count(),
        })?;
        self.document.pages().get(index).map_err(render_error)
    }
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32)> {
        let page = self.page(page_index)?;
        Ok((page.width().value, page.height().value))
    }

    fn render(&self, page_index: usize, scale: f32) -> Result<DynamicImage> {
        let page = self.page(page_index)?;
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&config).map_err(render_error)?;
        Ok(bitmap.as_image())
    }
}
