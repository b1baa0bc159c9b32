use super::RasterDocument;
use crate::types::{PagesError, Result};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

/// Encode an image as JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;
    Ok(buf)
}

/// Render a small JPEG preview of one page.
///
/// Failures are logged and produce an empty preview.
pub fn generate_thumbnail(
    document: &dyn RasterDocument,
    page_index: usize,
    scale: f32,
    quality: u8,
) -> Vec<u8> {
    let encoded = render_checked(document, page_index, scale)
        .and_then(|image| encode_jpeg(&image, quality));

    match encoded {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Failed to render preview for page {}: {}", page_index + 1, e);
            Vec::new()
        }
    }
}

/// Render after checking the page has a drawable area
fn render_checked(document: &dyn RasterDocument, page_index: usize, scale: f32) -> Result<DynamicImage> {
    let (width, height) = document.page_size(page_index)?;
    if !(width * scale >= 1.0 && height * scale >= 1.0) {
        return Err(PagesError::Render(format!(
            "page is {}x{} points, too small to preview",
            width, height
        )));
    }
    document.render(page_index, scale)
}
