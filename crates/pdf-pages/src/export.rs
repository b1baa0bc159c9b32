//! Exporting every page of a document as JPEG images in a zip archive
//!
//! The document is opened once, on a dedicated blocking thread that renders
//! the pages of one batch at a time on request. Each rendered page is encoded
//! on its own blocking task, so encoding overlaps with rendering the rest of
//! the batch. Entries are written as they finish; the next batch is requested
//! only after the current one has fully completed.

use crate::context::EngineContext;
use crate::raster::{Rasterizer, encode_jpeg};
use crate::types::*;
use image::DynamicImage;
use lopdf::Document;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const OPERATION: &str = "Exporting";

/// Archive folder name for an uploaded file: its name without the last extension
pub fn archive_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Archive path of one exported page (1-based page number)
pub fn page_entry_name(stem: &str, page_number: usize) -> String {
    format!("{stem}/{stem}_Page_{page_number}.jpg")
}

enum RenderEvent {
    Opened { total: usize },
    Page { page_index: usize, image: Result<DynamicImage> },
}

/// Render every page of `bytes` into a zip of JPEGs named after `filename`.
///
/// Returns `None` for a document with no pages. A failed page aborts the
/// whole export.
pub async fn export_images(
    bytes: Arc<[u8]>,
    filename: &str,
    ctx: &EngineContext,
) -> Result<Option<Delivery>> {
    ctx.begin()?;

    let Some(rasterizer) = ctx.rasterizer().cloned() else {
        // An empty document needs no renderer
        let total = tokio::task::spawn_blocking(move || {
            Document::load_mem(&bytes).map(|doc| doc.get_pages().len())
        })
        .await??;
        if total == 0 {
            return Ok(None);
        }
        return Err(PagesError::Render("No rasterizer available".to_string()));
    };

    let stem = archive_stem(filename);
    let quality = ctx.options.export_quality;

    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let scale = ctx.options.export_scale;
    let renderer = tokio::task::spawn_blocking(move || {
        render_pages_blocking(rasterizer.as_ref(), &bytes, scale, request_rx, event_tx)
    });

    let total = match event_rx.recv().await {
        Some(RenderEvent::Opened { total }) => total,
        _ => return Err(renderer_stopped(renderer).await),
    };
    if total == 0 {
        drop(request_tx);
        renderer.await??;
        return Ok(None);
    }

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    // JPEG data does not compress further
    let entry_options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    archive.add_directory(format!("{stem}/"), entry_options)?;

    ctx.report(OPERATION, 0, total);
    let pages: Vec<usize> = (0..total).collect();
    for batch in pages.chunks(ctx.options.export_batch_size) {
        ctx.check_cancelled()?;

        // Receiver gone means the renderer failed; its error surfaces below
        let _ = request_tx.send(batch.to_vec());

        let mut encoders = JoinSet::new();
        for _ in batch {
            let Some(RenderEvent::Page { page_index, image }) = event_rx.recv().await else {
                return Err(renderer_stopped(renderer).await);
            };
            let image = image.map_err(|e| e.at_page(page_index))?;
            encoders.spawn_blocking(move || {
                encode_jpeg(&image, quality)
                    .map(|jpeg| (page_index, jpeg))
                    .map_err(|e| e.at_page(page_index))
            });
        }

        while let Some(joined) = encoders.join_next().await {
            let (page_index, jpeg) = joined??;
            archive.start_file(page_entry_name(&stem, page_index + 1), entry_options)?;
            archive.write_all(&jpeg)?;
            log::debug!("Exported page {} ({} bytes)", page_index + 1, jpeg.len());
        }

        let done = batch.last().map_or(0, |&last| last + 1);
        ctx.report(OPERATION, done, total);
    }

    drop(request_tx);
    renderer.await??;

    let bytes = archive.finish()?.into_inner();
    log::info!("Exported {} pages to archive ({} bytes)", total, bytes.len());

    Ok(Some(Delivery {
        bytes,
        filename: ctx.options.archive_filename(&stem),
        mime: MIME_ZIP,
    }))
}

/// Open the document once and render requested batches until the requests end
fn render_pages_blocking(
    rasterizer: &dyn Rasterizer,
    bytes: &[u8],
    scale: f32,
    mut requests: mpsc::UnboundedReceiver<Vec<usize>>,
    events: mpsc::UnboundedSender<RenderEvent>,
) -> Result<()> {
    let document = rasterizer.open(bytes)?;
    let total = document.page_count();
    if events.send(RenderEvent::Opened { total }).is_err() {
        return Ok(());
    }

    while let Some(batch) = requests.blocking_recv() {
        for page_index in batch {
            let image = document.render(page_index, scale);
            if events.send(RenderEvent::Page { page_index, image }).is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// The renderer's own error once its event stream ended early
async fn renderer_stopped(renderer: JoinHandle<Result<()>>) -> PagesError {
    match renderer.await {
        Ok(Err(e)) => e,
        Err(e) => e.into(),
        Ok(Ok(())) => PagesError::Render("Renderer stopped unexpectedly".to_string()),
    }
}
