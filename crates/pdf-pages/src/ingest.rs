//! Turning uploaded documents into page surrogates
//!
//! Parsing, page extraction and preview rendering run on a blocking worker
//! that streams finished surrogates back over a channel. Surrogates are
//! staged and committed to the store only once the whole call succeeds.

use crate::context::EngineContext;
use crate::raster::{RasterDocument, Rasterizer, generate_thumbnail};
use crate::render::extract_page;
use crate::store::{OrganizerStore, OwnedPage, PageSurrogate, SharedPage, SplitterStore};
use crate::types::*;
use lopdf::{Document, ObjectId};
use std::sync::Arc;
use tokio::sync::mpsc;

const ORGANIZER_OPERATION: &str = "Loading";
const SPLITTER_OPERATION: &str = "Building Preview";

enum IngestEvent<R> {
    Started { total: usize },
    Page(PageSurrogate<R>),
}

/// Append every page of every document to the organizer, in order.
///
/// Returns the number of pages added. On failure the store is unchanged.
pub async fn ingest_organizer(
    store: &mut OrganizerStore,
    documents: Vec<Vec<u8>>,
    ctx: &EngineContext,
) -> Result<usize> {
    ctx.begin()?;
    let mut staged = Vec::new();

    for bytes in documents {
        let worker_ctx = ctx.clone();
        let pages = drive_ingest(ORGANIZER_OPERATION, ctx, move |tx| {
            extract_pages_blocking(&bytes, &worker_ctx, &tx)
        })
        .await?;
        staged.extend(pages);
    }

    let added = staged.len();
    for page in staged {
        store.collection.push(page);
    }
    log::info!(
        "Organizer now holds {} pages ({} added)",
        store.collection.len(),
        added
    );
    Ok(added)
}

/// Replace the splitter's contents with the pages of one document.
///
/// Every page starts flagged for splitting. Returns the page count.
pub async fn ingest_splitter(
    store: &mut SplitterStore,
    bytes: Vec<u8>,
    ctx: &EngineContext,
) -> Result<usize> {
    ctx.begin()?;
    let source: Arc<[u8]> = bytes.into();
    let worker_source = source.clone();
    let worker_ctx = ctx.clone();

    let pages = drive_ingest(SPLITTER_OPERATION, ctx, move |tx| {
        reference_pages_blocking(worker_source, &worker_ctx, &tx)
    })
    .await?;

    store.reset();
    store.source = Some(source);
    for page in pages {
        store.collection.push(page);
    }
    store.flag_all();

    log::info!("Splitter loaded {} pages", store.collection.len());
    Ok(store.collection.len())
}

/// Run a blocking ingestion worker and collect what it streams back
async fn drive_ingest<R, F>(
    operation: &'static str,
    ctx: &EngineContext,
    worker: F,
) -> Result<Vec<PageSurrogate<R>>>
where
    R: Send + 'static,
    F: FnOnce(mpsc::UnboundedSender<IngestEvent<R>>) -> Result<()> + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::task::spawn_blocking(move || worker(tx));

    let mut pages = Vec::new();
    let mut total = 0;
    while let Some(event) = rx.recv().await {
        match event {
            IngestEvent::Started { total: count } => {
                total = count;
                ctx.report(operation, 0, total);
            }
            IngestEvent::Page(page) => {
                pages.push(page);
                ctx.report_stride(operation, pages.len(), total);
            }
        }
    }

    handle.await??;
    Ok(pages)
}

fn load_page_ids(bytes: &[u8]) -> Result<(Document, Vec<ObjectId>)> {
    let document = Document::load_mem(bytes)?;
    let page_ids = document.get_pages().into_values().collect();
    Ok((document, page_ids))
}

/// Open a document for previews. A missing or failing rasterizer degrades
/// to empty previews.
fn open_for_previews<'a>(
    rasterizer: Option<&'a dyn Rasterizer>,
    bytes: &'a [u8],
) -> Option<Box<dyn RasterDocument + 'a>> {
    let Some(rasterizer) = rasterizer else {
        log::warn!("No rasterizer available, previews will be empty");
        return None;
    };
    match rasterizer.open(bytes) {
        Ok(document) => Some(document),
        Err(e) => {
            log::warn!("Failed to open document for previews: {}", e);
            None
        }
    }
}

fn preview(document: Option<&dyn RasterDocument>, page_index: usize, ctx: &EngineContext) -> Vec<u8> {
    document
        .map(|doc| {
            generate_thumbnail(
                doc,
                page_index,
                ctx.options.thumbnail_scale,
                ctx.options.thumbnail_quality,
            )
        })
        .unwrap_or_default()
}

fn extract_pages_blocking(
    bytes: &[u8],
    ctx: &EngineContext,
    tx: &mpsc::UnboundedSender<IngestEvent<OwnedPage>>,
) -> Result<()> {
    let (source, page_ids) = load_page_ids(bytes)?;
    let rasterizer = ctx.rasterizer().cloned();
    let raster_doc = open_for_previews(rasterizer.as_deref(), bytes);

    if tx.send(IngestEvent::Started { total: page_ids.len() }).is_err() {
        return Ok(());
    }

    for (page_index, &page_id) in page_ids.iter().enumerate() {
        ctx.check_cancelled()?;

        let page_bytes = extract_page(&source, page_id).map_err(|e| e.at_page(page_index))?;
        let page = PageSurrogate::new(
            OwnedPage {
                bytes: page_bytes,
                page_index,
            },
            preview(raster_doc.as_deref(), page_index, ctx),
        );

        // Receiver gone means the caller stopped listening
        if tx.send(IngestEvent::Page(page)).is_err() {
            return Ok(());
        }
    }

    Ok(())
}

fn reference_pages_blocking(
    source: Arc<[u8]>,
    ctx: &EngineContext,
    tx: &mpsc::UnboundedSender<IngestEvent<SharedPage>>,
) -> Result<()> {
    let total = {
        let (_, page_ids) = load_page_ids(&source)?;
        page_ids.len()
    };
    let rasterizer = ctx.rasterizer().cloned();
    let raster_doc = open_for_previews(rasterizer.as_deref(), &source);

    if tx.send(IngestEvent::Started { total }).is_err() {
        return Ok(());
    }

    for page_index in 0..total {
        ctx.check_cancelled()?;

        let page = PageSurrogate::new(
            SharedPage {
                source: source.clone(),
                page_index,
            },
            preview(raster_doc.as_deref(), page_index, ctx),
        );
        if tx.send(IngestEvent::Page(page)).is_err() {
            return Ok(());
        }
    }

    Ok(())
}
