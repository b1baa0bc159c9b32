//! Reassembling the organizer's pages into one document

use crate::context::EngineContext;
use crate::render::OutputDocument;
use crate::store::{OwnedPage, PageCollection};
use crate::types::*;
use lopdf::Document;
use std::collections::HashMap;

const OPERATION: &str = "Saving";

/// Build one PDF from the collection, pages in collection order.
///
/// Returns `None` for an empty collection. Any page failure aborts the whole
/// assembly and reports that page's position.
pub async fn assemble(
    collection: &PageCollection<OwnedPage>,
    ctx: &EngineContext,
) -> Result<Option<Delivery>> {
    ctx.begin()?;
    if collection.is_empty() {
        return Ok(None);
    }

    let total = collection.len();
    let mut output = OutputDocument::new();
    ctx.report(OPERATION, 0, total);

    for (position, page) in collection.iter().enumerate() {
        ctx.check_cancelled()?;

        let bytes = page.source.bytes.clone();
        output = tokio::task::spawn_blocking(move || {
            append_owned_page(&mut output, &bytes).map_err(|e| e.at_page(position))?;
            Ok::<_, PagesError>(output)
        })
        .await??;

        ctx.report_stride(OPERATION, position + 1, total);
    }

    let bytes = tokio::task::spawn_blocking(move || output.into_bytes()).await??;
    log::info!("Assembled {} pages ({} bytes)", total, bytes.len());

    Ok(Some(Delivery {
        bytes,
        filename: ctx.options.organized_filename(),
        mime: MIME_PDF,
    }))
}

/// Copy the single page held by an organizer surrogate
fn append_owned_page(output: &mut OutputDocument, bytes: &[u8]) -> Result<()> {
    let source = Document::load_mem(bytes)?;
    let page_id = source
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or(PagesError::NoPages)?;
    output.copy_page(&source, page_id, &mut HashMap::new())?;
    Ok(())
}
