//! Splitting two-page spreads into single pages
//!
//! A flagged page of width `W` becomes two pages of width `W / 2`. The
//! original page is embedded once as a Form XObject and drawn onto both new
//! pages at native scale, shifted so the wanted half lands on the page and
//! clipped so the other half is hidden.

use crate::constants::SPREAD_XOBJECT_NAME;
use crate::context::EngineContext;
use crate::render::{OutputDocument, PageBox, create_page_xobject, get_page_box};
use crate::store::SplitterStore;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::sync::Arc;

const OPERATION: &str = "Splitting";

// =============================================================================
// Geometry
// =============================================================================

/// Where the embedded spread is drawn on one output page.
///
/// `x`/`y` translate the spread relative to the output page origin. The clip
/// rectangle is in the spread's own coordinates, relative to its MediaBox
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadPlacement {
    pub x: f32,
    pub y: f32,
    pub clip_x: f32,
    pub clip_y: f32,
    pub clip_width: f32,
    pub clip_height: f32,
}

impl SpreadPlacement {
    fn left_half(half: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            clip_x: 0.0,
            clip_y: 0.0,
            clip_width: half,
            clip_height: height,
        }
    }

    fn right_half(half: f32, height: f32) -> Self {
        Self {
            x: -half,
            y: 0.0,
            clip_x: half,
            clip_y: 0.0,
            clip_width: half,
            clip_height: height,
        }
    }
}

/// Placements for the first and second output page of a spread
pub fn spread_placements(width: f32, height: f32, direction: SplitDirection) -> [SpreadPlacement; 2] {
    let half = width / 2.0;
    let left = SpreadPlacement::left_half(half, height);
    let right = SpreadPlacement::right_half(half, height);
    match direction {
        SplitDirection::LeftToRight => [left, right],
        SplitDirection::RightToLeft => [right, left],
    }
}

/// Content stream drawing `name` with a placement, honouring a MediaBox that
/// does not start at the origin.
fn placement_command(name: &str, placement: &SpreadPlacement, page_box: &PageBox) -> String {
    format!(
        "q\n1 0 0 1 {} {} cm\n{} {} {} {} re W n\n/{} Do\nQ\n",
        placement.x - page_box.x,
        placement.y - page_box.y,
        page_box.x + placement.clip_x,
        page_box.y + placement.clip_y,
        placement.clip_width,
        placement.clip_height,
        name
    )
}

// =============================================================================
// Splitting
// =============================================================================

/// Produce the split document from the splitter store.
///
/// Flagged pages become two half-width pages; the rest are copied unchanged.
/// Returns `None` when the store is empty.
pub async fn split_spreads(
    store: &SplitterStore,
    direction: SplitDirection,
    ctx: &EngineContext,
) -> Result<Option<Delivery>> {
    ctx.begin()?;
    let Some(first) = store.collection.get(0) else {
        return Ok(None);
    };

    let source = first.source.source.clone();
    let total = store.collection.len();
    ctx.report(OPERATION, 0, total);

    let mut job = tokio::task::spawn_blocking(move || SplitJob::open(&source)).await??;

    for (position, page) in store.collection.iter().enumerate() {
        ctx.check_cancelled()?;

        let page_index = page.source.page_index;
        let flagged = store.is_flagged(position);
        job = tokio::task::spawn_blocking(move || {
            job.append(page_index, flagged, direction)
                .map_err(|e| e.at_page(position))?;
            Ok::<_, PagesError>(job)
        })
        .await??;

        ctx.report_stride(OPERATION, position + 1, total);
    }

    let (bytes, page_count) = tokio::task::spawn_blocking(move || job.finish()).await??;
    log::info!(
        "Split {} source pages ({} flagged) into {} pages",
        total,
        store.flagged_count(),
        page_count
    );

    Ok(Some(Delivery {
        bytes,
        filename: ctx.options.split_filename(),
        mime: MIME_PDF,
    }))
}

/// State carried between per-page steps: the source is parsed once
struct SplitJob {
    source: Document,
    page_ids: Vec<ObjectId>,
    output: OutputDocument,
    cache: HashMap<ObjectId, ObjectId>,
}

impl SplitJob {
    fn open(bytes: &Arc<[u8]>) -> Result<Self> {
        let source = Document::load_mem(bytes)?;
        let page_ids = source.get_pages().into_values().collect();
        Ok(Self {
            source,
            page_ids,
            output: OutputDocument::new(),
            cache: HashMap::new(),
        })
    }

    fn append(&mut self, page_index: usize, flagged: bool, direction: SplitDirection) -> Result<()> {
        let page_id = *self
            .page_ids
            .get(page_index)
            .ok_or(PagesError::IndexOutOfRange {
                index: page_index,
                len: self.page_ids.len(),
            })?;

        if !flagged {
            self.output.copy_page(&self.source, page_id, &mut self.cache)?;
            return Ok(());
        }

        let page_box = get_page_box(&self.source, page_id)?;
        let xobject_id = create_page_xobject(
            self.output.document_mut(),
            &self.source,
            page_id,
            &mut self.cache,
        )?;

        let half_box = PageBox {
            x: 0.0,
            y: 0.0,
            width: page_box.width / 2.0,
            height: page_box.height,
        };

        for placement in spread_placements(page_box.width, page_box.height, direction) {
            let mut xobjects = Dictionary::new();
            xobjects.set(SPREAD_XOBJECT_NAME, Object::Reference(xobject_id));
            let content = placement_command(SPREAD_XOBJECT_NAME, &placement, &page_box);
            self.output.add_drawn_page(half_box, xobjects, content);
        }

        Ok(())
    }

    fn finish(self) -> Result<(Vec<u8>, usize)> {
        let page_count = self.output.page_count();
        Ok((self.output.into_bytes()?, page_count))
    }
}
