//! Page surrogates and the two stores that hold them
//!
//! The organizer gives every surrogate its own single-page PDF so pages from
//! different uploads can be mixed freely. The splitter keeps one shared,
//! read-only copy of the uploaded document and refers to pages by index.

use crate::editor::SelectionState;
use std::sync::Arc;

/// Stand-in for one logical page: where its bytes live plus a cached preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurrogate<R> {
    pub source: R,
    /// Encoded JPEG preview; empty when rendering failed
    pub preview: Vec<u8>,
}

impl<R> PageSurrogate<R> {
    pub fn new(source: R, preview: Vec<u8>) -> Self {
        Self { source, preview }
    }

    pub fn has_preview(&self) -> bool {
        !self.preview.is_empty()
    }
}

/// A page extracted into its own minimal document at ingestion time.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedPage {
    /// Serialized single-page PDF, independent of its parent document
    pub bytes: Vec<u8>,
    /// Zero-based index of the page in the document it came from
    pub page_index: usize,
}

/// A page referenced inside a shared source document.
#[derive(Debug, Clone)]
pub struct SharedPage {
    pub source: Arc<[u8]>,
    pub page_index: usize,
}

impl SharedPage {
    /// Whether two references point at the same source buffer
    pub fn shares_source_with(&self, other: &SharedPage) -> bool {
        Arc::ptr_eq(&self.source, &other.source)
    }
}

/// Ordered, selectable sequence of surrogates. Order is output order.
#[derive(Debug, Clone)]
pub struct PageCollection<R> {
    pub(crate) pages: Vec<PageSurrogate<R>>,
    pub(crate) selection: SelectionState,
}

impl<R> Default for PageCollection<R> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            selection: SelectionState::default(),
        }
    }
}

impl<R> PageCollection<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn push(&mut self, page: PageSurrogate<R>) {
        self.pages.push(page);
    }

    pub fn get(&self, index: usize) -> Option<&PageSurrogate<R>> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageSurrogate<R>> {
        self.pages.iter()
    }

    pub fn pages(&self) -> &[PageSurrogate<R>] {
        &self.pages
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(index)
    }

    /// Drop every page and selection, back to the pre-ingestion state
    pub fn reset(&mut self) {
        self.pages.clear();
        self.selection.reset();
    }
}

/// Multi-document organizer state
#[derive(Debug, Default)]
pub struct OrganizerStore {
    pub collection: PageCollection<OwnedPage>,
}

impl OrganizerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.collection.reset();
    }

    /// Delete the selected pages; an emptied organizer starts over
    pub fn delete_selected(&mut self) -> usize {
        let removed = self.collection.delete_selected();
        if self.collection.is_empty() {
            self.reset();
        }
        removed
    }

    /// Remove one page; an emptied organizer starts over
    pub fn remove_at(&mut self, index: usize) -> crate::Result<()> {
        self.collection.remove_at(index)?;
        if self.collection.is_empty() {
            self.reset();
        }
        Ok(())
    }

    pub fn reverse_all(&mut self, clear_selection: bool) {
        self.collection.reverse_all();
        if clear_selection {
            self.collection.deselect_all();
        }
    }
}

/// Single-document spread splitter state. Selected pages are split.
#[derive(Debug, Default)]
pub struct SplitterStore {
    pub(crate) source: Option<Arc<[u8]>>,
    pub collection: PageCollection<SharedPage>,
}

impl SplitterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared document every surrogate refers to
    pub fn source(&self) -> Option<&Arc<[u8]>> {
        self.source.as_ref()
    }

    pub fn reset(&mut self) {
        self.source = None;
        self.collection.reset();
    }

    /// Flag or unflag one page for splitting
    pub fn toggle_split(&mut self, index: usize) -> crate::Result<()> {
        self.collection.toggle(index)
    }

    pub fn flag_all(&mut self) {
        self.collection.select_all();
    }

    pub fn flag_none(&mut self) {
        self.collection.deselect_all();
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.collection.is_selected(index)
    }

    pub fn flagged_count(&self) -> usize {
        self.collection.selection.len()
    }
}
