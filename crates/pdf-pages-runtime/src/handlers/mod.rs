pub mod config;
pub mod export;
pub mod organizer;
pub mod splitter;

use pdf_pages::PageCollection;

use crate::{CollectionView, PageView};

/// Snapshot a collection for the UI
fn view<R>(collection: &PageCollection<R>, page_index: impl Fn(&R) -> usize) -> CollectionView {
    let pages = collection
        .iter()
        .enumerate()
        .map(|(position, page)| PageView {
            source_page: page_index(&page.source) + 1,
            preview: page.preview.clone(),
            selected: collection.is_selected(position),
        })
        .collect();

    CollectionView {
        pages,
        last_clicked: collection.selection().last_clicked(),
    }
}

/// Display name of an input file
fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
