//! In-place editing of a page collection
//!
//! Pure sequence operations: nothing here touches page bytes. Any mutation
//! that changes what an index refers to clears the selection.

use crate::store::{PageCollection, PageSurrogate};
use crate::types::*;
use std::collections::BTreeSet;

/// Selected indices plus the anchor used for shift-click ranges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<usize>,
    last_clicked: Option<usize>,
}

impl SelectionState {
    pub fn contains(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn last_clicked(&self) -> Option<usize> {
        self.last_clicked
    }

    /// Selected indices in ascending order
    pub fn indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.selected.clear();
    }

    pub(crate) fn reset(&mut self) {
        self.selected.clear();
        self.last_clicked = None;
    }
}

impl<R> PageCollection<R> {
    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.pages.len() {
            return Err(PagesError::IndexOutOfRange {
                index,
                len: self.pages.len(),
            });
        }
        Ok(())
    }

    /// Move the page at `from` so it sits at `to` in the sequence that
    /// remains after removal (splice semantics).
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }

        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        self.selection.clear();
        Ok(())
    }

    /// Flip selection of one page and make it the range anchor
    pub fn toggle(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        if !self.selection.selected.remove(&index) {
            self.selection.selected.insert(index);
        }
        self.selection.last_clicked = Some(index);
        Ok(())
    }

    /// Add the inclusive span between the anchor and `index`.
    ///
    /// Returns `false` without changing anything when there is no anchor.
    /// The anchor itself is left where it was.
    pub fn range_select(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let Some(anchor) = self.selection.last_clicked else {
            return Ok(false);
        };

        let start = anchor.min(index);
        let end = anchor.max(index).min(self.pages.len() - 1);
        self.selection.selected.extend(start..=end);
        Ok(true)
    }

    /// Shift-click resolves to a range when an anchor exists, else a toggle
    pub fn click(&mut self, index: usize, extend: bool) -> Result<()> {
        if extend && self.range_select(index)? {
            return Ok(());
        }
        self.toggle(index)
    }

    pub fn select_all(&mut self) {
        self.selection.selected = (0..self.pages.len()).collect();
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Remove every selected page in one pass. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let before = self.pages.len();
        let selected = std::mem::take(&mut self.selection.selected);

        let mut position = 0;
        self.pages.retain(|_| {
            let keep = !selected.contains(&position);
            position += 1;
            keep
        });

        before - self.pages.len()
    }

    /// Reverse the whole sequence. Selection indices are not remapped.
    pub fn reverse_all(&mut self) {
        self.pages.reverse();
    }

    /// Remove one page regardless of selection.
    ///
    /// Selected pages after `index` shift down with their pages so the
    /// selection keeps referring to the same surrogates.
    pub fn remove_at(&mut self, index: usize) -> Result<PageSurrogate<R>> {
        self.check_index(index)?;
        let page = self.pages.remove(index);

        let selected = std::mem::take(&mut self.selection.selected);
        self.selection.selected = selected
            .into_iter()
            .filter(|&i| i != index)
            .map(|i| if i > index { i - 1 } else { i })
            .collect();
        self.selection.last_clicked = match self.selection.last_clicked {
            Some(anchor) if anchor == index => None,
            Some(anchor) if anchor > index => Some(anchor - 1),
            anchor => anchor,
        };

        Ok(page)
    }
}
