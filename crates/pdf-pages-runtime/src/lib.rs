use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

mod handlers;
mod logger;
mod worker;

pub use logger::{AppLogger, LogEntry};
pub use worker::{engine_context, worker_task};

// Re-export types from the engine crate
pub use pdf_pages::{Delivery, SplitDirection, ToolOptions};

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PdfCommand {
    OrganizerAddFiles {
        paths: Vec<PathBuf>,
    },
    OrganizerMove {
        from: usize,
        to: usize,
    },
    /// Plain click toggles; shift-click extends from the last clicked page
    OrganizerClick {
        index: usize,
        shift: bool,
    },
    OrganizerSelectAll,
    OrganizerDeselectAll,
    OrganizerDeleteSelected,
    OrganizerRemove {
        index: usize,
    },
    OrganizerReverse,
    OrganizerSave,
    OrganizerReset,
    SplitterLoad {
        path: PathBuf,
    },
    SplitterToggle {
        index: usize,
    },
    SplitterFlagAll,
    SplitterFlagNone,
    SplitterSplit {
        direction: SplitDirection,
    },
    SplitterReset,
    ExportImages {
        path: PathBuf,
    },
    LoadConfig {
        path: PathBuf,
    },
    SetOptions {
        options: ToolOptions,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum PdfUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    OrganizerChanged {
        view: CollectionView,
    },
    SplitterChanged {
        view: CollectionView,
    },
    /// Finished output for the host to hand to the user
    Deliver {
        delivery: Delivery,
    },
    ConfigLoaded {
        options: ToolOptions,
    },
    Error {
        message: String,
    },
}

/// One page as the UI draws it
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    /// 1-based page number in the document the page came from
    pub source_page: usize,
    pub preview: Vec<u8>,
    /// Selected in the organizer, flagged for splitting in the splitter
    pub selected: bool,
}

/// Snapshot of a store after a change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionView {
    pub pages: Vec<PageView>,
    pub last_clicked: Option<usize>,
}

impl CollectionView {
    pub fn selected_count(&self) -> usize {
        self.pages.iter().filter(|page| page.selected).count()
    }
}

/// Cancels whichever long-running command the worker is executing.
///
/// The worker arms a fresh token at the start of every long-running command,
/// so a cancel only affects work already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelSwitch {
    current: Arc<Mutex<CancellationToken>>,
}

impl CancelSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    pub(crate) fn arm(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }
}
