use thiserror::Error;

#[derive(Error, Debug)]
pub enum PagesError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Render error: {0}")]
    Render(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Index {index} out of range for {len} pages")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Page {} failed: {source}", .index + 1)]
    Page {
        index: usize,
        #[source]
        source: Box<PagesError>,
    },
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Document has no pages")]
    NoPages,
}

impl PagesError {
    /// Attach the zero-based collection position that failed.
    pub fn at_page(self, index: usize) -> Self {
        match self {
            // Keep the innermost position and never wrap a cancellation
            err @ (PagesError::Page { .. } | PagesError::Cancelled) => err,
            err => PagesError::Page {
                index,
                source: Box::new(err),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PagesError>;

/// Reading direction of a two-page spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitDirection {
    /// Visually-left half becomes the first output page
    #[default]
    LeftToRight,
    /// Visually-right half becomes the first output page
    RightToLeft,
}

/// Progress of a long-running operation
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub operation: &'static str,
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current as f32 / self.total as f32) * 100.0
    }
}

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_ZIP: &str = "application/zip";

/// Finished output handed to the host's "deliver to user" step
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime: &'static str,
}
