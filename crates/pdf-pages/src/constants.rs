//! Shared constants for page editing and export
//!
//! Defaults for the tunables in `ToolOptions` plus fixed PDF values.

// =============================================================================
// Rasterization
// =============================================================================

/// Scale used for preview thumbnails (both stores)
pub const THUMBNAIL_SCALE: f32 = 0.3;

/// JPEG quality for preview thumbnails
pub const THUMBNAIL_QUALITY: u8 = 50;

/// Scale used when exporting pages as images
pub const EXPORT_SCALE: f32 = 2.0;

/// JPEG quality for exported page images
pub const EXPORT_QUALITY: u8 = 80;

/// Pages rendered concurrently by the batch exporter
pub const EXPORT_BATCH_SIZE: usize = 2;

/// Pages between progress reports
pub const PROGRESS_STRIDE: usize = 5;

// =============================================================================
// Output naming
// =============================================================================

/// Default prefix for suggested output filenames
pub const OUTPUT_PREFIX: &str = "Carma";

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// PDF version written for assembled output
pub const OUTPUT_PDF_VERSION: &str = "1.7";

/// Resource name of the embedded spread inside split pages
pub const SPREAD_XOBJECT_NAME: &str = "Sp";
