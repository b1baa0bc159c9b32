mod assemble;
mod constants;
mod context;
mod editor;
mod export;
mod ingest;
mod options;
pub mod raster;
pub mod render;
mod split;
mod store;
mod types;

pub use assemble::assemble;
pub use context::EngineContext;
pub use editor::SelectionState;
pub use export::{archive_stem, export_images, page_entry_name};
pub use ingest::{ingest_organizer, ingest_splitter};
pub use options::ToolOptions;
pub use split::{SpreadPlacement, split_spreads, spread_placements};
pub use store::*;
pub use types::*;
