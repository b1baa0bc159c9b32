//! PDF structure operations
//!
//! This module handles all lopdf-level work:
//! - Copying pages between documents with inherited attributes resolved
//! - Wrapping pages in Form XObjects for clipped drawing
//! - Building and serializing output documents

mod page;
mod xobject;

pub use page::{OutputDocument, extract_page};
pub use xobject::{
    PageBox, copy_object_deep, create_page_xobject, get_page_box, get_page_dimensions,
};
