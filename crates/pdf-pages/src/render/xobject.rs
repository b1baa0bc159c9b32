//! XObject creation and object copying
//!
//! Source pages are either deep-copied into the output document as pages,
//! or wrapped in a Form XObject so they can be drawn with a clip.

use crate::constants::{DEFAULT_PAGE_HEIGHT_PT, DEFAULT_PAGE_WIDTH_PT};
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

// =============================================================================
// Page Geometry
// =============================================================================

/// A page's MediaBox in its own coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for PageBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: DEFAULT_PAGE_WIDTH_PT,
            height: DEFAULT_PAGE_HEIGHT_PT,
        }
    }
}

impl PageBox {
    fn from_array(values: &[Object]) -> Option<Self> {
        if values.len() != 4 {
            return None;
        }
        let mut coords = [0.0f32; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            *slot = extract_number(value)?;
        }
        let [x0, y0, x1, y1] = coords;
        Some(Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        })
    }

    pub fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.x),
            Object::Real(self.y),
            Object::Real(self.x + self.width),
            Object::Real(self.y + self.height),
        ])
    }
}

/// Look up a page attribute, walking up the page tree for inherited values
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut dict = doc.get_dictionary(page_id)?;
    // Bounded walk guards against cyclic Parent links
    for _ in 0..64 {
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent_id) => dict = doc.get_dictionary(parent_id)?,
            Err(_) => break,
        }
    }
    Ok(None)
}

/// Resolve a reference to its target, leaving direct objects untouched
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Get the page's MediaBox, defaulting to US Letter when absent or malformed
pub fn get_page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let Some(media_box) = inherited_attribute(doc, page_id, b"MediaBox")? else {
        return Ok(PageBox::default());
    };
    Ok(resolve(doc, media_box)?
        .as_array()
        .ok()
        .and_then(|values| PageBox::from_array(values))
        .unwrap_or_default())
}

/// Get source page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let page_box = get_page_box(doc, page_id)?;
    Ok((page_box.width, page_box.height))
}

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// XObject Creation
// =============================================================================

/// Wrap a source page in a Form XObject inside the output document.
///
/// The XObject's BBox is the page's MediaBox, so drawing it with an identity
/// matrix reproduces the page in its own coordinate space.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_box = get_page_box(source, page_id)?;
    let content_data = get_page_content(source, page_id)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", page_box.to_object());
    xobject_dict.set("FormType", Object::Integer(1));

    if let Some(resources) = inherited_attribute(source, page_id, b"Resources")? {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

// =============================================================================
// Page Content Extraction
// =============================================================================

/// Get the decoded content stream data of a page.
fn get_page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page_dict = doc.get_dictionary(page_id)?;
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => resolve(doc, c)?,
        Err(_) => return Ok(Vec::new()), // No content = blank page
    };

    match contents {
        Object::Stream(stream) => Ok(stream_bytes(stream)),
        Object::Array(arr) => get_concatenated_content_streams(doc, arr),
        _ => Ok(Vec::new()),
    }
}

fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Concatenate multiple content streams
fn get_concatenated_content_streams(doc: &Document, refs: &[Object]) -> Result<Vec<u8>> {
    let mut result = Vec::new();

    for obj in refs {
        if let Ok(stream) = resolve(doc, obj)?.as_stream() {
            result.extend_from_slice(&stream_bytes(stream));
            result.push(b'\n');
        }
    }

    Ok(result)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            // Reserve the id before recursing so cycles resolve to it
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}
