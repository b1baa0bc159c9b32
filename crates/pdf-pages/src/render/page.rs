//! Output document construction
//!
//! `OutputDocument` owns the document being assembled and the list of page
//! references that becomes its page tree when finished.

use crate::constants::OUTPUT_PDF_VERSION;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

use super::xobject::{INHERITABLE_KEYS, PageBox, copy_object_deep, inherited_attribute};

/// A document under construction, pages appended in order
pub struct OutputDocument {
    doc: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut doc = Document::with_version(OUTPUT_PDF_VERSION);
        let pages_tree_id = doc.new_object_id();
        Self {
            doc,
            pages_tree_id,
            page_refs: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Mutable access for adding shared objects such as XObjects
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Copy a source page unchanged, including inherited attributes.
    ///
    /// `cache` maps source object ids to output ids and may be shared across
    /// calls that read from the same source document.
    pub fn copy_page(
        &mut self,
        source: &Document,
        page_id: ObjectId,
        cache: &mut HashMap<ObjectId, ObjectId>,
    ) -> Result<ObjectId> {
        // Annotations point back at their page through /P
        let new_page_id = match cache.get(&page_id) {
            Some(&id) => id,
            None => {
                let id = self.doc.new_object_id();
                cache.insert(page_id, id);
                id
            }
        };

        let page_dict = source.get_dictionary(page_id)?;
        let mut new_dict = Dictionary::new();
        for (key, value) in page_dict.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            new_dict.set(
                key.clone(),
                copy_object_deep(&mut self.doc, source, value, cache)?,
            );
        }

        for key in INHERITABLE_KEYS {
            if new_dict.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(source, page_id, key)? {
                new_dict.set(key, copy_object_deep(&mut self.doc, source, value, cache)?);
            }
        }

        new_dict.set("Parent", Object::Reference(self.pages_tree_id));
        self.doc
            .objects
            .insert(new_page_id, Object::Dictionary(new_dict));
        self.page_refs.push(Object::Reference(new_page_id));
        Ok(new_page_id)
    }

    /// Append a new page drawing named XObjects through `content`
    pub fn add_drawn_page(
        &mut self,
        media_box: PageBox,
        xobjects: Dictionary,
        content: String,
    ) -> ObjectId {
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_tree_id)),
            ("MediaBox", media_box.to_object()),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);
        let page_id = self.doc.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        page_id
    }

    /// Write the page tree and catalog
    pub fn finish(mut self) -> Document {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        self.doc
    }

    /// Finish and serialize
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let mut doc = self.finish();
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok(writer)
    }
}

/// Extract one page into a minimal standalone document
pub fn extract_page(source: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let mut output = OutputDocument::new();
    output.copy_page(source, page_id, &mut HashMap::new())?;
    output.into_bytes()
}
