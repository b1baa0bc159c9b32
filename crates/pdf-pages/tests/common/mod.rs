#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_pages::raster::{RasterDocument, Rasterizer};
use pdf_pages::render::get_page_dimensions;
use pdf_pages::{PagesError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build a PDF whose pages have the given sizes. Page `n` (1-based) draws the
/// text marker `(<label> n)` so copies can be identified.
pub fn create_sized_pdf(label: &str, sizes: &[(i64, i64)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::new();
    for (idx, &(width, height)) in sizes.iter().enumerate() {
        let content = format!("BT /F1 12 Tf 20 20 Td ({} {}) Tj ET", label, idx + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut fonts = Dictionary::new();
        fonts.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(sizes.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    save(doc)
}

/// Letter-sized pages
pub fn create_test_pdf(label: &str, num_pages: usize) -> Vec<u8> {
    create_sized_pdf(label, &vec![(612, 792); num_pages])
}

/// Pages whose MediaBox and Resources live on the page tree node only
pub fn create_inherited_pdf(label: &str, num_pages: usize, width: i64, height: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for idx in 0..num_pages {
        let content = format!("BT 20 20 Td ({} {}) Tj ET", label, idx + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ]),
        ),
        ("Resources", Object::Dictionary(Dictionary::new())),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    save(doc)
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

/// Pages whose content stream points at an object that does not exist.
/// The document parses, but copying or embedding a page fails.
pub fn create_dangling_content_pdf(num_pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1224),
                    Object::Integer(792),
                ]),
            ),
            ("Contents", Object::Reference((9999, 0))),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    save(doc)
}

pub fn load(bytes: &[u8]) -> Document {
    Document::load_mem(bytes).unwrap()
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Decoded content stream of a page, as text
pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// Text of the Form XObject drawn on a split page
pub fn drawn_xobject_text(doc: &Document, page_id: ObjectId) -> String {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let xobject_id = xobjects.get(b"Sp").unwrap().as_reference().unwrap();
    let stream = doc.get_object(xobject_id).unwrap().as_stream().unwrap();
    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    String::from_utf8_lossy(&content).into_owned()
}

pub fn dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    get_page_dimensions(doc, page_id).unwrap()
}

/// In-process rasterizer producing flat grey images sized like the page
#[derive(Default)]
pub struct FakeRasterizer {
    pub fail_open: bool,
    pub fail_pages: HashSet<usize>,
    pub renders: AtomicUsize,
    pub opens: AtomicUsize,
}

impl FakeRasterizer {
    pub fn failing_pages(pages: &[usize]) -> Self {
        Self {
            fail_pages: pages.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl Rasterizer for FakeRasterizer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn RasterDocument + 'a>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(PagesError::Render("renderer unavailable".to_string()));
        }
        let doc = Document::load_mem(bytes)?;
        let sizes = doc
            .get_pages()
            .into_values()
            .map(|id| get_page_dimensions(&doc, id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(FakeDocument {
            sizes,
            rasterizer: self,
        }))
    }
}

struct FakeDocument<'a> {
    sizes: Vec<(f32, f32)>,
    rasterizer: &'a FakeRasterizer,
}

impl RasterDocument for FakeDocument<'_> {
    fn page_count(&self) -> usize {
        self.sizes.len()
    }

    fn page_size(&self, page_index: usize) -> Result<(f32, f32)> {
        self.sizes
            .get(page_index)
            .copied()
            .ok_or(PagesError::IndexOutOfRange {
                index: page_index,
                len: self.sizes.len(),
            })
    }

    fn render(&self, page_index: usize, scale: f32) -> Result<DynamicImage> {
        if self.rasterizer.fail_pages.contains(&page_index) {
            return Err(PagesError::Render(format!("page {} is broken", page_index)));
        }
        let (width, height) = self.page_size(page_index)?;
        self.rasterizer.renders.fetch_add(1, Ordering::SeqCst);
        let width = ((width * scale) as u32).max(1);
        let height = ((height * scale) as u32).max(1);
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([200, 200, 200]),
        )))
    }
}
