#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_rebrand::*;

/// One page of a generated test document
#[derive(Clone, Copy)]
pub struct TestPage {
    pub width: i64,
    pub height: i64,
    pub rotate: Option<i64>,
}

impl TestPage {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            rotate: None,
        }
    }

    pub fn rotated(width: i64, height: i64, rotate: i64) -> Self {
        Self {
            width,
            height,
            rotate: Some(rotate),
        }
    }
}

fn int_array(values: &[i64]) -> Object {
    Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
}

pub fn create_test_pdf(pages: &[TestPage]) -> Document {
    let mut doc = Document::with_version("1.7");

    // Create page tree root ID
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        let body = format!("q 0 0 1 rg 10 10 50 50 re f Q % page {}", index + 1);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), body.into_bytes()));

        let mut page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("MediaBox", int_array(&[0, 0, page.width, page.height])),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]);
        if let Some(rotate) = page.rotate {
            page_dict.set("Rotate", Object::Integer(rotate));
        }
        let page_id = doc.add_object(page_dict);
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(pages.len() as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    // Create catalog
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

pub fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

pub fn test_pdf_bytes(pages: &[TestPage]) -> Vec<u8> {
    to_bytes(create_test_pdf(pages))
}

/// A document whose only page inherits MediaBox and Rotate from the
/// page tree root
pub fn inherited_attributes_pdf(width: i64, height: i64, rotate: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
    let page_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        ("Contents", Object::Reference(content_id)),
    ]));
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
        ("Count", Object::Integer(1)),
        ("MediaBox", int_array(&[0, 0, width, height])),
        ("Rotate", Object::Integer(rotate)),
        ("Resources", Object::Dictionary(Dictionary::new())),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);
    to_bytes(doc)
}

// =============================================================================
// Font and image fixtures
// =============================================================================

fn push_table(tables: &mut Vec<([u8; 4], Vec<u8>)>, tag: &[u8; 4], data: Vec<u8>) {
    tables.push((*tag, data));
}

/// A minimal TrueType program covering printable ASCII.
///
/// Glyph 0 is `.notdef`; U+0020..=U+007E map to glyphs 1..=95. Every glyph
/// advances 500 units on a 1000-unit em.
pub fn test_font_program() -> Vec<u8> {
    const NUM_GLYPHS: u16 = 96;

    let mut head = Vec::with_capacity(54);
    head.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
    head.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // fontRevision
    head.extend_from_slice(&0u32.to_be_bytes()); // checkSumAdjustment
    head.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
    head.extend_from_slice(&0u16.to_be_bytes()); // flags
    head.extend_from_slice(&1000u16.to_be_bytes()); // unitsPerEm
    head.extend_from_slice(&0i64.to_be_bytes()); // created
    head.extend_from_slice(&0i64.to_be_bytes()); // modified
    for v in [0i16, -200, 500, 800] {
        head.extend_from_slice(&v.to_be_bytes()); // bbox
    }
    head.extend_from_slice(&0u16.to_be_bytes()); // macStyle
    head.extend_from_slice(&8u16.to_be_bytes()); // lowestRecPPEM
    head.extend_from_slice(&2i16.to_be_bytes()); // fontDirectionHint
    head.extend_from_slice(&0i16.to_be_bytes()); // indexToLocFormat
    head.extend_from_slice(&0i16.to_be_bytes()); // glyphDataFormat

    let mut hhea = Vec::with_capacity(36);
    hhea.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    hhea.extend_from_slice(&800i16.to_be_bytes()); // ascender
    hhea.extend_from_slice(&(-200i16).to_be_bytes()); // descender
    hhea.extend_from_slice(&0i16.to_be_bytes()); // lineGap
    hhea.extend_from_slice(&500u16.to_be_bytes()); // advanceWidthMax
    hhea.extend_from_slice(&[0u8; 22]);
    hhea.extend_from_slice(&NUM_GLYPHS.to_be_bytes()); // numberOfHMetrics

    let mut maxp = Vec::with_capacity(6);
    maxp.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    maxp.extend_from_slice(&NUM_GLYPHS.to_be_bytes());

    let mut hmtx = Vec::with_capacity(NUM_GLYPHS as usize * 4);
    for _ in 0..NUM_GLYPHS {
        hmtx.extend_from_slice(&500u16.to_be_bytes());
        hmtx.extend_from_slice(&0i16.to_be_bytes());
    }

    let mut cmap = Vec::new();
    cmap.extend_from_slice(&0u16.to_be_bytes()); // version
    cmap.extend_from_slice(&1u16.to_be_bytes()); // numTables
    cmap.extend_from_slice(&3u16.to_be_bytes()); // platform: Windows
    cmap.extend_from_slice(&10u16.to_be_bytes()); // encoding: Unicode full
    cmap.extend_from_slice(&12u32.to_be_bytes()); // subtable offset
    cmap.extend_from_slice(&12u16.to_be_bytes()); // format 12
    cmap.extend_from_slice(&0u16.to_be_bytes());
    cmap.extend_from_slice(&28u32.to_be_bytes()); // length
    cmap.extend_from_slice(&0u32.to_be_bytes()); // language
    cmap.extend_from_slice(&1u32.to_be_bytes()); // numGroups
    cmap.extend_from_slice(&0x20u32.to_be_bytes());
    cmap.extend_from_slice(&0x7Eu32.to_be_bytes());
    cmap.extend_from_slice(&1u32.to_be_bytes());

    // Table records must be sorted by tag.
    let mut tables = Vec::new();
    push_table(&mut tables, b"cmap", cmap);
    push_table(&mut tables, b"head", head);
    push_table(&mut tables, b"hhea", hhea);
    push_table(&mut tables, b"hmtx", hmtx);
    push_table(&mut tables, b"maxp", maxp);

    let num_tables = tables.len() as u16;
    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&num_tables.to_be_bytes());
    font.extend_from_slice(&64u16.to_be_bytes()); // searchRange
    font.extend_from_slice(&2u16.to_be_bytes()); // entrySelector
    font.extend_from_slice(&(num_tables * 16 - 64).to_be_bytes()); // rangeShift

    let mut offset = 12 + 16 * tables.len() as u32;
    let mut body = Vec::new();
    for (tag, data) in &tables {
        font.extend_from_slice(tag);
        font.extend_from_slice(&0u32.to_be_bytes()); // checksum
        font.extend_from_slice(&offset.to_be_bytes());
        font.extend_from_slice(&(data.len() as u32).to_be_bytes());

        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() as u32 + body.len() as u32;
    }
    font.extend_from_slice(&body);
    font
}

pub fn test_fonts() -> FontSet {
    FontSet {
        regular: test_font_program(),
        bold: test_font_program(),
    }
}

/// A small PNG; translucent when `alpha < 255`
pub fn test_png(alpha: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 30, 30, alpha]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

pub fn basic_profile() -> ResolvedProfile {
    ResolvedProfile {
        company_name: Some("Sakura Realty".to_string()),
        address: Some("1-2-3 Shibuya, Tokyo".to_string()),
        phone: Some("03-1234-5678".to_string()),
        email: Some("info@sakura.example".to_string()),
        license_number: Some("Tokyo (1) 12345".to_string()),
        ..Default::default()
    }
}

pub fn request(sources: Vec<Vec<u8>>, pages: Vec<PageJob>, profile: ResolvedProfile) -> CompositionRequest {
    CompositionRequest {
        sources: sources.into_iter().map(SourceDocument::new).collect(),
        pages,
        profile,
        fonts: test_fonts(),
        options: ComposeOptions {
            compress_streams: false,
            ..Default::default()
        },
    }
}

/// A page job carrying the generated initial blocks for its source page
pub fn prepared_job(source_bytes: &[u8], source: usize, page: u32, profile: &ResolvedProfile) -> PageJob {
    prepare_page(source_bytes, page, profile).unwrap().to_job(source)
}

/// Decoded content of every stream on an output page, concatenated
pub fn page_content(doc: &Document, page_id: ObjectId) -> String {
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Names in one resource category (`Font`, `XObject`) of a page
pub fn resource_names(doc: &Document, page_id: ObjectId, category: &[u8]) -> Vec<String> {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = match page.get(b"Resources").unwrap() {
        Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
        Object::Dictionary(dict) => dict,
        other => panic!("unexpected resources {:?}", other),
    };
    let Ok(entry) = resources.get(category) else {
        return Vec::new();
    };
    let dict = match entry {
        Object::Reference(id) => doc.get_dictionary(*id).unwrap(),
        Object::Dictionary(dict) => dict,
        other => panic!("unexpected {:?}", other),
    };
    dict.iter()
        .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
        .collect()
}
