//! Source page import
//!
//! A source page is copied into the output document as a page of its own,
//! not wrapped in a Form XObject, so its declared rotation and boxes keep
//! their meaning for the viewer. Attributes a page inherits from its page
//! tree ancestors are resolved and written directly onto the copy.

use super::extract_number;
use crate::constants::{DEFAULT_PAGE_DIMENSIONS, MAX_PAGE_TREE_DEPTH};
use crate::geometry::{DisplayToPdf, Point};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Dictionary keys that are not carried over to the copied page
const SKIPPED_PAGE_KEYS: &[&[u8]] = &[b"Parent", b"Annots", b"B", b"StructParents"];

/// Attributes a page may inherit from its ancestors
const INHERITABLE_KEYS: &[&[u8]] = &[b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

// =============================================================================
// Page Geometry
// =============================================================================

/// Size, rotation and box origin of a source page
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageGeometry {
    /// Unrotated size of the visible box
    pub raw: PageSize,
    pub rotation: Rotation,
    /// Lower-left corner of the visible box in default user space
    pub box_origin: Point,
}

impl PageGeometry {
    /// Read a page's geometry, following inherited attributes.
    ///
    /// The visible box is the CropBox when present, else the MediaBox, else
    /// US Letter.
    pub fn read(doc: &Document, page_id: ObjectId) -> Result<Self> {
        let visible = [b"CropBox".as_slice(), b"MediaBox".as_slice()]
            .into_iter()
            .find_map(|key| {
                inherited_attribute(doc, page_id, key)
                    .ok()
                    .flatten()
                    .and_then(|obj| parse_box(doc, obj))
            });

        let (llx, lly, width, height) = match visible {
            Some((llx, lly, urx, ury)) => (llx, lly, urx - llx, ury - lly),
            None => (0.0, 0.0, DEFAULT_PAGE_DIMENSIONS.0, DEFAULT_PAGE_DIMENSIONS.1),
        };

        let rotate = match inherited_attribute(doc, page_id, b"Rotate")? {
            Some(Object::Integer(degrees)) => *degrees,
            Some(Object::Real(degrees)) if degrees.fract() == 0.0 => *degrees as i64,
            // No fractional angle is a quarter turn.
            Some(Object::Real(degrees)) => {
                return Err(RebrandError::UnsupportedRotation(degrees.trunc() as i64));
            }
            Some(other) => {
                return Err(RebrandError::Config(format!(
                    "Rotate must be an integer, got {:?}",
                    other
                )));
            }
            None => 0,
        };

        Ok(Self {
            raw: PageSize::new(width, height),
            rotation: Rotation::from_degrees(rotate)?,
            box_origin: Point::new(llx, lly),
        })
    }

    /// Size as the viewer shows it
    pub fn display_size(&self) -> DisplaySize {
        self.raw.display_size(self.rotation)
    }

    pub fn to_pdf(&self) -> DisplayToPdf {
        DisplayToPdf::new(self.rotation, self.raw)
    }

    /// True when the visible box does not start at the user space origin
    pub fn has_offset(&self) -> bool {
        self.box_origin.x != 0.0 || self.box_origin.y != 0.0
    }
}

/// Parse a `[llx lly urx ury]` box, normalizing swapped corners
fn parse_box(doc: &Document, obj: &Object) -> Option<(f32, f32, f32, f32)> {
    let arr = resolve(doc, obj).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let n: Vec<f32> = arr
        .iter()
        .map(|v| extract_number(resolve(doc, v)))
        .collect::<Option<_>>()?;
    let (llx, urx) = (n[0].min(n[2]), n[0].max(n[2]));
    let (lly, ury) = (n[1].min(n[3]), n[1].max(n[3]));
    (urx - llx > 0.0 && ury - lly > 0.0).then_some((llx, lly, urx, ury))
}

static NULL: Object = Object::Null;

/// Follow a single reference; anything unresolvable reads as null
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(&NULL),
        other => other,
    }
}

/// Look up `key` on the page, then on each ancestor in the page tree
fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(resolve(doc, value)));
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => node = doc.get_dictionary(*parent)?,
            _ => return Ok(None),
        }
    }
    Err(RebrandError::Config(format!(
        "Page tree deeper than {} levels",
        MAX_PAGE_TREE_DEPTH
    )))
}

// =============================================================================
// Page Import
// =============================================================================

/// Copy a source page into `output`, returning its new dictionary.
///
/// The returned dictionary has no `Parent` yet and its `Contents` is a flat
/// array of stream references. Its `Resources` is a direct dictionary
/// whose `Font` and `XObject` entries are direct as well, ready for
/// [`Resources`] to extend.
///
/// # Arguments
/// * `output` - The output document to copy objects into
/// * `source` - The source document containing the page
/// * `page_id` - The object ID of the source page
/// * `cache` - Source-to-output id map shared by every page of `source`
pub(crate) fn import_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let page_dict = source.get_dictionary(page_id)?;

    let mut new_page = Dictionary::new();
    for (key, value) in page_dict.iter() {
        let key = key.as_slice();
        if SKIPPED_PAGE_KEYS.contains(&key) || INHERITABLE_KEYS.contains(&key) || key == b"Contents" {
            continue;
        }
        new_page.set(key.to_vec(), copy_object_deep(output, source, value, cache)?);
    }
    new_page.set("Type", Object::Name(b"Page".to_vec()));

    for &key in INHERITABLE_KEYS {
        if let Some(value) = inherited_attribute(source, page_id, key)? {
            if key != b"Resources" {
                new_page.set(key.to_vec(), copy_object_deep(output, source, value, cache)?);
            }
        }
    }
    if new_page.get(b"MediaBox").is_err() {
        new_page.set("MediaBox", default_media_box());
    }

    let resources = match inherited_attribute(source, page_id, b"Resources")? {
        Some(value) => copy_object_deep(output, source, value, cache)?,
        None => Object::Dictionary(Dictionary::new()),
    };
    new_page.set("Resources", flatten_resources(output, resources));

    let mut contents = Vec::new();
    for stream in content_streams(source, page_dict) {
        match stream {
            Object::Reference(_) => {
                let copied = copy_object_deep(output, source, stream, cache)?;
                if matches!(copied, Object::Reference(_)) {
                    contents.push(copied);
                }
            }
            Object::Stream(_) => {
                let copied = copy_object_deep(output, source, stream, cache)?;
                contents.push(Object::Reference(output.add_object(copied)));
            }
            _ => {}
        }
    }
    new_page.set("Contents", Object::Array(contents));

    Ok(new_page)
}

/// Get default MediaBox for US Letter size
fn default_media_box() -> Object {
    Object::Array(vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.0 as i64),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.1 as i64),
    ])
}

/// The page's content stream objects in order
fn content_streams<'a>(doc: &'a Document, page_dict: &'a Dictionary) -> Vec<&'a Object> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Vec::new(), // No content = blank page
    };

    match contents {
        Object::Reference(id) => match doc.get_object(*id) {
            // An indirect array of streams.
            Ok(Object::Array(arr)) => arr.iter().collect(),
            Ok(_) => vec![contents],
            Err(_) => Vec::new(),
        },
        Object::Array(arr) => arr.iter().collect(),
        other => vec![other],
    }
}

/// Make the copied Resources and its Font/XObject subdictionaries direct
fn flatten_resources(output: &Document, resources: Object) -> Object {
    let mut dict = match direct_dictionary(output, resources) {
        Some(dict) => dict,
        None => Dictionary::new(),
    };
    for key in [b"Font".as_slice(), b"XObject".as_slice()] {
        if let Ok(value) = dict.get(key) {
            let sub = direct_dictionary(output, value.clone()).unwrap_or_default();
            dict.set(key.to_vec(), Object::Dictionary(sub));
        }
    }
    Object::Dictionary(dict)
}

fn direct_dictionary(output: &Document, obj: Object) -> Option<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Reference(id) => output.get_dictionary(id).ok().cloned(),
        _ => None,
    }
}

// =============================================================================
// Overlay
// =============================================================================

/// Append an overlay content stream to an imported page.
///
/// The original streams are bracketed by `q`/`Q` so graphics state they
/// leave behind cannot leak into the overlay.
pub(crate) fn append_overlay(output: &mut Document, page: &mut Dictionary, overlay: Stream) {
    let mut contents = match page.get(b"Contents") {
        Ok(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    };

    let open = output.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()).with_compression(false));
    let close = output.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()).with_compression(false));
    let overlay = output.add_object(overlay);

    contents.insert(0, Object::Reference(open));
    contents.push(Object::Reference(close));
    contents.push(Object::Reference(overlay));
    page.set("Contents", Object::Array(contents));
}

/// Resource registration on one imported page
pub(crate) struct Resources<'a> {
    page: &'a mut Dictionary,
}

impl<'a> Resources<'a> {
    pub(crate) fn new(page: &'a mut Dictionary) -> Self {
        Self { page }
    }

    /// Register a font under `preferred` (or a free variant of it) and
    /// return the name actually used
    pub(crate) fn add_font(&mut self, preferred: &str, id: ObjectId) -> String {
        self.add(b"Font", preferred, id)
    }

    pub(crate) fn add_xobject(&mut self, preferred: &str, id: ObjectId) -> String {
        self.add(b"XObject", preferred, id)
    }

    fn add(&mut self, category: &[u8], preferred: &str, id: ObjectId) -> String {
        let mut resources = take_dictionary(self.page, b"Resources");
        let mut sub = take_dictionary(&mut resources, category);

        let mut name = preferred.to_string();
        let mut suffix = 1;
        let exists = loop {
            match sub.get(name.as_bytes()) {
                Ok(Object::Reference(existing)) if *existing == id => break true,
                Ok(_) => {
                    suffix += 1;
                    name = format!("{}_{}", preferred, suffix);
                }
                Err(_) => break false,
            }
        };
        if !exists {
            sub.set(name.as_bytes().to_vec(), Object::Reference(id));
        }

        resources.set(category.to_vec(), Object::Dictionary(sub));
        self.page.set("Resources", Object::Dictionary(resources));
        name
    }
}

/// Remove a direct subdictionary for editing; anything else reads as empty
fn take_dictionary(dict: &mut Dictionary, key: &[u8]) -> Dictionary {
    match dict.remove(key) {
        Some(Object::Dictionary(sub)) => sub,
        _ => Dictionary::new(),
    }
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// The output id is reserved before the referenced object is copied, so
/// reference cycles terminate. References to page tree nodes become null;
/// the only page copied is the one being imported.
pub(crate) fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            // Check cache first
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let Ok(referenced) = source.get_object(*id) else {
                return Ok(Object::Null);
            };
            if is_page_tree_node(referenced) {
                return Ok(Object::Null);
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(output, source, dict, cache)?)),
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

fn is_page_tree_node(obj: &Object) -> bool {
    obj.as_dict()
        .and_then(|dict| dict.get(b"Type"))
        .and_then(Object::as_name)
        .map(|name| name == b"Page" || name == b"Pages")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_array(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|&v| Object::Integer(v)).collect())
    }

    fn tree_with_inherited_attributes() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"BT ET".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));

        let fonts = Dictionary::from_iter(vec![("F1", Object::Reference(font_id))]);
        let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
            ("Rotate", Object::Integer(90)),
            ("MediaBox", int_array(&[0, 0, 600, 800])),
            ("Resources", Object::Dictionary(resources)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        (doc, page_id)
    }

    #[test]
    fn test_geometry_follows_inheritance() {
        let (doc, page_id) = tree_with_inherited_attributes();
        let geometry = PageGeometry::read(&doc, page_id).unwrap();
        assert_eq!(geometry.raw, PageSize::new(600.0, 800.0));
        assert_eq!(geometry.rotation, Rotation::Deg90);
        assert_eq!(geometry.display_size(), DisplaySize::new(800.0, 600.0));
        assert!(!geometry.has_offset());
    }

    #[test]
    fn test_crop_box_wins_and_sets_origin() {
        let (mut doc, page_id) = tree_with_inherited_attributes();
        let page = doc.get_dictionary_mut(page_id).unwrap();
        page.set("CropBox", int_array(&[50, 40, 550, 740]));
        let geometry = PageGeometry::read(&doc, page_id).unwrap();
        assert_eq!(geometry.raw, PageSize::new(500.0, 700.0));
        assert_eq!(geometry.box_origin, Point::new(50.0, 40.0));
    }

    #[test]
    fn test_non_quarter_rotation_rejected() {
        let (mut doc, page_id) = tree_with_inherited_attributes();
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Rotate", Object::Integer(45));
        assert!(matches!(
            PageGeometry::read(&doc, page_id),
            Err(RebrandError::UnsupportedRotation(45))
        ));
    }

    #[test]
    fn test_fractional_rotation_rejected() {
        let (mut doc, page_id) = tree_with_inherited_attributes();
        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Rotate", Object::Real(90.5));
        assert!(matches!(
            PageGeometry::read(&doc, page_id),
            Err(RebrandError::UnsupportedRotation(90))
        ));

        doc.get_dictionary_mut(page_id)
            .unwrap()
            .set("Rotate", Object::Real(180.0));
        assert_eq!(PageGeometry::read(&doc, page_id).unwrap().rotation, Rotation::Deg180);
    }

    #[test]
    fn test_import_materializes_inherited_attributes() {
        let (source, page_id) = tree_with_inherited_attributes();
        let mut output = Document::with_version("1.7");
        let mut cache = HashMap::new();
        let page = import_page(&mut output, &source, page_id, &mut cache).unwrap();

        assert!(page.get(b"Parent").is_err());
        assert_eq!(page.get(b"Rotate").unwrap(), &Object::Integer(90));
        assert!(page.get(b"MediaBox").is_ok());
        let fonts = page
            .get(b"Resources")
            .and_then(Object::as_dict)
            .and_then(|r| r.get(b"Font"))
            .and_then(Object::as_dict)
            .unwrap();
        assert!(fonts.get(b"F1").is_ok());
        let contents = page.get(b"Contents").and_then(Object::as_array).unwrap();
        assert_eq!(contents.len(), 1);
    }

    #[test]
    fn test_deep_copy_terminates_on_cycles() {
        let mut source = Document::with_version("1.7");
        let a = source.new_object_id();
        let b = source.add_object(Dictionary::from_iter(vec![("Next", Object::Reference(a))]));
        source.objects.insert(
            a,
            Object::Dictionary(Dictionary::from_iter(vec![("Next", Object::Reference(b))])),
        );

        let mut output = Document::with_version("1.7");
        let mut cache = HashMap::new();
        let copied = copy_object_deep(&mut output, &source, &Object::Reference(a), &mut cache).unwrap();
        assert!(matches!(copied, Object::Reference(_)));
        assert_eq!(output.objects.len(), 2);
    }

    #[test]
    fn test_resource_names_avoid_collisions() {
        let fonts = Dictionary::from_iter(vec![("RbF1", Object::Reference((40, 0)))]);
        let resources = Dictionary::from_iter(vec![("Font", Object::Dictionary(fonts))]);
        let mut page = Dictionary::from_iter(vec![("Resources", Object::Dictionary(resources))]);
        let mut resources = Resources::new(&mut page);
        assert_eq!(resources.add_font("RbF1", (7, 0)), "RbF1_2");
        assert_eq!(resources.add_font("RbF1", (7, 0)), "RbF1_2");
        assert_eq!(resources.add_xobject("RbIm1", (8, 0)), "RbIm1");
    }
}
