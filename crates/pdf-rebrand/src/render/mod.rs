//! PDF rendering modules for composition
//!
//! This module handles all PDF-specific operations:
//! - Copying source pages (and everything they reference) into the output
//! - Building the overlay content stream
//! - Embedding fonts and images as shared resources

mod content;
mod font;
mod page;
mod xobject;

pub(crate) use content::ContentBuilder;
pub(crate) use font::{EmbeddedFont, FontProgram};
pub use page::PageGeometry;
pub(crate) use page::{Resources, append_overlay, import_page};
pub(crate) use xobject::embed_image;

use crate::types::Result;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Object, Stream};
use std::io::Write;

/// Zlib-compress a stream body for `/FlateDecode`
pub(crate) fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Build a stream object, flate-compressing the body when asked
pub(crate) fn make_stream(mut dict: Dictionary, content: Vec<u8>, compress: bool) -> Result<Stream> {
    if compress {
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        Ok(Stream::new(dict, deflate(&content)?).with_compression(false))
    } else {
        Ok(Stream::new(dict, content).with_compression(false))
    }
}

/// Extract numeric value from a PDF object
pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Format a number for a content stream operand
pub(crate) fn fmt_num(value: f32) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == rounded.trunc() {
        // Avoid "-0".
        format!("{}", rounded.trunc() as i64)
    } else {
        let s = format!("{:.4}", rounded);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
