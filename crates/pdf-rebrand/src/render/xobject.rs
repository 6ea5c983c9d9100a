//! Image XObject embedding
//!
//! JPEG data is passed through with `DCTDecode`. Everything else is decoded
//! and written as flate-compressed RGB, with the alpha channel as a soft
//! mask when any pixel is not opaque.

use super::make_stream;
use crate::types::*;
use image::{ColorType, ImageFormat};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Embed encoded image bytes as an Image XObject and return its id.
///
/// # Arguments
/// * `output` - The output document
/// * `key` - The image's source key, used in error messages
/// * `data` - Encoded image bytes (PNG or JPEG)
pub(crate) fn embed_image(output: &mut Document, key: &str, data: &[u8]) -> Result<ObjectId> {
    let fail = |reason: String| RebrandError::ImageEmbedFailure {
        key: key.to_string(),
        reason,
    };

    let format = image::guess_format(data).map_err(|e| fail(e.to_string()))?;
    let decoded = image::load_from_memory(data).map_err(|e| fail(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(fail("image has no pixels".to_string()));
    }

    if format == ImageFormat::Jpeg {
        let color_space: Option<&[u8]> = match decoded.color() {
            ColorType::L8 => Some(b"DeviceGray"),
            ColorType::Rgb8 => Some(b"DeviceRGB"),
            _ => None,
        };
        if let Some(color_space) = color_space {
            let mut dict = image_dict(width, height, color_space);
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            let stream = Stream::new(dict, data.to_vec()).with_compression(false);
            return Ok(output.add_object(stream));
        }
    }

    let rgba = decoded.to_rgba8();
    let pixels = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut dict = image_dict(width, height, b"DeviceRGB");
    if alpha.iter().any(|&a| a != u8::MAX) {
        let smask = make_stream(image_dict(width, height, b"DeviceGray"), alpha, true)?;
        dict.set("SMask", Object::Reference(output.add_object(smask)));
    }
    Ok(output.add_object(make_stream(dict, rgb, true)?))
}

fn image_dict(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}
