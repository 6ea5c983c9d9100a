//! Font embedding
//!
//! Profile text can be any script, so fonts are embedded as Type0 composite
//! fonts with `Identity-H` encoding: each drawn character is written as its
//! two-byte glyph id. Glyph usage is tracked while pages are drawn and the
//! width array and ToUnicode map are written once every page is done.

use super::make_stream;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use ttf_parser::GlyphId;

/// Outline format of a font program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontProgramKind {
    TrueType,
    OpenTypeCff,
}

/// Face metrics in 1000-unit glyph space
#[derive(Debug, Clone)]
struct FontMetrics {
    units_per_em: u16,
    ascent: i64,
    descent: i64,
    cap_height: i64,
    italic_angle: f32,
    bbox: [i64; 4],
    missing_width: i64,
    fixed_pitch: bool,
}

/// A parsed, validated font program
#[derive(Debug, Clone)]
pub(crate) struct FontProgram {
    data: Vec<u8>,
    base_name: String,
    kind: FontProgramKind,
    metrics: FontMetrics,
}

impl FontProgram {
    /// Parse a TrueType or OpenType program.
    ///
    /// `fallback_name` is used as the base font name when the face has no
    /// PostScript name.
    pub(crate) fn parse(data: Vec<u8>, fallback_name: &str) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| RebrandError::FontEmbedFailure(format!("{}: {}", fallback_name, e)))?;

        let units_per_em = face.units_per_em().max(1);
        let scale = |v: i16| (v as f32 * 1000.0 / units_per_em as f32).round() as i64;
        let bbox = face.global_bounding_box();
        let ascent = scale(face.ascender());
        let missing_width = face
            .glyph_hor_advance(GlyphId(0))
            .map(|adv| scale_advance(adv, units_per_em))
            .unwrap_or(0);

        let metrics = FontMetrics {
            units_per_em,
            ascent,
            descent: scale(face.descender()),
            cap_height: face.capital_height().map(scale).unwrap_or(ascent),
            italic_angle: face.italic_angle().unwrap_or(0.0),
            bbox: [
                scale(bbox.x_min),
                scale(bbox.y_min),
                scale(bbox.x_max),
                scale(bbox.y_max),
            ],
            missing_width,
            fixed_pitch: face.is_monospaced(),
        };

        let kind = if face.tables().cff.is_some() {
            FontProgramKind::OpenTypeCff
        } else {
            FontProgramKind::TrueType
        };

        let base_name = postscript_name(&face)
            .map(|name| sanitize_font_name(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| sanitize_font_name(fallback_name));

        Ok(Self {
            data,
            base_name,
            kind,
            metrics,
        })
    }

    pub(crate) fn base_name(&self) -> &str {
        &self.base_name
    }

    fn face(&self) -> Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0)
            .map_err(|e| RebrandError::FontEmbedFailure(format!("{}: {}", self.base_name, e)))
    }
}

fn scale_advance(advance: u16, units_per_em: u16) -> i64 {
    (advance as f32 * 1000.0 / units_per_em as f32).round() as i64
}

fn postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    use ttf_parser::name::name_id;

    face.names()
        .into_iter()
        .filter(|entry| entry.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|entry| entry.to_string())
}

fn sanitize_font_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// A run of text encoded for an `Identity-H` font
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EncodedText {
    /// Hex string operand, including the angle brackets
    pub hex: String,
    /// Advance width of the run at font size 1
    pub width: f32,
    /// Characters the font has no glyph for
    pub missing: String,
}

/// A font program being embedded into one output document
#[derive(Debug)]
pub(crate) struct EmbeddedFont {
    program: FontProgram,
    /// Type0 font object id, reserved on first use
    id: Option<ObjectId>,
    /// Glyphs drawn so far and the character each stands for
    used: BTreeMap<u16, char>,
}

impl EmbeddedFont {
    pub(crate) fn new(program: FontProgram) -> Self {
        Self {
            program,
            id: None,
            used: BTreeMap::new(),
        }
    }

    /// The Type0 font's object id; the object itself is written by
    /// [`EmbeddedFont::finish`]
    pub(crate) fn object_id(&mut self, output: &mut Document) -> ObjectId {
        *self.id.get_or_insert_with(|| output.new_object_id())
    }

    /// Map text to glyph ids, recording each glyph as used
    pub(crate) fn encode(&mut self, text: &str) -> Result<EncodedText> {
        let face = self.program.face()?;
        let units_per_em = self.program.metrics.units_per_em as f32;

        let mut hex = String::with_capacity(text.len() * 4 + 2);
        let mut width_units = 0u32;
        let mut missing = String::new();

        hex.push('<');
        for ch in text.chars() {
            let glyph = match face.glyph_index(ch) {
                Some(glyph) => {
                    self.used.entry(glyph.0).or_insert(ch);
                    glyph
                }
                None => {
                    if !missing.contains(ch) {
                        missing.push(ch);
                    }
                    GlyphId(0)
                }
            };
            width_units += face.glyph_hor_advance(glyph).unwrap_or(0) as u32;
            hex.push_str(&format!("{:04X}", glyph.0));
        }
        hex.push('>');

        Ok(EncodedText {
            hex,
            width: width_units as f32 / units_per_em,
            missing,
        })
    }

    /// Write the font objects. A font that was never drawn writes nothing.
    pub(crate) fn finish(self, output: &mut Document, compress: bool) -> Result<()> {
        let Some(type0_id) = self.id else {
            return Ok(());
        };
        let program = &self.program;
        let metrics = &program.metrics;
        let base_name = Object::Name(program.base_name.as_bytes().to_vec());

        // Font file
        let (file_key, file_dict) = font_file_dict(program.kind, program.data.len());
        let font_file_id = output.add_object(make_stream(file_dict, program.data.clone(), compress)?);

        // Descriptor
        let mut flags = 32;
        if metrics.fixed_pitch {
            flags |= 1;
        }
        let mut descriptor = Dictionary::new();
        descriptor.set("Type", Object::Name(b"FontDescriptor".to_vec()));
        descriptor.set("FontName", base_name.clone());
        descriptor.set("Flags", Object::Integer(flags));
        descriptor.set(
            "FontBBox",
            Object::Array(metrics.bbox.iter().map(|&v| Object::Integer(v)).collect()),
        );
        descriptor.set("ItalicAngle", Object::Real(metrics.italic_angle));
        descriptor.set("Ascent", Object::Integer(metrics.ascent));
        descriptor.set("Descent", Object::Integer(metrics.descent));
        descriptor.set("CapHeight", Object::Integer(metrics.cap_height));
        descriptor.set("StemV", Object::Integer(80));
        descriptor.set("MissingWidth", Object::Integer(metrics.missing_width));
        descriptor.set(file_key, Object::Reference(font_file_id));
        let descriptor_id = output.add_object(descriptor);

        // Descendant CID font
        let face = program.face()?;
        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for &gid in self.used.keys() {
            let advance = face
                .glyph_hor_advance(GlyphId(gid))
                .map(|adv| scale_advance(adv, metrics.units_per_em))
                .unwrap_or(metrics.missing_width);
            widths.push(Object::Integer(gid as i64));
            widths.push(Object::Array(vec![Object::Integer(advance)]));
        }

        let mut system_info = Dictionary::new();
        system_info.set("Registry", Object::string_literal("Adobe"));
        system_info.set("Ordering", Object::string_literal("Identity"));
        system_info.set("Supplement", Object::Integer(0));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", Object::Name(b"Font".to_vec()));
        let subtype: &[u8] = match program.kind {
            FontProgramKind::TrueType => b"CIDFontType2",
            FontProgramKind::OpenTypeCff => b"CIDFontType0",
        };
        cid_font.set("Subtype", Object::Name(subtype.to_vec()));
        cid_font.set("BaseFont", base_name.clone());
        cid_font.set("CIDSystemInfo", Object::Dictionary(system_info));
        cid_font.set("FontDescriptor", Object::Reference(descriptor_id));
        cid_font.set("DW", Object::Integer(metrics.missing_width));
        cid_font.set("W", Object::Array(widths));
        if program.kind == FontProgramKind::TrueType {
            cid_font.set("CIDToGIDMap", Object::Name(b"Identity".to_vec()));
        }
        let cid_font_id = output.add_object(cid_font);

        // ToUnicode
        let cmap = to_unicode_cmap(&self.used);
        let to_unicode_id = output.add_object(make_stream(Dictionary::new(), cmap.into_bytes(), compress)?);

        let mut type0 = Dictionary::new();
        type0.set("Type", Object::Name(b"Font".to_vec()));
        type0.set("Subtype", Object::Name(b"Type0".to_vec()));
        type0.set("BaseFont", base_name);
        type0.set("Encoding", Object::Name(b"Identity-H".to_vec()));
        type0.set("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)]));
        type0.set("ToUnicode", Object::Reference(to_unicode_id));
        output.objects.insert(type0_id, Object::Dictionary(type0));

        Ok(())
    }
}

/// Descriptor key and stream dictionary for an embedded font program
fn font_file_dict(kind: FontProgramKind, length: usize) -> (&'static str, Dictionary) {
    let mut dict = Dictionary::new();
    match kind {
        FontProgramKind::TrueType => {
            dict.set("Length1", Object::Integer(length as i64));
            ("FontFile2", dict)
        }
        FontProgramKind::OpenTypeCff => {
            dict.set("Subtype", Object::Name(b"OpenType".to_vec()));
            ("FontFile3", dict)
        }
    }
}

/// Build a ToUnicode CMap mapping each used glyph back to its character
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let entries: Vec<(u16, char)> = used.iter().map(|(g, c)| (*g, *c)).collect();

    let mut out = String::new();
    out.push_str("/CIDInit /ProcSet findresource begin\n");
    out.push_str("12 dict begin\n");
    out.push_str("begincmap\n");
    out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
    out.push_str("/CMapName /Adobe-Identity-UCS def\n");
    out.push_str("/CMapType 2 def\n");
    out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

    // At most 100 entries per block.
    for chunk in entries.chunks(100) {
        out.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, ch) in chunk {
            let mut units = [0u16; 2];
            let uni: String = ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            out.push_str(&format!("<{:04X}> <{}>\n", gid, uni));
        }
        out.push_str("endbfchar\n");
    }

    out.push_str("endcmap\n");
    out.push_str("CMapName currentdict /CMap defineresource pop\n");
    out.push_str("end\nend\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_unicode_handles_surrogates() {
        let mut used = BTreeMap::new();
        used.insert(3u16, 'A');
        used.insert(4u16, '\u{1F600}');
        let cmap = to_unicode_cmap(&used);
        assert!(cmap.contains("2 beginbfchar"));
        assert!(cmap.contains("<0003> <0041>"));
        assert!(cmap.contains("<0004> <D83DDE00>"));
    }

    #[test]
    fn test_to_unicode_splits_blocks() {
        let used: BTreeMap<u16, char> = (1..=150u16)
            .map(|g| (g, char::from_u32(0x4E00 + g as u32).unwrap()))
            .collect();
        let cmap = to_unicode_cmap(&used);
        assert!(cmap.contains("100 beginbfchar"));
        assert!(cmap.contains("50 beginbfchar"));
    }

    #[test]
    fn test_font_file_entries() {
        let (key, dict) = font_file_dict(FontProgramKind::TrueType, 1234);
        assert_eq!(key, "FontFile2");
        assert_eq!(dict.get(b"Length1").unwrap(), &Object::Integer(1234));
        assert!(dict.get(b"Subtype").is_err());

        let (key, dict) = font_file_dict(FontProgramKind::OpenTypeCff, 1234);
        assert_eq!(key, "FontFile3");
        assert!(dict.get(b"Length1").is_err());
        assert_eq!(dict.get(b"Subtype").unwrap(), &Object::Name(b"OpenType".to_vec()));
    }

    #[test]
    fn test_sanitize_font_name() {
        assert_eq!(sanitize_font_name("Noto Sans JP-Bold"), "NotoSansJP-Bold");
        assert_eq!(sanitize_font_name("(weird)/name"), "weirdname");
    }

    #[test]
    fn test_invalid_program_rejected() {
        let err = FontProgram::parse(b"not a font".to_vec(), "regular").unwrap_err();
        assert!(matches!(err, RebrandError::FontEmbedFailure(_)));
    }

    #[test]
    fn test_unused_font_writes_nothing() {
        let mut output = Document::with_version("1.7");
        let before = output.objects.len();
        let font = EmbeddedFont::new(FontProgram {
            data: Vec::new(),
            base_name: "Unused".to_string(),
            kind: FontProgramKind::TrueType,
            metrics: FontMetrics {
                units_per_em: 1000,
                ascent: 800,
                descent: -200,
                cap_height: 700,
                italic_angle: 0.0,
                bbox: [0, -200, 1000, 800],
                missing_width: 500,
                fixed_pitch: false,
            },
        });
        font.finish(&mut output, true).unwrap();
        assert_eq!(output.objects.len(), before);
    }
}
