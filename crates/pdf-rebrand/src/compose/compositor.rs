//! Per-page overlay drawing
//!
//! Each output page is a copy of one source page plus an appended content
//! stream that paints the mask bands and draws the blocks over them.

use crate::constants::{BOLD_FONT_RESOURCE, IMAGE_RESOURCE_PREFIX, REGULAR_FONT_RESOURCE};
use crate::diagnostics::{PageLog, Warning};
use crate::geometry::{compute_mask_rects, image_placement, transform_rect, transform_text_anchor};
use crate::layout::{Block, FontWeight, ImageBlock, TextAlign, TextBlock, validate_blocks};
use crate::options::{CompositionRequest, PageJob};
use crate::profile::ImageResolution;
use crate::render::{
    ContentBuilder, EmbeddedFont, FontProgram, PageGeometry, Resources, append_overlay, embed_image,
    import_page, make_stream,
};
use super::load_source;
use crate::types::*;
use lopdf::{Dictionary, Document, ObjectId};
use std::collections::{BTreeMap, HashMap};

/// Fonts and images shared by every page of one output document
struct SharedResources {
    regular: EmbeddedFont,
    bold: EmbeddedFont,
    /// Image key to its XObject id and preferred resource name
    images: BTreeMap<String, (ObjectId, String)>,
}

impl SharedResources {
    fn font(&mut self, weight: FontWeight) -> (&mut EmbeddedFont, &'static str) {
        match weight {
            FontWeight::Normal => (&mut self.regular, REGULAR_FONT_RESOURCE),
            FontWeight::Bold => (&mut self.bold, BOLD_FONT_RESOURCE),
        }
    }

    /// Embed an image the first time its key is seen
    fn image(&mut self, output: &mut Document, key: &str, data: &[u8]) -> Result<(ObjectId, String)> {
        if let Some(entry) = self.images.get(key) {
            return Ok(entry.clone());
        }
        let id = embed_image(output, key, data)?;
        let name = format!("{}{}", IMAGE_RESOURCE_PREFIX, self.images.len() + 1);
        log::debug!("Embedded image {} as {}", key, name);
        self.images.insert(key.to_string(), (id, name.clone()));
        Ok((id, name))
    }
}

/// Counters and warnings for the page being drawn
#[derive(Default)]
struct DrawTally {
    text: usize,
    images: usize,
    skipped: usize,
    warnings: Vec<Warning>,
}

/// Draws every page of one composition request
pub(crate) struct Compositor<'r> {
    request: &'r CompositionRequest,
    /// Parsed sources, `None` for sources no page refers to
    sources: Vec<Option<Document>>,
    /// Source-to-output object id maps, one per source
    caches: Vec<HashMap<ObjectId, ObjectId>>,
    shared: SharedResources,
}

impl<'r> Compositor<'r> {
    /// Parse the fonts and every referenced source document once
    pub(crate) fn new(request: &'r CompositionRequest) -> Result<Self> {
        let regular = FontProgram::parse(request.fonts.regular.clone(), "RebrandRegular")?;
        let bold = FontProgram::parse(request.fonts.bold.clone(), "RebrandBold")?;
        log::debug!("Fonts: {} / {}", regular.base_name(), bold.base_name());

        let mut sources: Vec<Option<Document>> = (0..request.sources.len()).map(|_| None).collect();
        for job in &request.pages {
            if sources[job.source].is_none() {
                let bytes = &request.sources[job.source].bytes;
                sources[job.source] = Some(load_source(bytes, job.source, job.page_number)?);
            }
        }

        Ok(Self {
            request,
            sources,
            caches: vec![HashMap::new(); request.sources.len()],
            shared: SharedResources {
                regular: EmbeddedFont::new(regular),
                bold: EmbeddedFont::new(bold),
                images: BTreeMap::new(),
            },
        })
    }

    /// Copy one source page into `output` and draw its overlay.
    ///
    /// Returns the finished page dictionary (without `Parent`) and its log.
    pub(crate) fn compose_page(
        &mut self,
        output: &mut Document,
        page_index: usize,
        job: &PageJob,
    ) -> Result<(Dictionary, PageLog)> {
        let unreadable = |reason: String| RebrandError::SourcePageUnreadable {
            source_index: job.source,
            page: job.page_number,
            reason,
        };

        let source = match self.sources.get(job.source) {
            Some(Some(doc)) => doc,
            _ => return Err(unreadable("source was not loaded".to_string())),
        };

        let pages = source.get_pages();
        let page_id = *pages.get(&job.page_number).ok_or(RebrandError::PageOutOfRange {
            page: job.page_number,
            count: pages.len(),
        })?;

        let geometry = PageGeometry::read(source, page_id).map_err(|e| match e {
            RebrandError::UnsupportedRotation(_) => e,
            other => unreadable(other.to_string()),
        })?;
        let mut page = import_page(output, source, page_id, &mut self.caches[job.source])
            .map_err(|e| unreadable(e.to_string()))?;

        let display = geometry.display_size();
        let scale_ratio = job.scale_ratio(display);
        // Blocks are checked in the frame they were authored in.
        validate_blocks(&job.blocks, display.scaled(1.0 / scale_ratio))?;
        let request = self.request;
        let options = &request.options;
        let (raw_width, raw_height) = (geometry.raw.raw_width, geometry.raw.raw_height);

        let mut content = ContentBuilder::new();
        if geometry.has_offset() {
            content.transform([1.0, 0.0, 0.0, 1.0, geometry.box_origin.x, geometry.box_origin.y]);
        }

        // Masks are authored at the authored size and scaled like the blocks.
        let mask = compute_mask_rects(display.scaled(1.0 / scale_ratio), &job.mask).scaled(scale_ratio);
        let mut tally = DrawTally {
            warnings: mask.warnings.clone(),
            ..Default::default()
        };
        let mut mask_rects_display = Vec::new();
        let mut mask_rects_pdf = Vec::new();
        for rect in mask.iter().filter(|r| r.area() > 0.0) {
            let pdf = transform_rect(rect, geometry.rotation, raw_width, raw_height);
            content.fill_rect(&pdf, options.mask_color);
            mask_rects_display.push(*rect);
            mask_rects_pdf.push(pdf);
        }

        let mut resources = Resources::new(&mut page);
        for block in &job.blocks {
            match block {
                Block::Text(text) => self.draw_text(
                    output,
                    &mut resources,
                    &mut content,
                    &mut tally,
                    text,
                    &geometry,
                    scale_ratio,
                )?,
                Block::Image(image) => self.draw_image(
                    output,
                    &mut resources,
                    &mut content,
                    &mut tally,
                    image,
                    &geometry,
                    scale_ratio,
                )?,
            }
        }

        let overlay = make_stream(Dictionary::new(), content.into_bytes(), options.compress_streams)?;
        append_overlay(output, &mut page, overlay);

        log::info!(
            "Page {} (source {} page {}): {:?}, scale {:.3}, {} text / {} image blocks drawn, {} skipped",
            page_index + 1,
            job.source,
            job.page_number,
            geometry.rotation,
            scale_ratio,
            tally.text,
            tally.images,
            tally.skipped
        );

        let log = PageLog {
            page_index,
            source_index: job.source,
            page_number: job.page_number,
            raw_size: geometry.raw,
            rotation: geometry.rotation,
            scale_ratio,
            mask_rects_display,
            mask_rects_pdf,
            text_blocks_drawn: tally.text,
            image_blocks_drawn: tally.images,
            blocks_skipped: tally.skipped,
            warnings: tally.warnings,
        };
        Ok((page, log))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        output: &mut Document,
        resources: &mut Resources<'_>,
        content: &mut ContentBuilder,
        tally: &mut DrawTally,
        block: &TextBlock,
        geometry: &PageGeometry,
        scale_ratio: f32,
    ) -> Result<()> {
        let request = self.request;
        let options = &request.options;
        let Some(text) = request.profile.resolve_text(block.field, &options.labels) else {
            tally.skipped += 1;
            return Ok(());
        };

        let (font, preferred) = self.shared.font(block.font_weight);
        let encoded = font.encode(&text)?;
        if !encoded.missing.is_empty() {
            let warning = Warning::GlyphMissing {
                block: block.id,
                field: block.field,
                chars: encoded.missing.clone(),
            };
            log::warn!("{}", warning);
            tally.warnings.push(warning);
        }
        let name = resources.add_font(preferred, font.object_id(output));

        let rect = block.rect.scaled(scale_ratio);
        let font_size = block.font_size * scale_ratio;
        let width = encoded.width * font_size;
        let x = match block.text_align {
            TextAlign::Left => rect.x,
            TextAlign::Center => rect.x + (rect.width - width) / 2.0,
            TextAlign::Right => rect.right() - width,
        };
        let baseline = rect.bottom() - options.descender_offset * scale_ratio;

        let anchor = transform_text_anchor(
            x,
            baseline,
            geometry.rotation,
            geometry.raw.raw_width,
            geometry.raw.raw_height,
        );
        content.draw_text(
            &name,
            font_size,
            options.text_color,
            geometry.to_pdf().text_matrix(&anchor),
            &encoded.hex,
        );
        tally.text += 1;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        output: &mut Document,
        resources: &mut Resources<'_>,
        content: &mut ContentBuilder,
        tally: &mut DrawTally,
        block: &ImageBlock,
        geometry: &PageGeometry,
        scale_ratio: f32,
    ) -> Result<()> {
        let request = self.request;
        let (key, data) = match request.profile.resolve_image(block.field) {
            ImageResolution::Absent => {
                tally.skipped += 1;
                return Ok(());
            }
            ImageResolution::Missing { key } => {
                let warning = Warning::ImageMissing {
                    block: block.id,
                    field: block.field,
                    key: key.to_string(),
                };
                log::warn!("{}", warning);
                tally.warnings.push(warning);
                tally.skipped += 1;
                return Ok(());
            }
            ImageResolution::Ready { key, data } => (key, data),
        };

        let (id, preferred) = self.shared.image(output, key, data)?;
        let name = resources.add_xobject(&preferred, id);
        let placement = image_placement(
            &block.rect.scaled(scale_ratio),
            geometry.rotation,
            geometry.raw.raw_width,
            geometry.raw.raw_height,
        );
        content.draw_image(&name, &placement);
        tally.images += 1;
        Ok(())
    }

    /// Write the shared font objects once every page is drawn
    pub(crate) fn finish(self, output: &mut Document) -> Result<()> {
        let compress = self.request.options.compress_streams;
        self.shared.regular.finish(output, compress)?;
        self.shared.bold.finish(output, compress)?;
        Ok(())
    }
}
