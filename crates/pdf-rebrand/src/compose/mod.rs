//! Flyer composition
//!
//! This module orchestrates one export:
//! 1. Validate the request and parse every referenced source once
//! 2. Copy each requested page and draw its mask and blocks
//! 3. Write the shared fonts and images
//! 4. Assemble the page tree and serialize the output

mod assembler;
mod compositor;
mod io;

pub use io::{fill_profile_images, load_fonts, load_image, load_images, load_pdf_bytes, save_pdf_bytes};

use crate::diagnostics::CompositionResult;
use crate::geometry::{MaskRects, compute_mask_rects};
use crate::layout::{Block, generate_initial_blocks};
use crate::options::{CompositionRequest, MaskSettings, PageJob};
use crate::profile::ResolvedProfile;
use crate::render::PageGeometry;
use crate::types::*;
use assembler::Assembler;
use compositor::Compositor;
use lopdf::Document;

/// Main composition function
pub async fn compose(request: CompositionRequest) -> Result<CompositionResult> {
    request.validate()?;
    tokio::task::spawn_blocking(move || compose_sync(&request)).await?
}

/// Compose on the calling thread.
///
/// Either every page is produced or an error is returned; there is no
/// partial output.
pub fn compose_sync(request: &CompositionRequest) -> Result<CompositionResult> {
    request.validate()?;

    let mut compositor = Compositor::new(request)?;
    let mut assembler = Assembler::new();
    let mut pages = Vec::with_capacity(request.pages.len());

    for (page_index, job) in request.pages.iter().enumerate() {
        let (page, log) = compositor.compose_page(assembler.document_mut(), page_index, job)?;
        assembler.add_page(page);
        pages.push(log);
    }

    compositor.finish(assembler.document_mut())?;
    let bytes = assembler.finish(&request.options)?;

    let result = CompositionResult { bytes, pages };
    let warnings = result.warnings().count();
    if warnings > 0 {
        log::warn!("Composed {} pages with {} warnings", result.pages.len(), warnings);
    } else {
        log::info!("Composed {} pages", result.pages.len());
    }
    Ok(result)
}

/// A source page ready for editing: its geometry plus generated blocks
#[derive(Debug, Clone)]
pub struct PreparedPage {
    pub page_number: u32,
    pub geometry: PageGeometry,
    pub display: DisplaySize,
    pub mask_settings: MaskSettings,
    pub mask: MaskRects,
    pub blocks: Vec<Block>,
}

impl PreparedPage {
    /// A job drawing this page's blocks at natural size
    pub fn to_job(&self, source: usize) -> PageJob {
        PageJob {
            source,
            page_number: self.page_number,
            mask: self.mask_settings,
            blocks: self.blocks.clone(),
            authored_display_width: Some(self.display.width),
        }
    }
}

/// Read a page's natural size and generate its initial blocks with the
/// default mask settings
pub fn prepare_page(
    source_bytes: &[u8],
    page_number: u32,
    profile: &ResolvedProfile,
) -> Result<PreparedPage> {
    prepare_page_with_mask(source_bytes, page_number, &MaskSettings::default(), profile)
}

/// [`prepare_page`] with explicit mask settings
pub fn prepare_page_with_mask(
    source_bytes: &[u8],
    page_number: u32,
    mask_settings: &MaskSettings,
    profile: &ResolvedProfile,
) -> Result<PreparedPage> {
    let doc = load_source(source_bytes, 0, page_number)?;
    let pages = doc.get_pages();
    let page_id = *pages.get(&page_number).ok_or(RebrandError::PageOutOfRange {
        page: page_number,
        count: pages.len(),
    })?;

    let geometry = PageGeometry::read(&doc, page_id)?;
    let display = geometry.display_size();
    let mask = compute_mask_rects(display, mask_settings);
    let blocks = generate_initial_blocks(display, &mask, profile);
    log::debug!(
        "Prepared page {}: {}x{} display, {} blocks",
        page_number,
        display.width,
        display.height,
        blocks.len()
    );

    Ok(PreparedPage {
        page_number,
        geometry,
        display,
        mask_settings: *mask_settings,
        mask,
        blocks,
    })
}

/// Geometry of every page in a document, in page order
pub fn inspect_pages(source_bytes: &[u8]) -> Result<Vec<PageGeometry>> {
    let doc = load_source(source_bytes, 0, 1)?;
    doc.get_pages()
        .into_values()
        .map(|page_id| PageGeometry::read(&doc, page_id))
        .collect()
}

/// Parse one source document, rejecting encrypted files
fn load_source(bytes: &[u8], source_index: usize, page_number: u32) -> Result<Document> {
    let unreadable = |reason: String| RebrandError::SourcePageUnreadable {
        source_index,
        page: page_number,
        reason,
    };
    let doc = Document::load_mem(bytes).map_err(|e| unreadable(e.to_string()))?;
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(unreadable("document is encrypted".to_string()));
    }
    log::debug!("Parsed source {} ({} pages)", source_index, doc.get_pages().len());
    Ok(doc)
}
