//! Job files for `pdft compose`
//!
//! Paths in a job file are resolved relative to the file's own directory.

use anyhow::{Context, Result};
use pdf_rebrand::{
    Block, CompositionRequest, FontSet, MaskSettings, PageJob, ResolvedProfile, SourceDocument,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct JobFile {
    /// Source PDF paths; pages refer to them by index
    pub sources: Vec<PathBuf>,
    pub pages: Vec<JobPage>,
    #[serde(default)]
    pub profile: ResolvedProfile,
    pub fonts: JobFonts,
}

#[derive(Debug, Deserialize)]
pub struct JobPage {
    #[serde(default)]
    pub source: usize,
    /// 1-based page number
    pub page: u32,
    #[serde(default)]
    pub mask: MaskSettings,
    /// Blocks to draw; generated from the profile when empty
    #[serde(default)]
    pub blocks: Vec<Block>,
    pub authored_display_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct JobFonts {
    pub regular: PathBuf,
    pub bold: PathBuf,
}

impl JobFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read job file {}", path.display()))?;
        let mut job: JobFile = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse job file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for source in &mut job.sources {
            *source = base.join(&*source);
        }
        job.fonts.regular = base.join(&job.fonts.regular);
        job.fonts.bold = base.join(&job.fonts.bold);
        for image in [job.profile.logo.as_mut(), job.profile.line_qr.as_mut()]
            .into_iter()
            .flatten()
        {
            image.key = base.join(&image.key).to_string_lossy().into_owned();
        }
        Ok(job)
    }

    /// Load every input the job names and build the composition request.
    ///
    /// Pages without blocks get the generated initial layout for their mask.
    pub async fn into_request(
        self,
        options: pdf_rebrand::ComposeOptions,
    ) -> Result<CompositionRequest> {
        let mut sources = Vec::with_capacity(self.sources.len());
        for path in &self.sources {
            let bytes = pdf_rebrand::load_pdf_bytes(path)
                .await
                .with_context(|| format!("Failed to read source {}", path.display()))?;
            sources.push(SourceDocument::new(bytes));
        }

        let (fonts, profile) = tokio::join!(
            pdf_rebrand::load_fonts(&self.fonts.regular, &self.fonts.bold),
            load_profile(self.profile)
        );
        let fonts: FontSet = fonts?;
        let profile = profile?;

        let mut pages = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let mut job = PageJob {
                source: page.source,
                page_number: page.page,
                mask: page.mask,
                blocks: page.blocks,
                authored_display_width: page.authored_display_width,
            };
            if job.blocks.is_empty() {
                if let Some(source) = sources.get(job.source) {
                    let prepared = pdf_rebrand::prepare_page_with_mask(
                        &source.bytes,
                        job.page_number,
                        &job.mask,
                        &profile,
                    )?;
                    log::debug!(
                        "Generated {} blocks for source {} page {}",
                        prepared.blocks.len(),
                        job.source,
                        job.page_number
                    );
                    job = prepared.to_job(job.source);
                }
            }
            pages.push(job);
        }

        Ok(CompositionRequest {
            sources,
            pages,
            profile,
            fonts,
            options,
        })
    }
}

async fn load_profile(mut profile: ResolvedProfile) -> pdf_rebrand::Result<ResolvedProfile> {
    pdf_rebrand::fill_profile_images(&mut profile).await?;
    Ok(profile)
}
