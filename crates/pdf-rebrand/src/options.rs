use crate::constants::{DEFAULT_DESCENDER_OFFSET, DEFAULT_MASK_BOTTOM_HEIGHT, DEFAULT_MASK_LEFT_WIDTH};
use crate::layout::Block;
use crate::profile::ResolvedProfile;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mask configuration for one page, in display-space units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MaskSettings {
    /// Height of the band along the bottom edge
    pub bottom_height: f32,
    /// Width of the strip along the left edge (L-shape only)
    pub left_width: f32,
    /// Paint the left strip as well as the bottom band
    pub enable_l_shape: bool,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            bottom_height: DEFAULT_MASK_BOTTOM_HEIGHT,
            left_width: DEFAULT_MASK_LEFT_WIDTH,
            enable_l_shape: false,
        }
    }
}

/// Labels used to format fee fields as `"<label>: <value>%"`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FieldLabels {
    pub fee_ratio_landlord: String,
    pub fee_ratio_tenant: String,
    pub fee_distribution_landlord: String,
    pub fee_distribution_tenant: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        Self {
            fee_ratio_landlord: "Fee (landlord)".to_string(),
            fee_ratio_tenant: "Fee (tenant)".to_string(),
            fee_distribution_landlord: "Share (landlord)".to_string(),
            fee_distribution_tenant: "Share (tenant)".to_string(),
        }
    }
}

/// Engine configuration.
///
/// Built once by the caller and passed into every composition; the engine
/// keeps no global settings of its own.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComposeOptions {
    /// Fill color of the mask bands (RGB, 0..=1)
    pub mask_color: [f32; 3],
    /// Color of drawn text (RGB, 0..=1)
    pub text_color: [f32; 3],
    /// Distance from a text block's bottom edge to its baseline
    pub descender_offset: f32,
    pub labels: FieldLabels,
    /// Written to the output's Info dictionary when set
    pub producer: Option<String>,
    /// Flate-compress the overlay content streams
    pub compress_streams: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            mask_color: [1.0, 1.0, 1.0],
            text_color: [0.0, 0.0, 0.0],
            descender_offset: DEFAULT_DESCENDER_OFFSET,
            labels: FieldLabels::default(),
            producer: None,
            compress_streams: true,
        }
    }
}

impl ComposeOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| RebrandError::Config(format!("Failed to parse options: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| RebrandError::Config(format!("Failed to serialize options: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        for (name, color) in [("mask_color", self.mask_color), ("text_color", self.text_color)] {
            if color.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(RebrandError::Config(format!(
                    "{} components must be between 0 and 1, got {:?}",
                    name, color
                )));
            }
        }

        if !self.descender_offset.is_finite() || self.descender_offset < 0.0 {
            return Err(RebrandError::Config(format!(
                "descender_offset must be a non-negative number, got {}",
                self.descender_offset
            )));
        }

        Ok(())
    }
}

/// Regular and bold font programs (TrueType or OpenType)
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: Vec<u8>,
    pub bold: Vec<u8>,
}

/// Raw bytes of one source PDF
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// One output page: which source page to copy and what to draw on it
#[derive(Debug, Clone)]
pub struct PageJob {
    /// Index into [`CompositionRequest::sources`]
    pub source: usize,
    /// 1-based page number within the source
    pub page_number: u32,
    pub mask: MaskSettings,
    pub blocks: Vec<Block>,
    /// Display width the mask and blocks were authored at; `None` means the
    /// page's natural width
    pub authored_display_width: Option<f32>,
}

impl PageJob {
    pub fn new(source: usize, page_number: u32) -> Self {
        Self {
            source,
            page_number,
            mask: MaskSettings::default(),
            blocks: Vec::new(),
            authored_display_width: None,
        }
    }

    /// Natural display width over the authored width
    pub fn scale_ratio(&self, display: DisplaySize) -> f32 {
        match self.authored_display_width {
            Some(authored) => display.width / authored,
            None => 1.0,
        }
    }
}

/// Everything one export needs
#[derive(Debug, Clone)]
pub struct CompositionRequest {
    pub sources: Vec<SourceDocument>,
    pub pages: Vec<PageJob>,
    pub profile: ResolvedProfile,
    pub fonts: FontSet,
    pub options: ComposeOptions,
}

impl CompositionRequest {
    /// Check page references before any document is parsed
    pub fn validate(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(RebrandError::NoPages);
        }

        for job in &self.pages {
            if job.source >= self.sources.len() {
                return Err(RebrandError::Config(format!(
                    "Page job references source {} but only {} sources were given",
                    job.source,
                    self.sources.len()
                )));
            }
            if job.page_number == 0 {
                return Err(RebrandError::Config(
                    "Page numbers are 1-based".to_string(),
                ));
            }
            if let Some(width) = job.authored_display_width {
                if !width.is_finite() || width <= 0.0 {
                    return Err(RebrandError::Config(format!(
                        "authored_display_width must be positive, got {}",
                        width
                    )));
                }
            }
        }

        self.options.validate()
    }
}
