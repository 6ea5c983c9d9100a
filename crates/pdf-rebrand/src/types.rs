use thiserror::Error;

#[derive(Error, Debug)]
pub enum RebrandError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No pages to compose")]
    NoPages,
    #[error("Unsupported page rotation {0} (must be a multiple of 90 degrees)")]
    UnsupportedRotation(i64),
    #[error("Source {source_index} page {page} is unreadable: {reason}")]
    SourcePageUnreadable {
        source_index: usize,
        page: u32,
        reason: String,
    },
    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: usize },
    #[error("Failed to embed font: {0}")]
    FontEmbedFailure(String),
    #[error("Failed to embed image {key}: {reason}")]
    ImageEmbedFailure { key: String, reason: String },
    #[error("Invalid block {id}: {reason}")]
    InvalidBlock { id: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, RebrandError>;

/// Page rotation as declared by the `/Rotate` attribute.
///
/// Only quarter turns are representable; anything else is rejected when the
/// value is read from the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Build a rotation from a declared angle.
    ///
    /// The angle is normalized modulo 360 first, so `-90` is `Deg270` and
    /// `450` is `Deg90`. Angles that are not a multiple of 90 fail with
    /// [`RebrandError::UnsupportedRotation`].
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(RebrandError::UnsupportedRotation(degrees)),
        }
    }

    pub fn degrees(self) -> i64 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when display width and height are the raw height and width.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = RebrandError;

    fn try_from(degrees: i64) -> Result<Self> {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Unrotated page dimensions in points, as stored in the source document.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageSize {
    pub raw_width: f32,
    pub raw_height: f32,
}

impl PageSize {
    pub fn new(raw_width: f32, raw_height: f32) -> Self {
        Self {
            raw_width,
            raw_height,
        }
    }

    /// Size of the page as a viewer renders it under `rotation`.
    pub fn display_size(self, rotation: Rotation) -> DisplaySize {
        if rotation.swaps_axes() {
            DisplaySize::new(self.raw_height, self.raw_width)
        } else {
            DisplaySize::new(self.raw_width, self.raw_height)
        }
    }
}

/// Page dimensions in display space (rotation already applied)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, ratio: f32) -> Self {
        Self::new(self.width * ratio, self.height * ratio)
    }
}
