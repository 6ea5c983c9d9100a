//! File I/O for composition inputs and output

use crate::options::FontSet;
use crate::profile::{ImageField, ImageRef, ResolvedProfile};
use crate::types::*;
use std::path::Path;
use tokio::task::JoinSet;

/// Load a PDF file's bytes
pub async fn load_pdf_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    Ok(tokio::fs::read(path).await?)
}

/// Save the composed document
pub async fn save_pdf_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Read the regular and bold font programs concurrently
pub async fn load_fonts(regular: impl AsRef<Path>, bold: impl AsRef<Path>) -> Result<FontSet> {
    let (regular, bold) = tokio::try_join!(read_font(regular.as_ref()), read_font(bold.as_ref()))?;
    Ok(FontSet { regular, bold })
}

async fn read_font(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| RebrandError::FontEmbedFailure(format!("{}: {}", path.display(), e)))
}

/// Fetch one image. A failed read gives a reference with no data.
pub async fn load_image(key: impl Into<String>) -> ImageRef {
    let key = key.into();
    match tokio::fs::read(&key).await {
        Ok(data) => ImageRef::new(key, data),
        Err(e) => {
            log::warn!("Image {} could not be read: {}", key, e);
            ImageRef::missing(key)
        }
    }
}

/// Fetch several images concurrently, returning them in input order
pub async fn load_images(keys: Vec<String>) -> Result<Vec<ImageRef>> {
    let mut set = JoinSet::new();
    for (index, key) in keys.into_iter().enumerate() {
        set.spawn(async move { (index, load_image(key).await) });
    }

    let mut loaded = Vec::with_capacity(set.len());
    while let Some(joined) = set.join_next().await {
        loaded.push(joined?);
    }
    loaded.sort_by_key(|(index, _)| *index);
    Ok(loaded.into_iter().map(|(_, image)| image).collect())
}

/// Fetch every profile image that has a key but no bytes yet
pub async fn fill_profile_images(profile: &mut ResolvedProfile) -> Result<()> {
    let pending: Vec<(ImageField, String)> = [ImageField::Logo, ImageField::LineQr]
        .into_iter()
        .filter_map(|field| {
            profile
                .image(field)
                .filter(|image| image.data.is_none())
                .map(|image| (field, image.key.clone()))
        })
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let keys = pending.iter().map(|(_, key)| key.clone()).collect();
    let images = load_images(keys).await?;
    for ((field, _), image) in pending.into_iter().zip(images) {
        if let Some(slot) = profile.image_mut(field) {
            *slot = image;
        }
    }
    Ok(())
}
