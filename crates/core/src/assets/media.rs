//! Media classification for uploaded files.
//!
//! Classification is descriptive only; nothing in the tree logic depends on
//! it.

use super::model::MediaKind;

/// 3D model file extensions.
pub const MODEL_EXTENSIONS: &[&str] = &[
    "glb", "gltf", "fbx", "obj", "stl", "usdz", "dae", "3ds", "ply", "blend",
];

/// Raster and vector image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "avif", "tif", "tiff", "ico",
];

/// MIME prefix treated as an image when the extension is not recognised.
const IMAGE_MIME_PREFIX: &str = "image/";

/// Lowercased extension of `file_name`, without the dot.
///
/// Returns `None` for names without a dot, dotfiles such as `.env`, and
/// names ending in a dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Classify by extension first, then by MIME type.
///
/// Model extensions win over image extensions, an `image/*` MIME type
/// classifies anything else as an image, and the rest are generic files.
pub fn classify(extension: Option<&str>, mime_type: Option<&str>) -> MediaKind {
    if let Some(ext) = extension {
        let ext = ext.to_ascii_lowercase();
        if MODEL_EXTENSIONS.contains(&ext.as_str()) {
            return MediaKind::Model;
        }
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return MediaKind::Image;
        }
    }

    match mime_type {
        Some(mime) if mime.to_ascii_lowercase().starts_with(IMAGE_MIME_PREFIX) => {
            MediaKind::Image
        }
        _ => MediaKind::File,
    }
}
