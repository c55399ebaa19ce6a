//! Input folder scanning.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CaptionerError, CaptionerResult};

/// Extensions treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// True if `path` has a known image extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// List image files directly inside `folder`, sorted by file name.
///
/// Sorting makes index assignment, and therefore `image{N}` names,
/// reproducible across runs and filesystems.
pub fn discover_images(folder: &Path) -> CaptionerResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(folder)
        .map_err(|e| CaptionerError::io("list input folder", folder, e))?;

    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CaptionerError::io("read directory entry", folder, e))?;
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            images.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-image entry");
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn extension_match_ignores_case() {
        assert!(is_image(Path::new("photo.JPG")));
        assert!(is_image(Path::new("photo.WebP")));
        assert!(is_image(Path::new("dir/photo.jpeg")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("archive.tar.gz")));
        assert!(!is_image(Path::new("jpg")));
    }

    #[test]
    fn lists_only_image_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.PNG", "a.jpg", "c.txt", "d.webp", "README"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let found: Vec<String> = discover_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(found, vec!["a.jpg", "b.PNG", "d.webp"]);
    }

    #[test]
    fn missing_folder_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = discover_images(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.category(), "io");
    }
}
