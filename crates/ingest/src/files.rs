//! Image file ingestion.
//!
//! Files are decoded in the order given. A file that cannot be opened or
//! decoded is skipped with a warning; it never aborts the load.

use std::path::{Path, PathBuf};

use difftrail_blend::Frame;
use difftrail_common::error::{DifftrailError, DifftrailResult};

/// Raster formats accepted when scanning directories.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// A file that was dropped from the sequence.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Frames decoded from a file list, in input order.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub frames: Vec<Frame>,
    pub skipped: Vec<SkippedFile>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Whether the extension is one of [`SUPPORTED_EXTENSIONS`] (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Convert a decoded image into an RGBA frame.
pub fn frame_from_image(image: &image::DynamicImage) -> DifftrailResult<Frame> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Frame::from_rgba(width, height, rgba.into_raw())
        .map_err(|e| DifftrailError::ingest(e.to_string()))
}

/// Decode one file into a frame. Only [`SUPPORTED_EXTENSIONS`] are accepted,
/// even when the decoder could handle more.
pub fn decode_frame(path: &Path) -> DifftrailResult<Frame> {
    if !path.exists() {
        return Err(DifftrailError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !is_supported_image(path) {
        return Err(DifftrailError::unsupported(format!(
            "{} is not a supported image (expected {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }
    let image = image::open(path)
        .map_err(|e| DifftrailError::ingest(format!("{}: {e}", path.display())))?;
    frame_from_image(&image)
}

/// Decode every path, skipping failures.
pub fn load_frames<I, P>(paths: I) -> LoadReport
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut report = LoadReport::default();
    for path in paths {
        let path = path.as_ref();
        match decode_frame(path) {
            Ok(frame) => {
                tracing::debug!(
                    "Loaded {} ({}x{})",
                    path.display(),
                    frame.width(),
                    frame.height()
                );
                report.frames.push(frame);
            }
            Err(e) => {
                tracing::warn!("Failed to load image {}: {}", path.display(), e);
                report.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }
    }
    tracing::info!(
        loaded = report.frames.len(),
        skipped = report.skipped.len(),
        "Image load finished"
    );
    report
}

/// Supported images directly inside `dir`, sorted by file name.
pub fn collect_image_paths(dir: &Path) -> DifftrailResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DifftrailError::FileNotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Expand a mixed list of files and directories into an ordered file list.
///
/// Files are kept in the order given; unsupported ones are dropped later by
/// [`load_frames`] so they show up in the skip report. Each directory is
/// replaced by its sorted supported images.
pub fn expand_inputs(inputs: &[PathBuf]) -> DifftrailResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(collect_image_paths(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a/shot.PNG")));
        assert!(is_supported_image(Path::new("shot.jpeg")));
        assert!(is_supported_image(Path::new("shot.Gif")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("no_extension")));
    }

    #[test]
    fn frame_from_image_keeps_alpha() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(1, 0, image::Rgba([1, 2, 3, 4]));
        let frame = frame_from_image(&image::DynamicImage::ImageRgba8(img)).unwrap();
        assert_eq!(frame.dimensions(), (2, 1));
        assert_eq!(frame.pixel(1, 0), difftrail_blend::Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn rgb_images_become_opaque() {
        let img = image::RgbImage::from_pixel(1, 1, image::Rgb([9, 8, 7]));
        let frame = frame_from_image(&image::DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(frame.pixel(0, 0), difftrail_blend::Rgba::opaque(9, 8, 7));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = decode_frame(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, DifftrailError::FileNotFound { .. }));
    }
}
