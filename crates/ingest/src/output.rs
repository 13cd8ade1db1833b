//! Writing trail frames to disk.

use std::path::Path;

use chrono::{DateTime, TimeZone};
use difftrail_blend::Frame;
use difftrail_common::error::{DifftrailError, DifftrailResult};

/// Copy a frame into an `image` buffer.
pub fn to_rgba_image(frame: &Frame) -> DifftrailResult<image::RgbaImage> {
    image::RgbaImage::from_raw(frame.width(), frame.height(), frame.as_raw().to_vec())
        .ok_or_else(|| DifftrailError::output("frame buffer does not match its dimensions"))
}

/// Save a frame; the format follows the file extension.
///
/// JPEG has no alpha channel, so alpha is dropped for `.jpg`/`.jpeg`.
pub fn save_frame(frame: &Frame, path: &Path) -> DifftrailResult<()> {
    if frame.pixel_count() == 0 {
        return Err(DifftrailError::output("cannot save an empty frame"));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let rgba = to_rgba_image(frame)?;
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false);

    let result = if is_jpeg {
        image::DynamicImage::ImageRgba8(rgba).to_rgb8().save(path)
    } else {
        rgba.save(path)
    };
    result.map_err(|e| DifftrailError::output(format!("{}: {e}", path.display())))?;

    tracing::info!(
        "Saved {}x{} trail to {}",
        frame.width(),
        frame.height(),
        path.display()
    );
    Ok(())
}

/// `trail-YYYYmmdd-HHMMSS.png` for the given instant.
pub fn default_output_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("trail-{}.png", now.format("%Y%m%d-%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use difftrail_blend::Rgba;

    #[test]
    fn output_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(default_output_name(&at), "trail-20240309-140507.png");
    }

    #[test]
    fn png_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trail.png");
        let frame = Frame::from_fn(3, 2, |x, y| Rgba::new(x as u8 * 80, y as u8 * 100, 7, 200));

        save_frame(&frame, &path).unwrap();
        let loaded = crate::files::decode_frame(&path).unwrap();
        assert_eq!(loaded, frame);
    }

    #[test]
    fn jpeg_save_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.jpg");
        let frame = Frame::filled(4, 4, Rgba::new(255, 255, 255, 10));
        save_frame(&frame, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn empty_frame_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::filled(0, 0, Rgba::BLACK);
        assert!(save_frame(&frame, &dir.path().join("x.png")).is_err());
    }
}
