//! Site Map Image
//!
//! Decodes the raster the layout is drawn over. Only its pixel size matters
//! to the view; the RGBA data is handed to the GPU map layer.

use std::path::Path;

use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapImageError {
    #[error("failed to load map image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("map image has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Pixel dimensions of a loaded map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. `None` for a degenerate image.
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

/// A decoded map ready for upload.
pub struct MapImage {
    pub info: ImageInfo,
    pub rgba: image::RgbaImage,
}

impl MapImage {
    /// Decode a PNG, JPEG, or BMP file into RGBA8.
    pub fn open(path: &Path) -> Result<Self, MapImageError> {
        let rgba = image::open(path)?.to_rgba8();
        let map = Self::from_rgba(rgba)?;
        info!(
            "Map loaded: {}x{} from {}",
            map.info.width,
            map.info.height,
            path.display()
        );
        Ok(map)
    }

    /// Wrap already-decoded pixels.
    pub fn from_rgba(rgba: image::RgbaImage) -> Result<Self, MapImageError> {
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(MapImageError::Empty { width, height });
        }
        Ok(Self {
            info: ImageInfo::new(width, height),
            rgba,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(ImageInfo::new(1600, 800).aspect_ratio(), Some(2.0));
        assert_eq!(ImageInfo::new(0, 800).aspect_ratio(), None);
    }

    #[test]
    fn test_open_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.png");
        image::RgbaImage::from_pixel(30, 20, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let map = MapImage::open(&path).unwrap();
        assert_eq!(map.info, ImageInfo::new(30, 20));
        assert!((map.info.aspect_ratio().unwrap() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MapImage::open(&dir.path().join("nope.png")),
            Err(MapImageError::Decode(_))
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            MapImage::from_rgba(image::RgbaImage::new(0, 5)),
            Err(MapImageError::Empty { width: 0, height: 5 })
        ));
    }
}
