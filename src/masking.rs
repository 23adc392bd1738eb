/// Screenshot masking
///
/// Splits a raw screenshot into two grayscale buffers, one per OCR region,
/// by keeping only the pixels a mask marks as visible. Masked-out pixels
/// become white so the engine sees blank paper there.
use image::{GrayImage, ImageFormat};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::InputError;

/// Mask pixels at or above this value keep the screenshot pixel
pub const MASK_THRESHOLD: u8 = 128;

/// Output of a masking pass; both buffers share the screenshot's dimensions
#[derive(Debug, Clone)]
pub struct MaskedRegions {
    pub players: GrayImage,
    pub metadata: GrayImage,
}

/// Masking collaborator used by the pipeline
pub trait Masker: Send + Sync {
    fn apply(&self, image_bytes: &[u8]) -> Result<MaskedRegions, InputError>;
}

/// Two binary masks in screenshot pixel space
#[derive(Debug, Clone)]
pub struct MaskSet {
    player_table: GrayImage,
    metadata: GrayImage,
}

impl MaskSet {
    /// Load both masks from image files
    pub fn load(player_table: &Path, metadata: &Path) -> Result<Self, InputError> {
        let player_table = Self::load_mask(player_table)?;
        let metadata = Self::load_mask(metadata)?;

        tracing::info!(
            "Loaded masks: player table {}x{}, metadata {}x{}",
            player_table.width(),
            player_table.height(),
            metadata.width(),
            metadata.height()
        );

        Ok(Self {
            player_table,
            metadata,
        })
    }

    pub fn from_images(player_table: GrayImage, metadata: GrayImage) -> Self {
        Self {
            player_table,
            metadata,
        }
    }

    fn load_mask(path: &Path) -> Result<GrayImage, InputError> {
        if !path.is_file() {
            return Err(InputError::MaskAssetMissing {
                path: path.display().to_string(),
            });
        }

        let image = image::open(path).map_err(|source| InputError::MaskDecodeFailed {
            path: path.display().to_string(),
            source,
        })?;

        Ok(image.to_luma8())
    }

    /// Keep screenshot pixels under bright mask pixels, white out the rest.
    /// Rows are processed in parallel.
    fn mask_one(screenshot: &GrayImage, mask: &GrayImage) -> Result<GrayImage, InputError> {
        let (width, height) = screenshot.dimensions();
        if mask.dimensions() != (width, height) {
            return Err(InputError::DimensionMismatch {
                mask_width: mask.width(),
                mask_height: mask.height(),
                width,
                height,
            });
        }

        let mut masked = GrayImage::new(width, height);
        let row_size = width as usize;
        if row_size == 0 {
            return Ok(masked);
        }

        let source = screenshot.as_raw();
        let mask_raw = mask.as_raw();

        masked
            .as_flat_samples_mut()
            .samples
            .par_chunks_mut(row_size)
            .enumerate()
            .for_each(|(y, row_buffer)| {
                let start = y * row_size;
                let src_row = &source[start..start + row_size];
                let mask_row = &mask_raw[start..start + row_size];
                for x in 0..row_size {
                    row_buffer[x] = if mask_row[x] >= MASK_THRESHOLD {
                        src_row[x]
                    } else {
                        255
                    };
                }
            });

        Ok(masked)
    }
}

impl Masker for MaskSet {
    fn apply(&self, image_bytes: &[u8]) -> Result<MaskedRegions, InputError> {
        let screenshot = image::load_from_memory(image_bytes)
            .map_err(InputError::ImageDecodeFailure)?
            .to_luma8();

        tracing::debug!(
            "Decoded screenshot {}x{}",
            screenshot.width(),
            screenshot.height()
        );

        Ok(MaskedRegions {
            players: Self::mask_one(&screenshot, &self.player_table)?,
            metadata: Self::mask_one(&screenshot, &self.metadata)?,
        })
    }
}

/// Mask asset locations
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaskPaths {
    pub player_table: PathBuf,
    pub metadata: PathBuf,
}

impl Default for MaskPaths {
    fn default() -> Self {
        Self {
            player_table: PathBuf::from("masks/player_table.png"),
            metadata: PathBuf::from("masks/metadata.png"),
        }
    }
}

impl MaskPaths {
    pub fn load(&self) -> Result<MaskSet, InputError> {
        MaskSet::load(&self.player_table, &self.metadata)
    }
}

/// Encode a grayscale buffer as PNG bytes
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn half_mask(width: u32, height: u32, left: bool) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            let in_left = x < width / 2;
            if in_left == left {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_masks_split_regions() {
        let screenshot = GrayImage::from_pixel(8, 4, Luma([40]));
        let bytes = encode_png(&screenshot).unwrap();
        let masks = MaskSet::from_images(half_mask(8, 4, true), half_mask(8, 4, false));

        let regions = masks.apply(&bytes).unwrap();
        assert_eq!(regions.players.dimensions(), (8, 4));
        assert_eq!(regions.players.get_pixel(1, 2)[0], 40);
        assert_eq!(regions.players.get_pixel(6, 2)[0], 255);
        assert_eq!(regions.metadata.get_pixel(1, 2)[0], 255);
        assert_eq!(regions.metadata.get_pixel(6, 2)[0], 40);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let screenshot = GrayImage::from_pixel(2, 1, Luma([10]));
        let mask = GrayImage::from_raw(2, 1, vec![MASK_THRESHOLD, MASK_THRESHOLD - 1]).unwrap();
        let masked = MaskSet::mask_one(&screenshot, &mask).unwrap();
        assert_eq!(masked.as_raw(), &vec![10, 255]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let bytes = encode_png(&GrayImage::new(8, 4)).unwrap();
        let masks = MaskSet::from_images(GrayImage::new(4, 4), GrayImage::new(8, 4));
        assert!(matches!(
            masks.apply(&bytes),
            Err(InputError::DimensionMismatch { mask_width: 4, width: 8, .. })
        ));
    }

    #[test]
    fn test_undecodable_bytes() {
        let masks = MaskSet::from_images(GrayImage::new(1, 1), GrayImage::new(1, 1));
        assert!(matches!(
            masks.apply(b"not an image"),
            Err(InputError::ImageDecodeFailure(_))
        ));
    }

    #[test]
    fn test_png_buffers_are_independent() {
        let dark = GrayImage::from_pixel(3, 2, Luma([7]));
        let light = GrayImage::from_pixel(3, 2, Luma([200]));

        let dark_png = encode_png(&dark).unwrap();
        let light_png = encode_png(&light).unwrap();

        let decoded_dark = image::load_from_memory(&dark_png).unwrap().to_luma8();
        let decoded_light = image::load_from_memory(&light_png).unwrap().to_luma8();
        assert_eq!(decoded_dark, dark);
        assert_eq!(decoded_light, light);
    }

    #[test]
    fn test_missing_mask_asset() {
        let missing = Path::new("/definitely/not/a/mask.png");
        assert!(matches!(
            MaskSet::load(missing, missing),
            Err(InputError::MaskAssetMissing { .. })
        ));
    }
}
