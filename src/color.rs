//! First-order colour transfer between images.
//!
//! Each RGB channel of the target is shifted and scaled so its mean and
//! standard deviation match the reference:
//!
//! `out = (t - t_mean) * (r_std / t_std) + r_mean`, clamped to `0..=255` and
//! truncated toward zero.
//!
//! No gamma handling and no histogram matching; just the affine remap.

use std::io::Cursor;
use std::path::Path;

use image::{ImageReader, Rgb, RgbImage};

use crate::constants::COLOR_STD_EPSILON;
use crate::error::RefsheetError;

/// Per-channel mean and standard deviation of an RGB image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelStats {
    /// Mean per channel
    pub mean: [f64; 3],
    /// Population standard deviation per channel, plus [`COLOR_STD_EPSILON`]
    pub std: [f64; 3],
}

impl ChannelStats {
    /// Statistics over every pixel of `image`.
    pub fn of(image: &RgbImage) -> Self {
        let count = f64::from(image.width()) * f64::from(image.height());
        if count == 0.0 {
            return Self {
                mean: [0.0; 3],
                std: [COLOR_STD_EPSILON; 3],
            };
        }

        let mut sum = [0.0_f64; 3];
        for Rgb(pixel) in image.pixels() {
            for (acc, value) in sum.iter_mut().zip(pixel) {
                *acc += f64::from(*value);
            }
        }
        let mean = sum.map(|total| total / count);

        let mut squares = [0.0_f64; 3];
        for Rgb(pixel) in image.pixels() {
            for ((acc, value), mean) in squares.iter_mut().zip(pixel).zip(mean) {
                let delta = f64::from(*value) - mean;
                *acc += delta * delta;
            }
        }
        let std = squares.map(|total| (total / count).sqrt() + COLOR_STD_EPSILON);

        Self { mean, std }
    }
}

/// Remaps `target` from `target_stats` onto `reference_stats`.
pub fn transfer(
    target: &RgbImage,
    target_stats: &ChannelStats,
    reference_stats: &ChannelStats,
) -> RgbImage {
    let scale: [f64; 3] =
        std::array::from_fn(|c| reference_stats.std[c] / target_stats.std[c]);

    let mut output = target.clone();
    for Rgb(pixel) in output.pixels_mut() {
        for (c, value) in pixel.iter_mut().enumerate() {
            let remapped =
                (f64::from(*value) - target_stats.mean[c]) * scale[c] + reference_stats.mean[c];
            *value = remapped.clamp(0.0, 255.0) as u8;
        }
    }
    output
}

/// Matches `target`'s colour statistics to `reference`, overwriting
/// `target` in place in its original format.
pub fn color_match_to_reference(reference: &Path, target: &Path) -> Result<(), RefsheetError> {
    let encoded = std::fs::read(target).map_err(|err| RefsheetError::io(target, err))?;
    let corrected = color_match_bytes(reference, &encoded, target)?;
    std::fs::write(target, corrected).map_err(|err| RefsheetError::io(target, err))
}

/// Matches encoded image bytes to `reference` and re-encodes them in the
/// format they were sniffed as. `destination` only labels errors.
pub fn color_match_bytes(
    reference: &Path,
    target: &[u8],
    destination: &Path,
) -> Result<Vec<u8>, RefsheetError> {
    let reference_image = open_rgb(reference)?;

    let format =
        image::guess_format(target).map_err(|err| RefsheetError::image(destination, err))?;
    let target_image = image::load_from_memory_with_format(target, format)
        .map_err(|err| RefsheetError::image(destination, err))?
        .to_rgb8();

    let corrected = transfer(
        &target_image,
        &ChannelStats::of(&target_image),
        &ChannelStats::of(&reference_image),
    );
    let mut out = Vec::new();
    corrected
        .write_to(&mut Cursor::new(&mut out), format)
        .map_err(|err| RefsheetError::image(destination, err))?;
    Ok(out)
}

fn open_rgb(path: &Path) -> Result<RgbImage, RefsheetError> {
    let image = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|err| RefsheetError::io(path, err))?
        .decode()
        .map_err(|err| RefsheetError::image(path, err))?;
    Ok(image.to_rgb8())
}
