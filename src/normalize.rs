
use std::num::NonZeroUsize;

use crate::{
    error::{Error, Result},
    util::{Pixel, required_len},
};

/// Turns accumulated luma sums into output samples.
///
/// This is the final step of overlap-add blending: once every block covering
/// the region has been added with [`interpolate`](crate::interpolate()), each
/// weighted sum is divided by the total window weight that reached it.
///
/// # Parameters
/// - `pixels`: Output plane, starting at the region's top-left sample
/// - `pixels_stride`: Row pitch of `pixels`, in samples, including any padding
/// - `weighted_sums`: Accumulated sums, a `width x height` raster with row pitch `width`
/// - `weights`: Accumulated weights, laid out exactly like `weighted_sums`
/// - `width`, `height`: Region dimensions
///
/// # Returns
/// `Ok(())` after every sample of the region has been written as
/// `weighted_sums[i] / weights[i]`, truncated, and clamped to the maximum
/// value of `T`. Samples outside the region, including row padding, are
/// never touched.
///
/// The whole region is checked before anything is written, so on error
/// `pixels` is left untouched.
///
/// # Errors
/// - `InvalidArgument` if any buffer is too small for the region.
/// - `DivisionByZero` if any pixel of the region has zero accumulated weight.
pub fn normalize<T: Pixel>(
    pixels: &mut [T],
    pixels_stride: usize,
    weighted_sums: &[u32],
    weights: &[u32],
    width: NonZeroUsize,
    height: NonZeroUsize,
) -> Result<()> {
    let (w, h) = (width.get(), height.get());
    check_len("pixels", pixels.len(), pixels_stride, w, h)?;
    check_len("weighted sums", weighted_sums.len(), w, w, h)?;
    check_len("weights", weights.len(), w, w, h)?;

    divide_rows(pixels, pixels_stride, weighted_sums, w, h, |x, y| weights[x + y * w])
}

/// Turns accumulated chroma sums into output samples.
///
/// 4:2:0 chroma has no weight plane of its own: chroma sample `(x, y)` divides
/// by the luma weight at `(2x, 2y)`, where the luma weight plane has a row pitch
/// of `2 * uv_width`.
///
/// # Errors
/// - `InvalidArgument` if any buffer is too small for the region.
/// - `DivisionByZero` if any co-located luma weight is zero.
pub fn normalize_chroma<T: Pixel>(
    pixels: &mut [T],
    pixels_stride: usize,
    weighted_sums: &[u32],
    luma_weights: &[u32],
    uv_width: NonZeroUsize,
    uv_height: NonZeroUsize,
) -> Result<()> {
    let (w, h) = (uv_width.get(), uv_height.get());
    check_len("pixels", pixels.len(), pixels_stride, w, h)?;
    check_len("weighted sums", weighted_sums.len(), w, w, h)?;
    // w * h fits in the sums slice, so doubling either side cannot overflow
    let luma_pitch = 2 * w;
    check_len(
        "luma weights",
        luma_weights.len(),
        luma_pitch,
        2 * w - 1,
        2 * h - 1,
    )?;

    divide_rows(pixels, pixels_stride, weighted_sums, w, h, |x, y| {
        luma_weights[2 * x + 2 * y * luma_pitch]
    })
}

fn divide_rows<T: Pixel>(
    pixels: &mut [T],
    pixels_stride: usize,
    weighted_sums: &[u32],
    width: usize,
    height: usize,
    weight_at: impl Fn(usize, usize) -> u32,
) -> Result<()> {
    for y in 0..height {
        if let Some(x) = (0..width).find(|&x| weight_at(x, y) == 0) {
            return Err(Error::DivisionByZero { x, y });
        }
    }

    for y in 0..height {
        let out_row = &mut pixels[y * pixels_stride..][..width];
        let sum_row = &weighted_sums[y * width..][..width];
        for (x, (out, &sum)) in out_row.iter_mut().zip(sum_row).enumerate() {
            *out = T::from_or_max(sum / weight_at(x, y));
        }
    }
    Ok(())
}

fn check_len(name: &str, len: usize, stride: usize, width: usize, height: usize) -> Result<()> {
    if stride < width {
        return Err(Error::InvalidArgument(format!(
            "{name} stride {stride} is narrower than the region width {width}"
        )));
    }
    let needed = required_len(stride, width, height).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "{name} stride {stride} overflows for {height} rows"
        ))
    })?;
    if len < needed {
        return Err(Error::InvalidArgument(format!(
            "{name} needs {needed} entries, got {len}"
        )));
    }
    Ok(())
}
