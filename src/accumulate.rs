
use std::num::NonZeroUsize;

use crate::{
    dispatch::KernelTable,
    error::{Error, Result},
    interpolate::{interpolate, interpolate_chroma},
    normalize::{normalize, normalize_chroma},
    params::{Alpha, ChromaPlane},
    util::{Pixel, PixelBlock},
};

/// Overlap-add accumulators for one 4:2:0 frame region.
///
/// Holds the luma weighted sums, the luma weight totals (shared with chroma)
/// and the weighted sums of both chroma planes, all starting at zero.
/// Blocks are added through `&mut self`, so writers to one region are
/// serialized by the borrow checker. Once every contributing block is in,
/// [`finish`](Self::finish) hands the region over to normalization; no more
/// blocks can be added after that.
#[derive(Debug, Clone)]
pub struct AccumulationBuffer {
    width: NonZeroUsize,
    height: NonZeroUsize,
    luma_sums: Vec<u32>,
    weights: Vec<u32>,
    chroma_sums: [Vec<u32>; 2],
}

impl AccumulationBuffer {
    /// # Errors
    /// Returns `InvalidArgument` if either dimension is odd; 4:2:0 chroma
    /// needs whole 2x2 luma quads.
    pub fn new(width: NonZeroUsize, height: NonZeroUsize) -> Result<Self> {
        if width.get() % 2 != 0 || height.get() % 2 != 0 {
            return Err(Error::InvalidArgument(format!(
                "4:2:0 regions need even dimensions, got {}x{}",
                width, height
            )));
        }
        let luma_len = width.get() * height.get();
        let chroma_len = luma_len / 4;
        Ok(Self {
            width,
            height,
            luma_sums: vec![0; luma_len],
            weights: vec![0; luma_len],
            chroma_sums: [vec![0; chroma_len], vec![0; chroma_len]],
        })
    }

    #[must_use]
    pub const fn width(&self) -> NonZeroUsize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> NonZeroUsize {
        self.height
    }

    #[must_use]
    pub const fn chroma_width(&self) -> usize {
        self.width.get() / 2
    }

    #[must_use]
    pub const fn chroma_height(&self) -> usize {
        self.height.get() / 2
    }

    /// Luma weight totals accumulated so far, row pitch [`width`](Self::width).
    #[must_use]
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Adds one luma block whose top-left corner is at `(x, y)`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the block does not fit inside the region
    /// or [`interpolate`] rejects its arguments.
    pub fn accumulate_luma<T: Pixel>(
        &mut self,
        kernels: &KernelTable<T>,
        x: usize,
        y: usize,
        src1: PixelBlock<'_, T>,
        src2: PixelBlock<'_, T>,
        weight_table: &[u16],
        alpha: Alpha,
    ) -> Result<()> {
        let stride = self.width.get();
        let n = src1.size().get();
        check_placement(x, y, n, stride, self.height.get())?;

        let offset = x + y * stride;
        interpolate(
            kernels,
            src1.size(),
            &mut self.luma_sums[offset..],
            &mut self.weights[offset..],
            stride,
            src1,
            src2,
            weight_table,
            alpha,
        )
    }

    /// Adds one chroma block whose top-left corner is at chroma position `(x, y)`.
    ///
    /// `weight_table` is the table of the co-located luma block, twice the
    /// chroma block size on each side.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the block does not fit inside the chroma
    /// plane or [`interpolate_chroma`] rejects its arguments.
    pub fn accumulate_chroma<T: Pixel>(
        &mut self,
        kernels: &KernelTable<T>,
        plane: ChromaPlane,
        x: usize,
        y: usize,
        src1: PixelBlock<'_, T>,
        src2: PixelBlock<'_, T>,
        weight_table: &[u16],
        alpha: Alpha,
    ) -> Result<()> {
        let stride = self.chroma_width();
        let n = src1.size().get();
        check_placement(x, y, n, stride, self.chroma_height())?;

        let offset = x + y * stride;
        interpolate_chroma(
            kernels,
            src1.size(),
            &mut self.chroma_sums[plane as usize][offset..],
            stride,
            src1,
            src2,
            weight_table,
            alpha,
        )
    }

    /// Ends the accumulate phase.
    #[must_use]
    pub fn finish(self) -> AccumulatedFrame {
        AccumulatedFrame { inner: self }
    }
}

/// A frame region whose accumulation is complete and which can only be normalized.
#[derive(Debug, Clone)]
pub struct AccumulatedFrame {
    inner: AccumulationBuffer,
}

impl AccumulatedFrame {
    #[must_use]
    pub fn weights(&self) -> &[u32] {
        &self.inner.weights
    }

    /// Writes the normalized luma plane into `pixels`.
    ///
    /// # Errors
    /// See [`normalize`].
    pub fn normalize_luma<T: Pixel>(&self, pixels: &mut [T], pixels_stride: usize) -> Result<()> {
        normalize(
            pixels,
            pixels_stride,
            &self.inner.luma_sums,
            &self.inner.weights,
            self.inner.width,
            self.inner.height,
        )
    }

    /// Writes one normalized chroma plane into `pixels`.
    ///
    /// # Errors
    /// See [`normalize_chroma`].
    pub fn normalize_chroma<T: Pixel>(
        &self,
        plane: ChromaPlane,
        pixels: &mut [T],
        pixels_stride: usize,
    ) -> Result<()> {
        let to_nonzero = |v: usize| {
            NonZeroUsize::new(v).ok_or_else(|| {
                Error::InvalidArgument("region too small to carry chroma".to_string())
            })
        };
        normalize_chroma(
            pixels,
            pixels_stride,
            &self.inner.chroma_sums[plane as usize],
            &self.inner.weights,
            to_nonzero(self.inner.chroma_width())?,
            to_nonzero(self.inner.chroma_height())?,
        )
    }

    /// Clears every accumulator and starts a new accumulate phase on the same storage.
    #[must_use]
    pub fn reset(self) -> AccumulationBuffer {
        let mut buffer = self.inner;
        buffer.luma_sums.fill(0);
        buffer.weights.fill(0);
        for sums in &mut buffer.chroma_sums {
            sums.fill(0);
        }
        buffer
    }
}

fn check_placement(x: usize, y: usize, n: usize, width: usize, height: usize) -> Result<()> {
    let outside = |pos: usize, extent: usize| pos.checked_add(n).is_none_or(|end| end > extent);
    if outside(x, width) || outside(y, height) {
        return Err(Error::InvalidArgument(format!(
            "{n}x{n} block at ({x}, {y}) does not fit in a {width}x{height} plane"
        )));
    }
    Ok(())
}
