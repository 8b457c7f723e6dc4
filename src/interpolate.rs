#[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
mod avx2;
mod rust;
#[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
mod sse41;

#[cfg(test)]
mod tests;

use cfg_if::cfg_if;

use crate::{
    cpu::{CapabilityFlags, CpuTier},
    dispatch::{self, KernelTable, Slot},
    error::{Error, Result},
    params::{Alpha, BlockSize, PlaneKind},
    util::{Pixel, PixelBlock, required_len},
};

/// Blends one luma row into the accumulators.
///
/// Arguments are `dst`, `weights`, `src1`, `src2`, the weight-table row and alpha.
/// Every slice is exactly one block row long.
pub type LumaLineFn<T> = fn(&mut [u32], &mut [u32], &[T], &[T], &[u16], Alpha);

/// Blends one chroma row into the accumulator.
///
/// Arguments are `dst`, `src1`, `src2`, the luma-resolution weight-table row and
/// alpha. The weight row is twice as long as the block row; only even entries are read.
pub type ChromaLineFn<T> = fn(&mut [u32], &[T], &[T], &[u16], Alpha);

/// Where a block's rows live in its overlap weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableLayout {
    size: usize,
    pitch: usize,
    row_len: usize,
}

impl TableLayout {
    const fn luma(size: BlockSize) -> Self {
        let n = size.get();
        Self {
            size: n,
            pitch: n,
            row_len: n,
        }
    }

    /// 4:2:0 chroma shares the table of the co-located `2n x 2n` luma block:
    /// chroma row `y` reads luma row `2y`, chroma column `x` reads luma column `2x`.
    const fn chroma(size: BlockSize) -> Self {
        let n = size.get();
        Self {
            size: n,
            pitch: 4 * n,
            row_len: 2 * n,
        }
    }

    const fn table_len(self) -> usize {
        self.row_len * self.row_len
    }
}

/// Accumulates a weighted blend of `src1` and `src2` into a luma region.
///
/// This is the overlap-add step of block-based frame interpolation. Every
/// motion-compensated block contributes its temporal blend of the two
/// references, scaled by the overlap window weight at each position, and the
/// window weight itself is added to the running weight total so that
/// [`normalize`](crate::normalize()) can divide it back out later.
///
/// For every pixel `i` of the block:
/// - `weights[i] += weight_table[i]`
/// - `dst[i] += weight_table[i] * ((alpha * src1[i] + (1024 - alpha) * src2[i]) >> 10)`
///
/// # Parameters
/// - `kernels`: Kernel table the line kernel is taken from
/// - `size`: Block size, one of 32, 16, 8 or 4
/// - `dst`: Weighted-sum accumulator, starting at the block's top-left position
/// - `weights`: Weight accumulator, laid out exactly like `dst`
/// - `stride`: Row pitch of `dst` and `weights`, in elements
/// - `src1`, `src2`: The two motion-compensated reference blocks
/// - `weight_table`: The `size x size` overlap window for this block position, row pitch `size`
/// - `alpha`: Share of `src1` in 1/1024 units
///
/// # Returns
/// `Ok(())` once every row of the block has been added. Accumulation wraps at
/// 32 bits, identically in every kernel tier.
///
/// # Errors
/// Returns `InvalidArgument` if `size` is not a luma block size (32, 16, 8, 4),
/// the source blocks are a different size, the weight table has the wrong
/// length, or `dst`/`weights` cannot hold the block at `stride`.
/// Nothing is written when an error is returned.
///
/// # Performance
/// The kernel is looked up once per call and then run per row; for 8-bit
/// content the SSE4.1 and AVX2 tiers process 4 and 8 pixels per step.
pub fn interpolate<T: Pixel>(
    kernels: &KernelTable<T>,
    size: BlockSize,
    dst: &mut [u32],
    weights: &mut [u32],
    stride: usize,
    src1: PixelBlock<'_, T>,
    src2: PixelBlock<'_, T>,
    weight_table: &[u16],
    alpha: Alpha,
) -> Result<()> {
    let kernel = kernels.luma_line(size)?;
    let layout = TableLayout::luma(size);
    check_block(layout, size, dst.len(), stride, &src1, &src2, weight_table)?;
    check_accumulator("weights", weights.len(), stride, size)?;

    let n = layout.size;
    blend_rows(
        layout,
        dst,
        stride,
        &src1,
        &src2,
        weight_table,
        |dst_row, s1, s2, table_row, offset| {
            kernel(dst_row, &mut weights[offset..][..n], s1, s2, table_row, alpha);
        },
    );
    Ok(())
}

/// Accumulates a weighted blend of `src1` and `src2` into a chroma region.
///
/// Identical to [`interpolate`] except that no weight is accumulated: the luma
/// pass already recorded the weight total for the co-located pixels.
///
/// # Parameters
/// - `kernels`: Kernel table the line kernel is taken from
/// - `size`: Chroma block size, one of 16, 8, 4 or 2
/// - `dst`: Weighted-sum accumulator, starting at the block's top-left position
/// - `stride`: Row pitch of `dst`, in elements
/// - `src1`, `src2`: The two motion-compensated chroma reference blocks
/// - `weight_table`: The overlap window of the co-located `2 * size` luma
///   block. Chroma pixel `(x, y)` reads entry `2 * x + y * 4 * size`.
/// - `alpha`: Share of `src1` in 1/1024 units
///
/// # Errors
/// Returns `InvalidArgument` if `size` is not a chroma block size (16, 8, 4, 2),
/// the source blocks are a different size, the weight table does not hold
/// `(2 * size)^2` entries, or `dst` cannot hold the block at `stride`.
pub fn interpolate_chroma<T: Pixel>(
    kernels: &KernelTable<T>,
    size: BlockSize,
    dst: &mut [u32],
    stride: usize,
    src1: PixelBlock<'_, T>,
    src2: PixelBlock<'_, T>,
    weight_table: &[u16],
    alpha: Alpha,
) -> Result<()> {
    let kernel = kernels.chroma_line(size)?;
    let layout = TableLayout::chroma(size);
    check_block(layout, size, dst.len(), stride, &src1, &src2, weight_table)?;

    blend_rows(
        layout,
        dst,
        stride,
        &src1,
        &src2,
        weight_table,
        |dst_row, s1, s2, table_row, _offset| {
            kernel(dst_row, s1, s2, table_row, alpha);
        },
    );
    Ok(())
}

/// Walks the rows of one block, handing each row to `line` together with the
/// row's offset into the accumulation region.
fn blend_rows<T: Pixel>(
    layout: TableLayout,
    dst: &mut [u32],
    stride: usize,
    src1: &PixelBlock<'_, T>,
    src2: &PixelBlock<'_, T>,
    weight_table: &[u16],
    mut line: impl FnMut(&mut [u32], &[T], &[T], &[u16], usize),
) {
    let n = layout.size;
    for y in 0..n {
        let offset = y * stride;
        line(
            &mut dst[offset..][..n],
            src1.row(y),
            src2.row(y),
            &weight_table[y * layout.pitch..][..layout.row_len],
            offset,
        );
    }
}

fn check_block<T: Pixel>(
    layout: TableLayout,
    size: BlockSize,
    dst_len: usize,
    stride: usize,
    src1: &PixelBlock<'_, T>,
    src2: &PixelBlock<'_, T>,
    weight_table: &[u16],
) -> Result<()> {
    if src1.size() != size || src2.size() != size {
        return Err(Error::InvalidArgument(format!(
            "reference blocks are {} and {}, expected {size}",
            src1.size(),
            src2.size()
        )));
    }
    if weight_table.len() != layout.table_len() {
        return Err(Error::InvalidArgument(format!(
            "weight table for a {size} block must hold {} entries, got {}",
            layout.table_len(),
            weight_table.len()
        )));
    }
    check_accumulator("dst", dst_len, stride, size)
}

fn check_accumulator(name: &str, len: usize, stride: usize, size: BlockSize) -> Result<()> {
    let n = size.get();
    if stride < n {
        return Err(Error::InvalidArgument(format!(
            "stride {stride} is narrower than a {size} block"
        )));
    }
    let needed = required_len(stride, n, n).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "{name} stride {stride} overflows for a {size} block"
        ))
    })?;
    if len < needed {
        return Err(Error::InvalidArgument(format!(
            "{name} needs {needed} entries for a {size} block at stride {stride}, got {len}"
        )));
    }
    Ok(())
}

/// Picks the fastest luma line kernel allowed by `caps`.
///
/// `caps` must already be restricted to what the host runs and to 8-bit `u8` content.
pub(crate) fn luma_line_kernel<T: Pixel>(
    size: BlockSize,
    caps: CapabilityFlags,
) -> Slot<LumaLineFn<T>> {
    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if caps.contains(CapabilityFlags::AVX2) {
                let kernel: Option<LumaLineFn<T>> = match size {
                    BlockSize::B32 => Some(avx2::interpolate_line::<T, 32>),
                    BlockSize::B16 => Some(avx2::interpolate_line::<T, 16>),
                    BlockSize::B8 => Some(avx2::interpolate_line::<T, 8>),
                    _ => None,
                };
                if let Some(kernel) = kernel {
                    return Slot::new(kernel, CpuTier::Avx2);
                }
            }
            if caps.contains(CapabilityFlags::SSE4_1) {
                let kernel: Option<LumaLineFn<T>> = match size {
                    BlockSize::B32 => Some(sse41::interpolate_line::<T, 32>),
                    BlockSize::B16 => Some(sse41::interpolate_line::<T, 16>),
                    BlockSize::B8 => Some(sse41::interpolate_line::<T, 8>),
                    BlockSize::B4 => Some(sse41::interpolate_line::<T, 4>),
                    BlockSize::B2 => None,
                };
                if let Some(kernel) = kernel {
                    return Slot::new(kernel, CpuTier::Sse4_1);
                }
            }
        } else {
            let _ = caps;
        }
    }

    let kernel: LumaLineFn<T> = match size {
        BlockSize::B32 => rust::interpolate_line::<T, 32>,
        BlockSize::B16 => rust::interpolate_line::<T, 16>,
        BlockSize::B8 => rust::interpolate_line::<T, 8>,
        BlockSize::B4 => rust::interpolate_line::<T, 4>,
        BlockSize::B2 => unreachable!("luma blocks are at least 4x4"),
    };
    Slot::new(kernel, CpuTier::Rust)
}

/// Picks the fastest chroma line kernel allowed by `caps`.
pub(crate) fn chroma_line_kernel<T: Pixel>(
    size: BlockSize,
    caps: CapabilityFlags,
) -> Slot<ChromaLineFn<T>> {
    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if caps.contains(CapabilityFlags::AVX2) {
                let kernel: Option<ChromaLineFn<T>> = match size {
                    BlockSize::B16 => Some(avx2::interpolate_chroma_line::<T, 16>),
                    BlockSize::B8 => Some(avx2::interpolate_chroma_line::<T, 8>),
                    _ => None,
                };
                if let Some(kernel) = kernel {
                    return Slot::new(kernel, CpuTier::Avx2);
                }
            }
            if caps.contains(CapabilityFlags::SSE4_1) {
                let kernel: Option<ChromaLineFn<T>> = match size {
                    BlockSize::B16 => Some(sse41::interpolate_chroma_line::<T, 16>),
                    BlockSize::B8 => Some(sse41::interpolate_chroma_line::<T, 8>),
                    BlockSize::B4 => Some(sse41::interpolate_chroma_line::<T, 4>),
                    _ => None,
                };
                if let Some(kernel) = kernel {
                    return Slot::new(kernel, CpuTier::Sse4_1);
                }
            }
        } else {
            let _ = caps;
        }
    }

    let kernel: ChromaLineFn<T> = match size {
        BlockSize::B16 => rust::interpolate_chroma_line::<T, 16>,
        BlockSize::B8 => rust::interpolate_chroma_line::<T, 8>,
        BlockSize::B4 => rust::interpolate_chroma_line::<T, 4>,
        BlockSize::B2 => rust::interpolate_chroma_line::<T, 2>,
        BlockSize::B32 => unreachable!("no 32x32 chroma blocks in 4:2:0"),
    };
    Slot::new(kernel, CpuTier::Rust)
}

impl<T: Pixel> KernelTable<T> {
    /// # Errors
    /// Returns `InvalidArgument` if `size` has no luma slot.
    pub fn luma_line(&self, size: BlockSize) -> Result<LumaLineFn<T>> {
        dispatch::lookup(PlaneKind::Luma, size, &self.luma).map(|slot| slot.kernel)
    }

    /// # Errors
    /// Returns `InvalidArgument` if `size` has no chroma slot.
    pub fn chroma_line(&self, size: BlockSize) -> Result<ChromaLineFn<T>> {
        dispatch::lookup(PlaneKind::Chroma, size, &self.chroma).map(|slot| slot.kernel)
    }
}
