#[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
mod avx2;
mod rust;
#[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
mod sse2;


use cfg_if::cfg_if;

use crate::{
    cpu::{CapabilityFlags, CpuTier},
    dispatch::{self, KernelTable, Slot},
    error::{Error, Result},
    params::{BlockSize, PlaneKind},
    util::{Pixel, PixelBlock},
};

/// Sum of absolute differences over one square block.
///
/// Arguments are `src1`, `stride1`, `src2`, `stride2`. Both slices start at the
/// block's top-left sample and hold at least one full block at their stride.
pub type SadFn<T> = fn(&[T], usize, &[T], usize) -> u64;

/// Computes the sum of absolute differences between two same-size blocks.
///
/// This is the block-matching cost used by motion search: the lower the SAD,
/// the better `src2` predicts `src1`.
///
/// # Parameters
/// - `kernels`: Kernel table the SAD kernel is taken from
/// - `src1`, `src2`: The blocks to compare; each carries its own stride
///
/// # Returns
/// The sum of `|src1[i] - src2[i]|` over the block. The sum is accumulated
/// in 64 bits, which cannot overflow for any supported block size or bit
/// depth. Every kernel tier returns exactly the scalar result.
///
/// # Performance
/// For 8-bit content, 16x16 and 32x32 blocks use `psadbw` (SSE2) and 32x32
/// blocks use its AVX2 form when available. 8x8 and 4x4 blocks are too
/// narrow to gain from it and stay scalar.
///
/// # Errors
/// Returns `InvalidArgument` if the blocks differ in size or the size is not
/// 32, 16, 8 or 4.
pub fn compute_sad<T: Pixel>(
    kernels: &KernelTable<T>,
    src1: PixelBlock<'_, T>,
    src2: PixelBlock<'_, T>,
) -> Result<u64> {
    if src1.size() != src2.size() {
        return Err(Error::InvalidArgument(format!(
            "cannot compare a {} block with a {} block",
            src1.size(),
            src2.size()
        )));
    }
    let kernel = kernels.sad(src1.size())?;
    Ok(kernel(src1.data(), src1.stride(), src2.data(), src2.stride()))
}

impl<T: Pixel> KernelTable<T> {
    /// # Errors
    /// Returns `InvalidArgument` if `size` has no SAD slot.
    pub fn sad(&self, size: BlockSize) -> Result<SadFn<T>> {
        dispatch::lookup(PlaneKind::Luma, size, &self.sad).map(|slot| slot.kernel)
    }
}

/// Picks the fastest SAD kernel allowed by `caps`.
pub(crate) fn sad_kernel<T: Pixel>(size: BlockSize, caps: CapabilityFlags) -> Slot<SadFn<T>> {
    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if caps.contains(CapabilityFlags::AVX2) && size == BlockSize::B32 {
                let kernel: SadFn<T> = avx2::get_sad::<T, 32>;
                return Slot::new(kernel, CpuTier::Avx2);
            }
            if caps.contains(CapabilityFlags::SSE2) {
                let kernel: Option<SadFn<T>> = match size {
                    BlockSize::B32 => Some(sse2::get_sad_32x32::<T>),
                    BlockSize::B16 => Some(sse2::get_sad::<T, 16>),
                    _ => None,
                };
                if let Some(kernel) = kernel {
                    return Slot::new(kernel, CpuTier::Sse2);
                }
            }
        } else {
            let _ = caps;
        }
    }

    let kernel: SadFn<T> = match size {
        BlockSize::B32 => rust::get_sad::<T, 32>,
        BlockSize::B16 => rust::get_sad::<T, 16>,
        BlockSize::B8 => rust::get_sad::<T, 8>,
        BlockSize::B4 => rust::get_sad::<T, 4>,
        BlockSize::B2 => unreachable!("SAD is only defined for luma block sizes"),
    };
    Slot::new(kernel, CpuTier::Rust)
}
