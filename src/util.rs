
use std::{convert::TryFrom, fmt::Debug};

use crate::{
    error::{Error, Result},
    params::BlockSize,
};

#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_avx2, "avx2");
#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_sse4, "sse4.1");
#[cfg(target_arch = "x86_64")]
cpufeatures::new!(cpuid_sse2, "sse2");

#[cfg(target_arch = "x86_64")]
pub use cpuid_avx2::get as has_avx2;
#[cfg(target_arch = "x86_64")]
pub use cpuid_sse2::get as has_sse2;
#[cfg(target_arch = "x86_64")]
pub use cpuid_sse4::get as has_sse4;

/// A sample type that can be blended and compared.
///
/// Implemented for `u8` (8-bit content) and `u16` (9 to 16-bit content).
pub trait Pixel:
    Clone
    + Copy
    + Debug
    + Default
    + Send
    + Sync
    + Into<u16>
    + Into<u32>
    + Into<u64>
    + From<u8>
    + TryFrom<u16>
    + TryFrom<u32>
    + MaxValue
    + PartialOrd
    + Ord
    + PartialEq
    + Eq
    + 'static
{
    #[must_use]
    fn from_or_max(value: u32) -> Self;

    #[must_use]
    fn abs_delta(self, other: Self) -> u32;
}

impl<T> Pixel for T
where
    T: Clone
        + Copy
        + Debug
        + Default
        + Send
        + Sync
        + Into<u16>
        + Into<u32>
        + Into<u64>
        + From<u8>
        + TryFrom<u16>
        + TryFrom<u32>
        + MaxValue
        + PartialOrd
        + Ord
        + PartialEq
        + Eq
        + 'static,
{
    fn from_or_max(value: u32) -> Self {
        Self::try_from(value).unwrap_or_else(|_| Self::max_value())
    }

    fn abs_delta(self, other: Self) -> u32 {
        let a: u32 = self.into();
        let b: u32 = other.into();
        a.abs_diff(b)
    }
}

pub trait MaxValue {
    #[must_use]
    fn max_value() -> Self;
}

impl MaxValue for u8 {
    fn max_value() -> Self {
        u8::MAX
    }
}

impl MaxValue for u16 {
    fn max_value() -> Self {
        u16::MAX
    }
}

/// Read-only view of a square block inside a larger strided sample buffer.
///
/// The slice starts at the block's top-left sample. Construction checks that
/// every row of the block is in bounds, so kernels can slice rows freely.
#[derive(Debug, Clone, Copy)]
pub struct PixelBlock<'a, T: Pixel> {
    data: &'a [T],
    stride: usize,
    size: BlockSize,
}

impl<'a, T: Pixel> PixelBlock<'a, T> {
    /// # Errors
    /// Returns `InvalidArgument` if `stride` is narrower than the block or
    /// `data` ends before the last row of the block.
    pub fn new(data: &'a [T], stride: usize, size: BlockSize) -> Result<Self> {
        let n = size.get();
        if stride < n {
            return Err(Error::InvalidArgument(format!(
                "stride {stride} is narrower than a {size} block"
            )));
        }
        let needed = required_len(stride, n, n).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{size} block with stride {stride} does not fit in memory"
            ))
        })?;
        if data.len() < needed {
            return Err(Error::InvalidArgument(format!(
                "{size} block with stride {stride} needs {needed} samples, got {}",
                data.len()
            )));
        }
        Ok(Self { data, stride, size })
    }

    #[must_use]
    pub const fn size(&self) -> BlockSize {
        self.size
    }

    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[must_use]
    pub const fn data(&self) -> &'a [T] {
        self.data
    }

    /// The `y`-th row of the block, exactly `size` samples long.
    #[must_use]
    pub fn row(&self, y: usize) -> &'a [T] {
        &self.data[y * self.stride..][..self.size.get()]
    }
}

/// Samples needed to hold `height` rows of `width` samples at `stride`,
/// or `None` if that count does not fit in a `usize`.
#[must_use]
pub const fn required_len(stride: usize, width: usize, height: usize) -> Option<usize> {
    if height == 0 {
        return Some(0);
    }
    match (height - 1).checked_mul(stride) {
        Some(rows) => rows.checked_add(width),
        None => None,
    }
}
