#[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
mod avx2;
mod rust;
#[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))]
mod sse41;


use std::fmt;

use cfg_if::cfg_if;

use crate::{
    cpu::{CapabilityFlags, CpuTier},
    error::{Error, Result},
};

/// Accumulated weight at which a pixel counts as fully covered.
pub const WEIGHT_SATURATION: u32 = 1024;

/// Returns `true` for a degenerate weight: never covered (`0`) or saturated
/// (`>= 1024`, no blending margin left).
#[must_use]
pub const fn is_invalid_weight(weight: u32) -> bool {
    weight == 0 || weight >= WEIGHT_SATURATION
}

/// Returns `true` if any weight in a batch is invalid.
///
/// The slice holds exactly the checker's batch width.
pub type CheckWeightFn = fn(&[u32]) -> bool;

/// The weight-validity check selected for this CPU.
///
/// Batched variants look at 4 or 8 weights at a time and agree with
/// [`is_invalid_weight`] applied to each element.
#[derive(Clone, Copy)]
pub struct WeightChecker {
    check: CheckWeightFn,
    batch_width: usize,
    tier: CpuTier,
}

impl WeightChecker {
    /// Number of weights consumed by one [`check_batch`](Self::check_batch) call.
    #[must_use]
    pub const fn batch_width(&self) -> usize {
        self.batch_width
    }

    #[must_use]
    pub const fn tier(&self) -> CpuTier {
        self.tier
    }

    /// Reports whether at least one weight of a single batch is invalid.
    ///
    /// # Errors
    /// Returns `InvalidArgument` unless `weights` holds exactly
    /// [`batch_width`](Self::batch_width) values.
    pub fn check_batch(&self, weights: &[u32]) -> Result<bool> {
        if weights.len() != self.batch_width {
            return Err(Error::InvalidArgument(format!(
                "weight batch must hold {} values, got {}",
                self.batch_width,
                weights.len()
            )));
        }
        Ok((self.check)(weights))
    }

    /// Reports whether any weight in `weights` is invalid, whatever its length.
    ///
    /// Whole batches go through the selected kernel, the tail is checked one
    /// value at a time.
    #[must_use]
    pub fn has_invalid(&self, weights: &[u32]) -> bool {
        let mut chunks = weights.chunks_exact(self.batch_width);
        let tail = chunks.remainder();
        chunks.any(self.check) || tail.iter().any(|&w| is_invalid_weight(w))
    }
}

impl fmt::Debug for WeightChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightChecker")
            .field("batch_width", &self.batch_width)
            .field("tier", &self.tier)
            .finish()
    }
}

/// Picks the widest weight check allowed by `caps`.
pub(crate) fn weight_checker(caps: CapabilityFlags) -> WeightChecker {
    cfg_if! {
        if #[cfg(all(target_arch = "x86_64", not(feature = "no_simd")))] {
            if caps.contains(CapabilityFlags::AVX2) {
                return WeightChecker {
                    check: avx2::check_weight_8,
                    batch_width: 8,
                    tier: CpuTier::Avx2,
                };
            }
            if caps.contains(CapabilityFlags::SSE4_1) {
                return WeightChecker {
                    check: sse41::check_weight_4,
                    batch_width: 4,
                    tier: CpuTier::Sse4_1,
                };
            }
        } else {
            let _ = caps;
        }
    }

    WeightChecker {
        check: rust::check_weight_1,
        batch_width: 1,
        tier: CpuTier::Rust,
    }
}
