#![allow(clippy::undocumented_unsafe_blocks)]

use std::arch::x86_64::*;

use super::WEIGHT_SATURATION;

pub(super) fn check_weight_8(weights: &[u32]) -> bool {
    assert!(weights.len() >= 8);
    // SAFETY: the dispatcher only installs this kernel after confirming AVX2 support.
    unsafe { check_weight_8_impl(weights.as_ptr()) }
}

#[target_feature(enable = "avx2")]
unsafe fn check_weight_8_impl(weights: *const u32) -> bool {
    let w = _mm256_loadu_si256(weights.cast::<__m256i>());
    let uncovered = _mm256_cmpeq_epi32(w, _mm256_setzero_si256());
    // max(w, 1024) == w exactly when w >= 1024 (unsigned)
    let saturated = _mm256_cmpeq_epi32(
        _mm256_max_epu32(w, _mm256_set1_epi32(WEIGHT_SATURATION as i32)),
        w,
    );
    _mm256_movemask_epi8(_mm256_or_si256(uncovered, saturated)) != 0
}
