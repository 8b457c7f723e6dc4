#![allow(clippy::undocumented_unsafe_blocks)]

use std::arch::x86_64::*;

use super::WEIGHT_SATURATION;

pub(super) fn check_weight_4(weights: &[u32]) -> bool {
    assert!(weights.len() >= 4);
    // SAFETY: the dispatcher only installs this kernel after confirming SSE4.1 support.
    unsafe { check_weight_4_impl(weights.as_ptr()) }
}

#[target_feature(enable = "sse4.1")]
unsafe fn check_weight_4_impl(weights: *const u32) -> bool {
    let w = _mm_loadu_si128(weights.cast::<__m128i>());
    let uncovered = _mm_cmpeq_epi32(w, _mm_setzero_si128());
    // max(w, 1024) == w exactly when w >= 1024 (unsigned)
    let saturated = _mm_cmpeq_epi32(
        _mm_max_epu32(w, _mm_set1_epi32(WEIGHT_SATURATION as i32)),
        w,
    );
    _mm_movemask_epi8(_mm_or_si128(uncovered, saturated)) != 0
}
