#![allow(clippy::undocumented_unsafe_blocks)]

use std::arch::x86_64::*;

use crate::{params::Alpha, util::Pixel};

pub(super) fn interpolate_line<T: Pixel, const N: usize>(
    dst: &mut [u32],
    weights: &mut [u32],
    src1: &[T],
    src2: &[T],
    weight_row: &[u16],
    alpha: Alpha,
) {
    // Check the array bounds once before handing out raw pointers.
    assert!(dst.len() >= N && weights.len() >= N);
    assert!(src1.len() >= N && src2.len() >= N && weight_row.len() >= N);

    match size_of::<T>() {
        // SAFETY: the dispatcher only installs this kernel for `u8` samples
        // after confirming AVX2 support.
        1 => unsafe {
            interpolate_line_u8::<N>(
                dst.as_mut_ptr(),
                weights.as_mut_ptr(),
                src1.as_ptr().cast::<u8>(),
                src2.as_ptr().cast::<u8>(),
                weight_row.as_ptr(),
                alpha,
            );
        },
        _ => unreachable!(),
    }
}

pub(super) fn interpolate_chroma_line<T: Pixel, const N: usize>(
    dst: &mut [u32],
    src1: &[T],
    src2: &[T],
    weight_row: &[u16],
    alpha: Alpha,
) {
    assert!(dst.len() >= N && src1.len() >= N && src2.len() >= N);
    assert!(weight_row.len() >= 2 * N);

    match size_of::<T>() {
        // SAFETY: the dispatcher only installs this kernel for `u8` samples
        // after confirming AVX2 support.
        1 => unsafe {
            interpolate_chroma_line_u8::<N>(
                dst.as_mut_ptr(),
                src1.as_ptr().cast::<u8>(),
                src2.as_ptr().cast::<u8>(),
                weight_row.as_ptr(),
                alpha,
            );
        },
        _ => unreachable!(),
    }
}

/// Widens eight `u8` samples to eight `u32` lanes.
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn load_8_u8(src: *const u8) -> __m256i {
    _mm256_cvtepu8_epi32(_mm_loadl_epi64(src.cast::<__m128i>()))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn blend_8(s1: __m256i, s2: __m256i, alpha: __m256i, inverse: __m256i) -> __m256i {
    _mm256_srli_epi32::<10>(_mm256_add_epi32(
        _mm256_mullo_epi32(alpha, s1),
        _mm256_mullo_epi32(inverse, s2),
    ))
}

#[target_feature(enable = "avx2")]
unsafe fn interpolate_line_u8<const N: usize>(
    dst: *mut u32,
    weights: *mut u32,
    src1: *const u8,
    src2: *const u8,
    weight_row: *const u16,
    alpha: Alpha,
) {
    let alpha_share = _mm256_set1_epi32(i32::from(alpha.get()));
    let inverse_share = _mm256_set1_epi32(i32::from(alpha.inverse()));

    let mut x = 0;
    while x + 8 <= N {
        let s1 = load_8_u8(src1.add(x));
        let s2 = load_8_u8(src2.add(x));
        let w = _mm256_cvtepu16_epi32(_mm_loadu_si128(weight_row.add(x).cast::<__m128i>()));
        let blended = blend_8(s1, s2, alpha_share, inverse_share);

        let dst_ptr = dst.add(x).cast::<__m256i>();
        let acc = _mm256_loadu_si256(dst_ptr);
        _mm256_storeu_si256(dst_ptr, _mm256_add_epi32(acc, _mm256_mullo_epi32(w, blended)));

        let weights_ptr = weights.add(x).cast::<__m256i>();
        let total = _mm256_loadu_si256(weights_ptr);
        _mm256_storeu_si256(weights_ptr, _mm256_add_epi32(total, w));

        x += 8;
    }
}

#[target_feature(enable = "avx2")]
unsafe fn interpolate_chroma_line_u8<const N: usize>(
    dst: *mut u32,
    src1: *const u8,
    src2: *const u8,
    weight_row: *const u16,
    alpha: Alpha,
) {
    let alpha_share = _mm256_set1_epi32(i32::from(alpha.get()));
    let inverse_share = _mm256_set1_epi32(i32::from(alpha.inverse()));
    // Keeps the even u16 of every 32-bit lane.
    let even_mask = _mm256_set1_epi32(0xFFFF);

    let mut x = 0;
    while x + 8 <= N {
        let s1 = load_8_u8(src1.add(x));
        let s2 = load_8_u8(src2.add(x));
        let pairs = _mm256_loadu_si256(weight_row.add(2 * x).cast::<__m256i>());
        let w = _mm256_and_si256(pairs, even_mask);
        let blended = blend_8(s1, s2, alpha_share, inverse_share);

        let dst_ptr = dst.add(x).cast::<__m256i>();
        let acc = _mm256_loadu_si256(dst_ptr);
        _mm256_storeu_si256(dst_ptr, _mm256_add_epi32(acc, _mm256_mullo_epi32(w, blended)));

        x += 8;
    }
}
