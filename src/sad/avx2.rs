#![allow(clippy::undocumented_unsafe_blocks)]

use std::arch::x86_64::*;

use crate::util::{Pixel, required_len};

#[must_use]
pub(super) fn get_sad<T: Pixel, const N: usize>(
    src1: &[T],
    stride1: usize,
    src2: &[T],
    stride2: usize,
) -> u64 {
    // Check the array bounds once before handing out raw pointers.
    assert!(required_len(stride1, N, N).is_some_and(|len| src1.len() >= len));
    assert!(required_len(stride2, N, N).is_some_and(|len| src2.len() >= len));

    match size_of::<T>() {
        // SAFETY: the dispatcher only installs this kernel for `u8` samples
        // after confirming AVX2 support.
        1 => unsafe {
            get_sad_u8::<N>(
                src1.as_ptr().cast::<u8>(),
                stride1,
                src2.as_ptr().cast::<u8>(),
                stride2,
            )
        },
        _ => unreachable!(),
    }
}

#[must_use]
#[target_feature(enable = "avx2")]
unsafe fn get_sad_u8<const N: usize>(
    src1: *const u8,
    stride1: usize,
    src2: *const u8,
    stride2: usize,
) -> u64 {
    let mut acc = _mm256_setzero_si256();

    for y in 0..N {
        let row1 = src1.add(y * stride1);
        let row2 = src2.add(y * stride2);
        let mut x = 0;
        while x + 32 <= N {
            let a = _mm256_loadu_si256(row1.add(x).cast::<__m256i>());
            let b = _mm256_loadu_si256(row2.add(x).cast::<__m256i>());
            acc = _mm256_add_epi64(acc, _mm256_sad_epu8(a, b));
            x += 32;
        }
    }

    // Reduce acc: add high and low 128-bit lanes
    let lo = _mm256_castsi256_si128(acc);
    let hi = _mm256_extracti128_si256::<1>(acc);
    let combined = _mm_add_epi64(lo, hi);

    // Reduce 2x u64 lanes to scalar
    let high = _mm_unpackhi_epi64(combined, combined);
    let total = _mm_add_epi64(combined, high);
    _mm_cvtsi128_si64(total) as u64
}
