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
        // SAFETY: the dispatcher only installs this kernel for `u8` samples;
        // SSE2 is part of the x86-64 baseline.
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

/// A 32x32 SAD assembled from four 16x16 partial sums.
#[must_use]
pub(super) fn get_sad_32x32<T: Pixel>(
    src1: &[T],
    stride1: usize,
    src2: &[T],
    stride2: usize,
) -> u64 {
    assert!(required_len(stride1, 32, 32).is_some_and(|len| src1.len() >= len));
    assert!(required_len(stride2, 32, 32).is_some_and(|len| src2.len() >= len));

    [(0, 0), (16, 0), (0, 16), (16, 16)]
        .into_iter()
        .map(|(x, y)| {
            get_sad::<T, 16>(
                &src1[x + y * stride1..],
                stride1,
                &src2[x + y * stride2..],
                stride2,
            )
        })
        .sum()
}

#[must_use]
#[target_feature(enable = "sse2")]
unsafe fn get_sad_u8<const N: usize>(
    src1: *const u8,
    stride1: usize,
    src2: *const u8,
    stride2: usize,
) -> u64 {
    let mut acc = _mm_setzero_si128();

    for y in 0..N {
        let row1 = src1.add(y * stride1);
        let row2 = src2.add(y * stride2);
        let mut x = 0;
        while x + 16 <= N {
            let a = _mm_loadu_si128(row1.add(x).cast::<__m128i>());
            let b = _mm_loadu_si128(row2.add(x).cast::<__m128i>());
            acc = _mm_add_epi64(acc, _mm_sad_epu8(a, b));
            x += 16;
        }
    }

    // Reduce 2x u64 lanes to scalar
    let high = _mm_unpackhi_epi64(acc, acc);
    let total = _mm_add_epi64(acc, high);
    _mm_cvtsi128_si64(total) as u64
}
