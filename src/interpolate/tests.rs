#![allow(clippy::unwrap_used, reason = "allow in test files")]

use pastey::paste;
use rand::Rng;

use super::*;
use crate::{
    dispatch::{CHROMA_SIZES, LUMA_SIZES},
    params::BitDepth,
    tests::{random_samples, random_weight_table, seeded_rng, table_for_tier},
};

fn scalar_u8() -> KernelTable<u8> {
    KernelTable::scalar(BitDepth::EIGHT).unwrap()
}

fn alphas(rng: &mut impl Rng) -> Vec<Alpha> {
    let mut alphas = vec![Alpha::new(0).unwrap(), Alpha::new(1024).unwrap()];
    alphas.extend((0..6).map(|_| Alpha::new(rng.random_range(0..=1024)).unwrap()));
    alphas
}

fn assert_luma_matches_scalar(table: &KernelTable<u8>) {
    let scalar = scalar_u8();
    let mut rng = seeded_rng();
    for size in LUMA_SIZES {
        let n = size.get();
        let stride = n + 7;
        for alpha in alphas(&mut rng) {
            let src1: Vec<u8> = random_samples(&mut rng, stride * n, 8);
            let src2: Vec<u8> = random_samples(&mut rng, stride * n, 8);
            let weight_table = random_weight_table(&mut rng, n * n);
            let dst: Vec<u32> = (0..stride * n).map(|_| rng.random_range(0..1 << 20)).collect();
            let weights: Vec<u32> = (0..stride * n).map(|_| rng.random_range(0..1 << 12)).collect();
            let b1 = PixelBlock::new(&src1, stride, size).unwrap();
            let b2 = PixelBlock::new(&src2, stride, size).unwrap();

            let (mut expected_dst, mut expected_weights) = (dst.clone(), weights.clone());
            interpolate(
                &scalar,
                size,
                &mut expected_dst,
                &mut expected_weights,
                stride,
                b1,
                b2,
                &weight_table,
                alpha,
            )
            .unwrap();

            let (mut actual_dst, mut actual_weights) = (dst, weights);
            interpolate(
                table,
                size,
                &mut actual_dst,
                &mut actual_weights,
                stride,
                b1,
                b2,
                &weight_table,
                alpha,
            )
            .unwrap();

            assert_eq!(actual_dst, expected_dst, "dst mismatch at {size}, alpha {alpha:?}");
            assert_eq!(
                actual_weights, expected_weights,
                "weights mismatch at {size}, alpha {alpha:?}"
            );
        }
    }
}

fn assert_chroma_matches_scalar(table: &KernelTable<u8>) {
    let scalar = scalar_u8();
    let mut rng = seeded_rng();
    for size in CHROMA_SIZES {
        let n = size.get();
        let stride = n + 5;
        for alpha in alphas(&mut rng) {
            let src1: Vec<u8> = random_samples(&mut rng, stride * n, 8);
            let src2: Vec<u8> = random_samples(&mut rng, stride * n, 8);
            let weight_table = random_weight_table(&mut rng, 4 * n * n);
            let dst: Vec<u32> = (0..stride * n).map(|_| rng.random_range(0..1 << 20)).collect();
            let b1 = PixelBlock::new(&src1, stride, size).unwrap();
            let b2 = PixelBlock::new(&src2, stride, size).unwrap();

            let mut expected = dst.clone();
            interpolate_chroma(&scalar, size, &mut expected, stride, b1, b2, &weight_table, alpha)
                .unwrap();
            let mut actual = dst;
            interpolate_chroma(table, size, &mut actual, stride, b1, b2, &weight_table, alpha)
                .unwrap();

            assert_eq!(actual, expected, "mismatch at chroma {size}, alpha {alpha:?}");
        }
    }
}

macro_rules! bit_exact_tests {
    ($module:ident, $tier:expr) => {
        paste! {
            #[test]
            fn [<luma_matches_scalar_ $module>]() {
                let Some(table) = table_for_tier($tier) else {
                    return;
                };
                assert_luma_matches_scalar(&table);
            }

            #[test]
            fn [<chroma_matches_scalar_ $module>]() {
                let Some(table) = table_for_tier($tier) else {
                    return;
                };
                assert_chroma_matches_scalar(&table);
            }

            #[test]
            fn [<luma_wraps_like_scalar_ $module>]() {
                let Some(table) = table_for_tier($tier) else {
                    return;
                };
                let size = BlockSize::B8;
                let src = vec![255u8; 64];
                let block = PixelBlock::new(&src, 8, size).unwrap();
                let weight_table = vec![u16::MAX; 64];
                let alpha = Alpha::new(300).unwrap();
                let mut dst = vec![u32::MAX - 10; 64];
                let mut weights = vec![u32::MAX; 64];
                interpolate(&table, size, &mut dst, &mut weights, 8, block, block, &weight_table, alpha)
                    .unwrap();

                // 255 * 65535 added to u32::MAX - 10 wraps around
                let expected = (u32::MAX - 10).wrapping_add(255 * 65535);
                assert!(dst.iter().all(|&d| d == expected));
                assert!(weights.iter().all(|&w| w == 65534));
            }
        }
    };
}

tier_tests!(bit_exact_tests);

#[test]
fn luma_formula() {
    let table = scalar_u8();
    let size = BlockSize::B4;
    // every row of the 4x4 block repeats the same four columns
    let src1 = [100u8, 0, 255, 10].repeat(4);
    let src2 = [200u8, 255, 0, 10].repeat(4);
    let weight_table = [300u16, 1, 2, 1024].repeat(4);
    let mut dst = vec![5u32; 16];
    let mut weights = vec![7u32; 16];
    interpolate(
        &table,
        size,
        &mut dst,
        &mut weights,
        4,
        PixelBlock::new(&src1, 4, size).unwrap(),
        PixelBlock::new(&src2, 4, size).unwrap(),
        &weight_table,
        Alpha::new(512).unwrap(),
    )
    .unwrap();

    // (512 * 100 + 512 * 200) >> 10 = 150
    // (512 * 0 + 512 * 255) >> 10 = 127
    // (512 * 10 + 512 * 10) >> 10 = 10
    let expected_dst: Vec<u32> = [5 + 300 * 150, 5 + 127, 5 + 2 * 127, 5 + 1024 * 10].repeat(4);
    let expected_weights: Vec<u32> = [7 + 300, 7 + 1, 7 + 2, 7 + 1024].repeat(4);
    assert_eq!(dst, expected_dst);
    assert_eq!(weights, expected_weights);
}

#[test]
fn alpha_selects_a_single_reference() {
    let table = scalar_u8();
    let size = BlockSize::B4;
    let src1 = vec![40u8; 16];
    let src2 = vec![90u8; 16];
    let weight_table = vec![2u16; 16];
    let b1 = PixelBlock::new(&src1, 4, size).unwrap();
    let b2 = PixelBlock::new(&src2, 4, size).unwrap();

    let mut dst = vec![0u32; 16];
    let mut weights = vec![0u32; 16];
    interpolate(&table, size, &mut dst, &mut weights, 4, b1, b2, &weight_table, Alpha::new(1024).unwrap())
        .unwrap();
    assert!(dst.iter().all(|&d| d == 80));

    let mut dst = vec![0u32; 16];
    interpolate(&table, size, &mut dst, &mut weights, 4, b1, b2, &weight_table, Alpha::new(0).unwrap())
        .unwrap();
    assert!(dst.iter().all(|&d| d == 180));
    assert!(weights.iter().all(|&w| w == 4));
}

#[test]
fn luma_4x4_touches_only_its_own_footprint() {
    let stride = 40;
    let size = BlockSize::B4;
    let src = vec![8u8; stride * 4];
    let block = PixelBlock::new(&src, stride, size).unwrap();
    let weight_table = vec![1u16; 16];
    let alpha = Alpha::new(512).unwrap();

    for tier in CpuTier::ALL {
        let Some(table) = table_for_tier(tier) else {
            continue;
        };
        let mut dst = vec![0u32; stride * 5];
        let mut weights = vec![0u32; stride * 5];
        interpolate(&table, size, &mut dst, &mut weights, stride, block, block, &weight_table, alpha)
            .unwrap();

        for y in 0..5 {
            for x in 0..stride {
                let inside = x < 4 && y < 4;
                let i = x + y * stride;
                assert_eq!(dst[i], if inside { 8 } else { 0 }, "{tier} dst at ({x}, {y})");
                assert_eq!(weights[i], u32::from(inside), "{tier} weights at ({x}, {y})");
            }
        }
    }
}

#[test]
fn chroma_reads_every_other_entry_of_every_other_row() {
    let table = scalar_u8();
    let size = BlockSize::B4;
    let n = size.get();
    // Luma table of the co-located 8x8 block: even positions of even rows hold
    // their chroma coordinates, everything else is a poison value.
    let mut weight_table = vec![999u16; 4 * n * n];
    for y in 0..n {
        for x in 0..n {
            weight_table[2 * x + 2 * y * 2 * n] = (1 + x + 10 * y) as u16;
        }
    }
    let src = vec![1u8; n * n];
    let block = PixelBlock::new(&src, n, size).unwrap();
    let mut dst = vec![0u32; n * n];
    interpolate_chroma(&table, size, &mut dst, n, block, block, &weight_table, Alpha::new(700).unwrap())
        .unwrap();

    for y in 0..n {
        for x in 0..n {
            assert_eq!(dst[x + y * n], (1 + x + 10 * y) as u32);
        }
    }
}

#[test]
fn chroma_2x2_processes_two_rows() {
    let table = scalar_u8();
    let size = BlockSize::B2;
    let stride = 4;
    let src = vec![50u8; stride * 2];
    let block = PixelBlock::new(&src, stride, size).unwrap();
    let weight_table = vec![3u16; 16];
    let mut dst = vec![0u32; stride * 4];
    interpolate_chroma(&table, size, &mut dst, stride, block, block, &weight_table, Alpha::new(1).unwrap())
        .unwrap();

    assert_eq!(&dst[..2], &[150, 150]);
    assert_eq!(&dst[4..6], &[150, 150]);
    assert!(dst[8..].iter().all(|&d| d == 0));
    assert_eq!(&dst[2..4], &[0, 0]);
}

#[test]
fn high_bit_depth_blend() {
    let table = KernelTable::<u16>::scalar(BitDepth::try_from(10).unwrap()).unwrap();
    let size = BlockSize::B4;
    let src1 = vec![1023u16; 16];
    let src2 = vec![1u16; 16];
    let weight_table = vec![1000u16; 16];
    let b1 = PixelBlock::new(&src1, 4, size).unwrap();
    let b2 = PixelBlock::new(&src2, 4, size).unwrap();
    let mut dst = vec![0u32; 16];
    let mut weights = vec![0u32; 16];
    interpolate(&table, size, &mut dst, &mut weights, 4, b1, b2, &weight_table, Alpha::new(256).unwrap())
        .unwrap();

    // (256 * 1023 + 768 * 1) >> 10 = 256
    assert!(dst.iter().all(|&d| d == 1000 * 256));
    assert!(weights.iter().all(|&w| w == 1000));
}

#[test]
fn rejects_luma_2x2() {
    let table = scalar_u8();
    let src = vec![0u8; 4];
    let block = PixelBlock::new(&src, 2, BlockSize::B2).unwrap();
    let result = interpolate(
        &table,
        BlockSize::B2,
        &mut [0; 4],
        &mut [0; 4],
        2,
        block,
        block,
        &[0; 4],
        Alpha::default(),
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn rejects_chroma_32x32() {
    let table = scalar_u8();
    let src = vec![0u8; 32 * 32];
    let block = PixelBlock::new(&src, 32, BlockSize::B32).unwrap();
    let mut dst = vec![0u32; 32 * 32];
    let result = interpolate_chroma(
        &table,
        BlockSize::B32,
        &mut dst,
        32,
        block,
        block,
        &vec![0; 64 * 64],
        Alpha::default(),
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn rejects_mismatched_block_sizes() {
    let table = scalar_u8();
    let src = vec![0u8; 64];
    let small = PixelBlock::new(&src, 8, BlockSize::B4).unwrap();
    let large = PixelBlock::new(&src, 8, BlockSize::B8).unwrap();
    let result = interpolate(
        &table,
        BlockSize::B8,
        &mut [0; 64],
        &mut [0; 64],
        8,
        small,
        large,
        &[0; 64],
        Alpha::default(),
    );
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn rejects_wrong_weight_table_size() {
    let table = scalar_u8();
    let src = vec![0u8; 64];
    let block = PixelBlock::new(&src, 8, BlockSize::B8).unwrap();

    let luma = interpolate(
        &table,
        BlockSize::B8,
        &mut [0; 64],
        &mut [0; 64],
        8,
        block,
        block,
        &[0; 63],
        Alpha::default(),
    );
    assert!(matches!(luma, Err(Error::InvalidArgument(_))));

    // chroma needs the 16x16 luma table, not an 8x8 one
    let chroma = interpolate_chroma(
        &table,
        BlockSize::B8,
        &mut [0; 64],
        8,
        block,
        block,
        &[0; 64],
        Alpha::default(),
    );
    assert!(matches!(chroma, Err(Error::InvalidArgument(_))));
}

#[test]
fn rejects_short_accumulators() {
    let table = scalar_u8();
    let src = vec![0u8; 64];
    let block = PixelBlock::new(&src, 8, BlockSize::B8).unwrap();

    let short_dst = interpolate(
        &table,
        BlockSize::B8,
        &mut [0; 63],
        &mut [0; 64],
        8,
        block,
        block,
        &[0; 64],
        Alpha::default(),
    );
    assert!(matches!(short_dst, Err(Error::InvalidArgument(_))));

    let short_weights = interpolate(
        &table,
        BlockSize::B8,
        &mut [0; 64],
        &mut [0; 56],
        8,
        block,
        block,
        &[0; 64],
        Alpha::default(),
    );
    assert!(matches!(short_weights, Err(Error::InvalidArgument(_))));

    let narrow_stride = interpolate(
        &table,
        BlockSize::B8,
        &mut [0; 64],
        &mut [0; 64],
        4,
        block,
        block,
        &[0; 64],
        Alpha::default(),
    );
    assert!(matches!(narrow_stride, Err(Error::InvalidArgument(_))));
}

#[test]
fn rejects_overflowing_accumulator_stride() {
    let table = scalar_u8();
    let src = vec![0u8; 64];
    let block = PixelBlock::new(&src, 8, BlockSize::B8).unwrap();
    for stride in [usize::MAX, usize::MAX / 2] {
        let result = interpolate(
            &table,
            BlockSize::B8,
            &mut [0; 64],
            &mut [0; 64],
            stride,
            block,
            block,
            &[0; 64],
            Alpha::default(),
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "stride {stride}");

        let result = interpolate_chroma(
            &table,
            BlockSize::B8,
            &mut [0; 64],
            stride,
            block,
            block,
            &[0; 256],
            Alpha::default(),
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))), "stride {stride}");
    }
}
