use crate::{params::Alpha, util::Pixel};

#[inline]
fn blend<T: Pixel>(src1: T, src2: T, alpha: u32, inverse: u32) -> u32 {
    let a: u32 = src1.into();
    let b: u32 = src2.into();
    (alpha * a + inverse * b) >> Alpha::SHIFT
}

pub(super) fn interpolate_line<T: Pixel, const N: usize>(
    dst: &mut [u32],
    weights: &mut [u32],
    src1: &[T],
    src2: &[T],
    weight_row: &[u16],
    alpha: Alpha,
) {
    let alpha_share = u32::from(alpha.get());
    let inverse_share = u32::from(alpha.inverse());
    let dst = &mut dst[..N];
    let weights = &mut weights[..N];
    let src1 = &src1[..N];
    let src2 = &src2[..N];
    let weight_row = &weight_row[..N];

    for x in 0..N {
        let w = u32::from(weight_row[x]);
        weights[x] = weights[x].wrapping_add(w);
        dst[x] = dst[x].wrapping_add(w.wrapping_mul(blend(
            src1[x],
            src2[x],
            alpha_share,
            inverse_share,
        )));
    }
}

pub(super) fn interpolate_chroma_line<T: Pixel, const N: usize>(
    dst: &mut [u32],
    src1: &[T],
    src2: &[T],
    weight_row: &[u16],
    alpha: Alpha,
) {
    let alpha_share = u32::from(alpha.get());
    let inverse_share = u32::from(alpha.inverse());
    let dst = &mut dst[..N];
    let src1 = &src1[..N];
    let src2 = &src2[..N];
    let weight_row = &weight_row[..2 * N];

    for x in 0..N {
        let w = u32::from(weight_row[2 * x]);
        dst[x] = dst[x].wrapping_add(w.wrapping_mul(blend(
            src1[x],
            src2[x],
            alpha_share,
            inverse_share,
        )));
    }
}
