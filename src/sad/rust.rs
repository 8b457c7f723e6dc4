use crate::util::Pixel;

#[must_use]
pub(super) fn get_sad<T: Pixel, const N: usize>(
    src1: &[T],
    stride1: usize,
    src2: &[T],
    stride2: usize,
) -> u64 {
    let mut sum = 0;
    for y in 0..N {
        let row1 = &src1[y * stride1..][..N];
        let row2 = &src2[y * stride2..][..N];
        sum += row1
            .iter()
            .zip(row2.iter())
            .fold(0u64, |acc, (&a, &b)| acc + u64::from(a.abs_delta(b)));
    }
    sum
}
