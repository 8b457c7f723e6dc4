use super::is_invalid_weight;

pub(super) fn check_weight_1(weights: &[u32]) -> bool {
    is_invalid_weight(weights[0])
}
