//! The four immutable symmetric Gaussian kernels used at each scale.
//!
//! Coefficients are Q16 unsigned integers summing to approximately 2^16,
//! taken verbatim from the reference filter bank.

/// Scale-0 kernel, 17 taps.
pub const KERNEL_SCALE_0: [u16; 17] = [
    489, 935, 1640, 2640, 3896, 5274, 6547, 7455, 7784, 7455, 6547, 5274, 3896, 2640, 1640, 935,
    489,
];

/// Scale-1 kernel, 9 taps.
pub const KERNEL_SCALE_1: [u16; 9] = [1244, 3663, 7925, 12590, 14692, 12590, 7925, 3663, 1244];

/// Scale-2 kernel, 5 taps.
pub const KERNEL_SCALE_2: [u16; 5] = [3571, 16004, 26386, 16004, 3571];

/// Scale-3 kernel, 3 taps.
pub const KERNEL_SCALE_3: [u16; 3] = [10904, 43728, 10904];

/// Returns the tap array for scale `s` (`s` in `0..=3`).
///
/// # Panics
///
/// Panics if `s` is not in `0..=3`; the orchestrator never calls this with
/// any other value.
pub fn taps_for_scale(s: usize) -> &'static [u16] {
    match s {
        0 => &KERNEL_SCALE_0,
        1 => &KERNEL_SCALE_1,
        2 => &KERNEL_SCALE_2,
        3 => &KERNEL_SCALE_3,
        _ => panic!("vif only defines four scales (0..=3), got {s}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_sum_to_roughly_one_q16_unit() {
        for s in 0..4 {
            let sum: u32 = taps_for_scale(s).iter().map(|&t| t as u32).sum();
            assert!(
                (65000..=66000).contains(&sum),
                "scale {s} taps summed to {sum}"
            );
        }
    }

    #[test]
    fn taps_are_symmetric() {
        for s in 0..4 {
            let taps = taps_for_scale(s);
            assert!(taps.iter().eq(taps.iter().rev()));
        }
    }
}
