//! Fixed-point primitives: the top-16-significant-bit normalizer and the
//! base-2 logarithm table it feeds.

/// Minimax polynomial coefficients (leading order first) approximating
/// `log2(1 + x)` for `x` in `[0, 1)`, evaluated on the de-biased mantissa of
/// an IEEE-754 value. Reproduced bit-for-bit from the reference
/// implementation so [`build_log_table`] matches it exactly.
const LOG2_POLY: [f32; 9] = [
    -0.012671635276421,
    0.064841182402670,
    -0.157048836463065,
    0.257167726303123,
    -0.353800560300520,
    0.480131410397451,
    -0.721314327952201,
    1.442694803896991,
    0.0,
];

#[inline]
fn horner(x: f32, coeffs: &[f32]) -> f32 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Reduces a positive `u32` magnitude to a top-16-significant-bit mantissa
/// `m` in `[2^15, 2^16)` and a shift `x` such that `v ≈ m * 2^(-x)`.
///
/// # Panics
///
/// Debug builds assert `v > 0`; callers guarantee this (see `spec.md` §4.1).
#[inline]
pub fn top16_from_u32(v: u32) -> (u32, i32) {
    debug_assert!(v > 0, "top16_from_u32 requires v > 0");
    let k = v.leading_zeros() as i32;
    let j = 16 - k;
    let m = if j >= 0 { v >> j } else { v << (-j) };
    (m, -j)
}

/// Reduces a positive `u64` magnitude to a top-16-significant-bit mantissa
/// `m` in `[2^15, 2^16]` and a shift `x` such that `v ≈ m * 2^(-x)`.
#[inline]
pub fn top16_from_u64(v: u64) -> (u64, i32) {
    debug_assert!(v > 0, "top16_from_u64 requires v > 0");
    let k = v.leading_zeros() as i32;
    if k > 48 {
        let shift = k - 48;
        (v << shift, shift)
    } else if k < 47 {
        let j = 48 - k;
        (v >> j, -j)
    } else if v >> 16 != 0 {
        (v >> 1, -1)
    } else {
        (v, 0)
    }
}

/// Number of entries in the log table; only indices `32768..=65535` are
/// meaningful, matching the domain [`top16_from_u32`]/[`top16_from_u64`]
/// guarantee their mantissa lands in.
pub const LOG_TABLE_LEN: usize = 65536;

/// Builds the base-2 log table: `L[i] = round(log2(i) * 2048)` for
/// `i` in `32768..=65535`, computed via the same bit-level mantissa
/// extraction the reference implementation uses instead of a library
/// `log2`, so the table is deterministic and matches it to within 1 ULP.
pub fn build_log_table() -> Box<[u16; LOG_TABLE_LEN]> {
    let mut table = vec![0u16; LOG_TABLE_LEN].into_boxed_slice();
    for i in 32768..LOG_TABLE_LEN {
        let x = i as f32;
        let bits = x.to_bits();
        let exponent = ((bits >> 23) & 0xFF) as i32 - 127;
        let mantissa_bits = (bits & 0x007F_FFFF) | 0x3F80_0000;
        let mantissa = f32::from_bits(mantissa_bits) - 1.0;
        let log2_i = exponent as f32 + horner(mantissa, &LOG2_POLY);
        table[i] = (log2_i * 2048.0).round() as u16;
    }
    table
        .try_into()
        .unwrap_or_else(|_| unreachable!("table is built with exactly LOG_TABLE_LEN entries"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_table_matches_reference_within_one_ulp() {
        let table = build_log_table();
        for i in 32768..LOG_TABLE_LEN {
            let expected = (f64::from(i as u32).log2() * 2048.0).round() as i64;
            let actual = i64::from(table[i]);
            assert!(
                (expected - actual).abs() <= 1,
                "i={i} expected={expected} actual={actual}"
            );
        }
    }

    #[test]
    fn top16_from_u32_is_normalized() {
        // Only exercise the domain the aggregator actually calls this with
        // (stage1 = 2*2^16 + sigma1_sq, sigma1_sq >= 131072), where j stays
        // non-negative per `spec.md` §4.1.
        for v in [131_072u32, 200_000, 1 << 24, 1 << 30, u32::MAX] {
            let (m, x) = top16_from_u32(v);
            assert!((1 << 15..1 << 16).contains(&m), "v={v} m={m}");
            assert!(x <= 0, "v={v} x={x}");
            // v truncated to the mantissa's resolution reconstructs exactly.
            let truncated = (v as u64 >> (-x)) << (-x);
            assert_eq!((m as u64) << (-x), truncated, "v={v} m={m} x={x}");
        }
    }

    #[test]
    fn top16_from_u64_bounds() {
        for v in [1u64, 2, 65535, 1 << 40, 1 << 47, 1 << 48, u64::MAX] {
            let (m, _x) = top16_from_u64(v);
            assert!((1 << 15..=1 << 16).contains(&m), "v={v} m={m}");
        }
    }
}
