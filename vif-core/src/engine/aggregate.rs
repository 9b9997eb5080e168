//! Per-pixel divergence accumulator (`spec.md` §4.4): blends a closed-form
//! low-variance formula with a log-ratio formula, selected by comparing the
//! local reference variance against a fixed threshold.

use crate::fixed_point::{top16_from_u32, top16_from_u64, LOG_TABLE_LEN};
use crate::plane::Plane2D;

/// Local reference variance below which a pixel takes the closed-form,
/// non-log path (`2 * 2^16`, `spec.md` §4.4 step 3).
const LOW_VARIANCE_THRESHOLD: i64 = 2 * (1 << 16);

/// The five moment planes for one scale, read-only for the aggregator.
pub struct MomentPlanes<'a> {
    pub mu1: Plane2D<'a, u32>,
    pub mu2: Plane2D<'a, u32>,
    pub ref_sq: Plane2D<'a, u32>,
    pub dis_sq: Plane2D<'a, u32>,
    pub ref_dis: Plane2D<'a, u32>,
}

/// Walks `planes` and produces the `(num, den)` pair for this scale
/// (`spec.md` §4.4). All accumulation is integer and order-independent;
/// only the final combine is floating point.
pub fn aggregate(planes: &MomentPlanes<'_>, log_table: &[u16; LOG_TABLE_LEN]) -> (f64, f64) {
    let width = planes.mu1.width();
    let height = planes.mu1.height();

    let mut accum_num_log: i64 = 0;
    let mut accum_den_log: i64 = 0;
    let mut accum_num_non_log: i64 = 0;
    let mut accum_den_non_log: i64 = 0;
    let mut accum_x: i64 = 0;
    let mut accum_x2: i64 = 0;
    let mut num_accum_x: i64 = 0;

    for i in 0..height {
        for j in 0..width {
            let mu1 = planes.mu1.get(i, j) as u64;
            let mu2 = planes.mu2.get(i, j) as u64;

            let mu1_sq = ((mu1 * mu1 + (1 << 31)) >> 32) as i64;
            let mu2_sq = ((mu2 * mu2 + (1 << 31)) >> 32) as i64;
            let mu1_mu2 = ((mu1 * mu2 + (1 << 31)) >> 32) as i64;

            let sigma1_sq = planes.ref_sq.get(i, j) as i64 - mu1_sq;
            let sigma2_sq = planes.dis_sq.get(i, j) as i64 - mu2_sq;

            if sigma1_sq < LOW_VARIANCE_THRESHOLD {
                accum_num_non_log += sigma2_sq;
                accum_den_non_log += 1;
                continue;
            }

            let sigma12 = planes.ref_dis.get(i, j) as i64 - mu1_mu2;
            let stage1 = (LOW_VARIANCE_THRESHOLD + sigma1_sq) as u32;
            let (m_den, x) = top16_from_u32(stage1);
            num_accum_x += 1;
            accum_x += x as i64;
            let den_val = log_table[m_den as usize] as i64;

            if sigma12 < 0 {
                accum_den_log += den_val;
                continue;
            }

            let numer1 = sigma2_sq + LOW_VARIANCE_THRESHOLD;
            let prod = numer1 * sigma1_sq;
            let s12sq = sigma12 * sigma12;
            let denom = prod - s12sq;

            if denom > 0 {
                let (m_num, x1) = top16_from_u64(prod as u64);
                let (m_denom, x2) = top16_from_u64(denom as u64);
                accum_x2 += (x2 - x1) as i64;
                accum_num_log += log_table[m_num as usize] as i64 - log_table[m_denom as usize] as i64;
                accum_den_log += den_val;
            } else {
                accum_num_non_log += sigma2_sq;
                accum_den_non_log += 1;
            }
        }
    }

    let num = accum_num_log as f64 / 2048.0
        + accum_x2 as f64
        + (accum_den_non_log as f64 - (accum_num_non_log as f64 / 16384.0) / 65025.0);
    let den = accum_den_log as f64 / 2048.0 - (accum_x as f64 + num_accum_x as f64 * 17.0)
        + accum_den_non_log as f64;

    (num, den)
}
