//! Reduction filter + 2:1 decimation (`spec.md` §4.2): blurs the current
//! scale's reference/distorted planes, then (by construction of the
//! resulting [`crate::plane::Plane2D::decimated`] view, not a copy) the next
//! scale reads only the even rows/columns of that blur.

use crate::boundary::mirror;
use crate::plane::{Plane2D, Plane2DMut};
use crate::sample::Sample;

/// Q-format shift/rounding constants for the reducer's vertical pass. The
/// horizontal pass is always shift 16 / round 32768 (`spec.md` §4.2).
#[derive(Debug, Clone, Copy)]
pub struct ReduceShifts {
    pub shift_vp: u32,
    pub round_vp: u32,
}

impl ReduceShifts {
    /// Scale-0 constants: depend on the actual input bit depth, whether the
    /// samples are stored as 8- or 16-bit.
    pub fn for_scale0(bit_depth: u8) -> Self {
        Self {
            shift_vp: bit_depth as u32,
            round_vp: 1 << (bit_depth - 1),
        }
    }

    /// Constants for every later scale, whose inputs are already 16-bit
    /// blur output from the previous scale.
    pub fn for_scale_ge1() -> Self {
        Self {
            shift_vp: 16,
            round_vp: 1 << 15,
        }
    }
}

/// The two per-row scratch buffers the reducer convolves through, named
/// `ref_convol`/`dis_convol` in `spec.md` §3.
pub struct ReduceLineBuffers<'a> {
    pub ref_convol: &'a mut [u32],
    pub dis_convol: &'a mut [u32],
}

/// Blurs `reference`/`distorted` with `taps`, writing full-resolution
/// (pre-decimation) results into `out_ref`/`out_dis`.
///
/// Callers obtain the next scale's actual inputs by reading
/// `Plane2D::decimated` over `out_ref`/`out_dis` rather than copying;
/// see `spec.md` §3 invariants.
pub fn apply<T: Sample>(
    reference: Plane2D<'_, T>,
    distorted: Plane2D<'_, T>,
    taps: &[u16],
    shifts: &ReduceShifts,
    lines: &mut ReduceLineBuffers<'_>,
    out_ref: &mut Plane2DMut<'_, u16>,
    out_dis: &mut Plane2DMut<'_, u16>,
) {
    let width = reference.width();
    let height = reference.height();
    debug_assert_eq!(width, distorted.width());
    debug_assert_eq!(height, distorted.height());

    let fwidth = taps.len();
    let half = (fwidth / 2) as isize;

    for i in 0..height {
        for j in 0..width {
            let mut acc_ref: u32 = 0;
            let mut acc_dis: u32 = 0;

            for (fi, &tap) in taps.iter().enumerate() {
                let ii = mirror(i as isize - half + fi as isize, height);
                let coeff = tap as u32;
                acc_ref += coeff * reference.get(ii, j).as_u32();
                acc_dis += coeff * distorted.get(ii, j).as_u32();
            }

            lines.ref_convol[j] = (acc_ref + shifts.round_vp) >> shifts.shift_vp;
            lines.dis_convol[j] = (acc_dis + shifts.round_vp) >> shifts.shift_vp;
        }

        for j in 0..width {
            let mut acc_ref: u32 = 0;
            let mut acc_dis: u32 = 0;

            for (fj, &tap) in taps.iter().enumerate() {
                let jj = mirror(j as isize - half + fj as isize, width);
                let coeff = tap as u32;
                acc_ref += coeff * lines.ref_convol[jj];
                acc_dis += coeff * lines.dis_convol[jj];
            }

            out_ref.set(i, j, ((acc_ref + 32768) >> 16) as u16);
            out_dis.set(i, j, ((acc_dis + 32768) >> 16) as u16);
        }

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "vif downsample row {i}: ref={} dis={}",
                out_ref.get(i, 0),
                out_dis.get(i, 0),
            );
        }
    }
}
