//! Four-scale orchestrator (`spec.md` §4.5) and the public `init`/`extract`
//! surface (`spec.md` §6).

use crate::collector::FeatureCollector;
use crate::engine::aggregate::{self, MomentPlanes as AggregateMomentPlanes};
use crate::engine::buffer_pool::BufferPool;
use crate::engine::downsample::{self, ReduceLineBuffers, ReduceShifts};
use crate::engine::filter::{self, LineBuffers, MomentPlanes, MomentShifts};
use crate::error::{Error, Result};
use crate::fixed_point::{build_log_table, LOG_TABLE_LEN};
use crate::kernel;
use crate::plane::{Plane2D, Plane2DMut};
use crate::types::{FeatureKey, Image, ImageData, VifConfig};

lazy_static! {
    /// Built once per process; read-only thereafter (`spec.md` §3).
    static ref LOG_TABLE: Box<[u16; LOG_TABLE_LEN]> = build_log_table();
}

/// Drives the four-scale VIF pipeline over a reused buffer pool.
///
/// Construct once per frame size with [`VifExtractor::new`] (`init`), call
/// [`VifExtractor::extract`] once per frame pair, and drop (or call
/// [`VifExtractor::close`]) when done (`close`).
pub struct VifExtractor {
    config: VifConfig,
    pool: BufferPool,
}

impl VifExtractor {
    /// `init`: allocates the buffer pool for `config`'s dimensions.
    pub fn new(config: VifConfig) -> Result<Self> {
        config.validate()?;
        let pool = BufferPool::new(config.width as usize, config.height as usize)?;
        Ok(Self { config, pool })
    }

    /// Releases the buffer pool. Equivalent to dropping the extractor;
    /// provided for API parity with `spec.md` §6's named `close` entry
    /// point.
    pub fn close(self) {}

    /// `extract`: runs the four-scale pipeline over one reference/distorted
    /// frame pair and appends four named scores to `collector`.
    pub fn extract<C: FeatureCollector>(
        &mut self,
        reference: &Image<'_>,
        distorted: &Image<'_>,
        frame_index: u64,
        collector: &mut C,
    ) -> Result<()> {
        let expected = (self.config.width, self.config.height);
        if (reference.width(), reference.height()) != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: (reference.width(), reference.height()),
            });
        }
        if (distorted.width(), distorted.height()) != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: (distorted.width(), distorted.height()),
            });
        }

        let bit_depth = self.config.bit_depth;
        let mut cur_w = self.config.width as usize;
        let mut cur_h = self.config.height as usize;

        for scale in 0..4 {
            let taps = kernel::taps_for_scale(scale);

            if scale > 0 {
                let reduce_shifts = if scale == 1 {
                    ReduceShifts::for_scale0(bit_depth)
                } else {
                    ReduceShifts::for_scale_ge1()
                };

                if scale == 1 {
                    match (reference.data(), distorted.data()) {
                        (ImageData::Depth8(r), ImageData::Depth8(d)) => {
                            let r_plane = Plane2D::dense(r, cur_w, cur_h, reference.stride());
                            let d_plane = Plane2D::dense(d, cur_w, cur_h, distorted.stride());
                            self.run_downsample(r_plane, d_plane, taps, &reduce_shifts, cur_w, cur_h);
                        }
                        (ImageData::Depth16(r), ImageData::Depth16(d)) => {
                            let r_plane = Plane2D::dense(r, cur_w, cur_h, reference.stride());
                            let d_plane = Plane2D::dense(d, cur_w, cur_h, distorted.stride());
                            self.run_downsample(r_plane, d_plane, taps, &reduce_shifts, cur_w, cur_h);
                        }
                        _ => debug_assert!(
                            false,
                            "reference and distorted pictures must share a bit depth"
                        ),
                    }
                } else {
                    // mu1_small/mu2_small hold the previous scale's full-
                    // resolution blur, written with stride cur_w * 2; this
                    // scale's actual inputs are every other row/column of
                    // that buffer. The downsampler writes its output back
                    // into mu1_small/mu2_small in place, so that decimated
                    // read is materialized into separate scratch storage
                    // first rather than aliased directly.
                    let parent_stride = cur_w * 2;
                    self.run_downsample_reduced(taps, &reduce_shifts, cur_w, cur_h, parent_stride);
                }

                cur_w /= 2;
                cur_h /= 2;
            }

            let (num, den) = if scale == 0 {
                match reference.data() {
                    ImageData::Depth8(r) => {
                        let d = match distorted.data() {
                            ImageData::Depth8(d) => d,
                            ImageData::Depth16(_) => unreachable!(
                                "reference and distorted pictures must share a bit depth"
                            ),
                        };
                        let r_plane = Plane2D::dense(r, cur_w, cur_h, reference.stride());
                        let d_plane = Plane2D::dense(d, cur_w, cur_h, distorted.stride());
                        let shifts = MomentShifts::for_scale0(bit_depth);
                        self.run_moment_filter(r_plane, d_plane, taps, &shifts, cur_w, cur_h)
                    }
                    ImageData::Depth16(r) => {
                        let d = match distorted.data() {
                            ImageData::Depth16(d) => d,
                            ImageData::Depth8(_) => unreachable!(
                                "reference and distorted pictures must share a bit depth"
                            ),
                        };
                        let r_plane = Plane2D::dense(r, cur_w, cur_h, reference.stride());
                        let d_plane = Plane2D::dense(d, cur_w, cur_h, distorted.stride());
                        let shifts = MomentShifts::for_scale0(bit_depth);
                        self.run_moment_filter(r_plane, d_plane, taps, &shifts, cur_w, cur_h)
                    }
                }
            } else {
                // scale s >= 1's inputs alias the decimated even rows/columns
                // of this scale's mu1_small/mu2_small blur output, which
                // `run_downsample` wrote at the *pre-halved* resolution.
                let parent_stride = cur_w * 2;
                let r_plane = Plane2D::decimated(&self.pool.mu1_small, cur_w, cur_h, parent_stride);
                let d_plane = Plane2D::decimated(&self.pool.mu2_small, cur_w, cur_h, parent_stride);
                let shifts = MomentShifts::for_scale_ge1();
                self.run_moment_filter(r_plane, d_plane, taps, &shifts, cur_w, cur_h)
            };

            log::debug!("vif scale {scale}: num={num} den={den}");
            if den == 0.0 {
                log::warn!("vif scale {scale}: denominator is exactly zero, emitting a degenerate ratio");
            }
            let ratio = num / den;

            collector
                .append(frame_index, FeatureKey::for_scale(scale), ratio)
                .map_err(Error::CollectorAppend)?;
        }

        Ok(())
    }

    /// The scale >= 2 downsample step: `mu1_small`/`mu2_small` hold the
    /// previous scale's full-resolution blur at `parent_stride`, and this
    /// scale's inputs are the decimated even rows/columns of that buffer.
    /// Since the downsampler below overwrites `mu1_small`/`mu2_small` with
    /// its own (differently shaped) output, that decimated read is copied
    /// into `reduced_ref`/`reduced_dis` first, and the downsampler reads
    /// from there instead of aliasing its own output buffer.
    fn run_downsample_reduced(
        &mut self,
        taps: &[u16],
        shifts: &ReduceShifts,
        width: usize,
        height: usize,
        parent_stride: usize,
    ) {
        let BufferPool {
            mu1_small,
            mu2_small,
            reduced_ref,
            reduced_dis,
            line_ref_convol,
            line_dis_convol,
            ..
        } = &mut self.pool;

        {
            let src_ref = Plane2D::decimated(&mu1_small[..], width, height, parent_stride);
            let src_dis = Plane2D::decimated(&mu2_small[..], width, height, parent_stride);
            for i in 0..height {
                for j in 0..width {
                    reduced_ref[i * width + j] = src_ref.get(i, j);
                    reduced_dis[i * width + j] = src_dis.get(i, j);
                }
            }
        }

        let reference = Plane2D::dense(&reduced_ref[..width * height], width, height, width);
        let distorted = Plane2D::dense(&reduced_dis[..width * height], width, height, width);
        let mut lines = ReduceLineBuffers {
            ref_convol: &mut line_ref_convol[..width],
            dis_convol: &mut line_dis_convol[..width],
        };
        let mut out_ref = Plane2DMut::new(&mut mu1_small[..width * height], width, height);
        let mut out_dis = Plane2DMut::new(&mut mu2_small[..width * height], width, height);

        downsample::apply(
            reference, distorted, taps, shifts, &mut lines, &mut out_ref, &mut out_dis,
        );
    }

    fn run_downsample<T: crate::sample::Sample>(
        &mut self,
        reference: Plane2D<'_, T>,
        distorted: Plane2D<'_, T>,
        taps: &[u16],
        shifts: &ReduceShifts,
        width: usize,
        height: usize,
    ) {
        let BufferPool {
            mu1_small,
            mu2_small,
            line_ref_convol,
            line_dis_convol,
            ..
        } = &mut self.pool;

        let mut lines = ReduceLineBuffers {
            ref_convol: &mut line_ref_convol[..width],
            dis_convol: &mut line_dis_convol[..width],
        };
        let mut out_ref = Plane2DMut::new(&mut mu1_small[..width * height], width, height);
        let mut out_dis = Plane2DMut::new(&mut mu2_small[..width * height], width, height);

        downsample::apply(
            reference, distorted, taps, shifts, &mut lines, &mut out_ref, &mut out_dis,
        );
    }

    fn run_moment_filter<T: crate::sample::Sample>(
        &mut self,
        reference: Plane2D<'_, T>,
        distorted: Plane2D<'_, T>,
        taps: &[u16],
        shifts: &MomentShifts,
        width: usize,
        height: usize,
    ) -> (f64, f64) {
        let BufferPool {
            mu1,
            mu2,
            ref_sq,
            dis_sq,
            ref_dis,
            line_mu1,
            line_mu2,
            line_ref,
            line_dis,
            line_ref_dis,
            ..
        } = &mut self.pool;

        let len = width * height;
        let mut lines = LineBuffers {
            mu1: &mut line_mu1[..width],
            mu2: &mut line_mu2[..width],
            ref_: &mut line_ref[..width],
            dis: &mut line_dis[..width],
            ref_dis: &mut line_ref_dis[..width],
        };
        let mut out = MomentPlanes {
            mu1: Plane2DMut::new(&mut mu1[..len], width, height),
            mu2: Plane2DMut::new(&mut mu2[..len], width, height),
            ref_sq: Plane2DMut::new(&mut ref_sq[..len], width, height),
            dis_sq: Plane2DMut::new(&mut dis_sq[..len], width, height),
            ref_dis: Plane2DMut::new(&mut ref_dis[..len], width, height),
        };

        filter::apply(reference, distorted, taps, shifts, &mut lines, &mut out);

        let planes = AggregateMomentPlanes {
            mu1: out.mu1.as_plane(),
            mu2: out.mu2.as_plane(),
            ref_sq: out.ref_sq.as_plane(),
            dis_sq: out.dis_sq.as_plane(),
            ref_dis: out.ref_dis.as_plane(),
        };
        aggregate::aggregate(&planes, &LOG_TABLE)
    }
}
