//! Generalizes the filter and downsampler over 8-bit and 16-bit input
//! planes, replacing what the reference implementation does as two
//! hand-duplicated code paths (see design note 2 in `spec.md` §9).

use num_traits::Unsigned;

/// A pixel sample width the five-moment filter and downsampler can operate
/// on directly: `u8` at scale 0 for 8-bit pictures, `u16` everywhere else.
pub trait Sample: Copy + Unsigned + Ord + 'static {
    /// Widen to the accumulator width used by the vertical/horizontal passes.
    fn as_u32(self) -> u32;
    /// Widen to the accumulator width used by the second-moment sums.
    fn as_u64(self) -> u64;
}

impl Sample for u8 {
    #[inline]
    fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn as_u64(self) -> u64 {
        self as u64
    }
}

impl Sample for u16 {
    #[inline]
    fn as_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn as_u64(self) -> u64 {
        self as u64
    }
}
