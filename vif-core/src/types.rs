//! Picture and configuration types at the core's external boundary.

use crate::error::{Error, Result};

/// Parameters fixed for the lifetime of a [`crate::VifExtractor`].
///
/// Named-struct form of `init`'s four parameters (`spec.md` §6), following
/// the teacher's preference for grouped option structs over bare positional
/// arguments (`DecoderOption` in `h263-rs/src/decoder/types.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VifConfig {
    /// Picture format of the input; the core only ever reads the first
    /// (luma) plane, but carries this through for parity with callers that
    /// negotiate picture format externally (`spec.md` §1 Out of scope).
    pub pixel_format: PixelFormat,
    /// Per-sample bit depth, one of 8, 10, or 12.
    pub bit_depth: u8,
    /// Picture width in samples.
    pub width: u32,
    /// Picture height in samples.
    pub height: u32,
}

impl VifConfig {
    /// Validates the bit depth and dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::DimensionMismatch {
                expected: (self.width, self.height),
                actual: (self.width, self.height),
            });
        }
        if ![8, 10, 12].contains(&self.bit_depth) {
            return Err(Error::InvalidBitDepth {
                got: self.bit_depth,
            });
        }
        Ok(())
    }
}

/// Picture format negotiated by an external collaborator (`spec.md` §1);
/// the core itself is indifferent to chroma layout since it only reads
/// plane 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Luma-only.
    Yuv400,
    /// 4:2:0 chroma subsampling.
    Yuv420,
    /// 4:2:2 chroma subsampling.
    Yuv422,
    /// 4:4:4, no chroma subsampling.
    Yuv444,
}

/// Borrowed sample storage for one plane, 8- or 16-bit.
#[derive(Debug, Clone, Copy)]
pub enum ImageData<'a> {
    /// 8-bit samples.
    Depth8(&'a [u8]),
    /// >8-bit samples, stored widened to 16 bits.
    Depth16(&'a [u16]),
}

/// A single luma plane handed to `extract` (`spec.md` §3).
///
/// Only the first plane of a picture is modeled; chroma is out of scope
/// (`spec.md` §1 Non-goals).
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    data: ImageData<'a>,
    width: u32,
    height: u32,
    /// Samples per row; may exceed `width` to allow for padding.
    stride: usize,
}

impl<'a> Image<'a> {
    /// Wraps an 8-bit plane. `stride` is in samples, not bytes.
    pub fn from_u8(data: &'a [u8], width: u32, height: u32, stride: usize) -> Self {
        assert!(stride >= width as usize, "stride must cover a full row");
        assert!(
            data.len() >= stride * height as usize,
            "plane too small for width/height/stride"
        );
        Self {
            data: ImageData::Depth8(data),
            width,
            height,
            stride,
        }
    }

    /// Wraps a >8-bit plane stored as 16-bit samples. `stride` is in
    /// samples, not bytes.
    pub fn from_u16(data: &'a [u16], width: u32, height: u32, stride: usize) -> Self {
        assert!(stride >= width as usize, "stride must cover a full row");
        assert!(
            data.len() >= stride * height as usize,
            "plane too small for width/height/stride"
        );
        Self {
            data: ImageData::Depth16(data),
            width,
            height,
            stride,
        }
    }

    /// Picture width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Picture height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Borrows the underlying sample storage.
    pub fn data(&self) -> ImageData<'a> {
        self.data
    }
}

/// The four per-scale feature names observed by the collector
/// (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKey {
    /// `VMAF_feature_vif_scale0_integer_score`
    Scale0,
    /// `VMAF_feature_vif_scale1_integer_score`
    Scale1,
    /// `VMAF_feature_vif_scale2_integer_score`
    Scale2,
    /// `VMAF_feature_vif_scale3_integer_score`
    Scale3,
}

impl FeatureKey {
    /// Maps a scale index (`0..=3`) to its feature key.
    pub fn for_scale(scale: usize) -> Self {
        match scale {
            0 => FeatureKey::Scale0,
            1 => FeatureKey::Scale1,
            2 => FeatureKey::Scale2,
            3 => FeatureKey::Scale3,
            _ => panic!("vif only defines four scales (0..=3), got {scale}"),
        }
    }
}

impl std::fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeatureKey::Scale0 => "VMAF_feature_vif_scale0_integer_score",
            FeatureKey::Scale1 => "VMAF_feature_vif_scale1_integer_score",
            FeatureKey::Scale2 => "VMAF_feature_vif_scale2_integer_score",
            FeatureKey::Scale3 => "VMAF_feature_vif_scale3_integer_score",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_key_names_match_the_collector_contract() {
        assert_eq!(
            FeatureKey::Scale0.to_string(),
            "VMAF_feature_vif_scale0_integer_score"
        );
        assert_eq!(
            FeatureKey::Scale3.to_string(),
            "VMAF_feature_vif_scale3_integer_score"
        );
    }

    #[test]
    fn config_rejects_zero_dimensions() {
        let cfg = VifConfig {
            pixel_format: PixelFormat::Yuv420,
            bit_depth: 8,
            width: 0,
            height: 64,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_rejects_unsupported_bit_depth() {
        let cfg = VifConfig {
            pixel_format: PixelFormat::Yuv420,
            bit_depth: 9,
            width: 64,
            height: 64,
        };
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidBitDepth { got: 9 })
        ));
    }
}
