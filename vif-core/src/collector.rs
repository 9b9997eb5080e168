//! The external feature-collector sink (`spec.md` §1, §6): out of scope to
//! implement, but the core must know its shape to call into it.

use crate::types::FeatureKey;

/// An external sink that records named scalar observations keyed by frame
/// index. Implemented by whatever feature-registration system a caller has
/// wired up; the core only calls [`FeatureCollector::append`].
pub trait FeatureCollector {
    /// Records one scalar observation for `frame_index`.
    ///
    /// Returning `Err` surfaces as [`crate::Error::CollectorAppend`] from
    /// `extract`; the frame's earlier, already-appended scales are not
    /// rolled back (`spec.md` §7.2).
    fn append(
        &mut self,
        frame_index: u64,
        key: FeatureKey,
        value: f64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A simple in-memory collector, useful for tests and callers that don't
/// yet have a real feature-registration pipeline wired up.
#[derive(Debug, Default, Clone)]
pub struct VecFeatureCollector {
    observations: Vec<(u64, FeatureKey, f64)>,
}

impl VecFeatureCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// All observations recorded so far, in append order.
    pub fn observations(&self) -> &[(u64, FeatureKey, f64)] {
        &self.observations
    }

    /// Returns the value recorded for `(frame_index, key)`, if any, using
    /// the most recent observation if it was appended more than once.
    pub fn get(&self, frame_index: u64, key: FeatureKey) -> Option<f64> {
        self.observations
            .iter()
            .rev()
            .find(|(idx, k, _)| *idx == frame_index && *k == key)
            .map(|(_, _, v)| *v)
    }
}

impl FeatureCollector for VecFeatureCollector {
    fn append(
        &mut self,
        frame_index: u64,
        key: FeatureKey,
        value: f64,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.observations.push((frame_index, key, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_retrieves_by_scale() {
        let mut collector = VecFeatureCollector::new();
        collector.append(0, FeatureKey::Scale0, 1.0).unwrap();
        collector.append(0, FeatureKey::Scale1, 0.9).unwrap();
        assert_eq!(collector.get(0, FeatureKey::Scale0), Some(1.0));
        assert_eq!(collector.get(0, FeatureKey::Scale1), Some(0.9));
        assert_eq!(collector.get(1, FeatureKey::Scale0), None);
    }
}
