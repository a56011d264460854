use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::{FEATURE_COUNT, Feature};

/// Anything a classifier can score.
pub trait ClassifiableOutlierGroup {
    fn decision_tree_value(&self, feature: Feature) -> f64;

    /// The full vector, one slot per feature.
    fn feature_data(&self) -> OutlierFeatureData {
        OutlierFeatureData::from_fn(|index| {
            Feature::from_sort_order(index).map_or(0.0, |feature| self.decision_tree_value(feature))
        })
    }
}

/// A fixed-length feature vector indexed by [`Feature::sort_order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlierFeatureData {
    values: Vec<f64>,
}

impl OutlierFeatureData {
    /// Takes `values` already in slot order.
    pub fn from_values(values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), FEATURE_COUNT);
        Self { values }
    }

    /// Calls `generate` once for each slot index.
    pub fn from_fn(generate: impl FnMut(usize) -> f64) -> Self {
        Self {
            values: (0..FEATURE_COUNT).map(generate).collect(),
        }
    }

    pub fn zeroed() -> Self {
        Self {
            values: vec![0.0; FEATURE_COUNT],
        }
    }

    /// The value for `feature`, `0.0` if the vector is short.
    pub fn value(&self, feature: Feature) -> f64 {
        self.values
            .get(feature.sort_order())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl Default for OutlierFeatureData {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl ClassifiableOutlierGroup for OutlierFeatureData {
    fn decision_tree_value(&self, feature: Feature) -> f64 {
        self.value(feature)
    }

    fn feature_data(&self) -> OutlierFeatureData {
        self.clone()
    }
}

/// Raw feature values supplied in any order.
///
/// Features that were not supplied read back as `0.0`.
#[derive(Debug, Clone, Default)]
pub struct OutlierGroupFeatureData {
    values: HashMap<Feature, f64>,
}

impl OutlierGroupFeatureData {
    /// # Panics
    ///
    /// Panics if `features` and `values` differ in length.
    pub fn new(features: &[Feature], values: &[f64]) -> Self {
        assert_eq!(
            features.len(),
            values.len(),
            "features and values must be parallel"
        );
        Self {
            values: features.iter().copied().zip(values.iter().copied()).collect(),
        }
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.values.contains_key(&feature)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ClassifiableOutlierGroup for OutlierGroupFeatureData {
    fn decision_tree_value(&self, feature: Feature) -> f64 {
        self.values.get(&feature).copied().unwrap_or(0.0)
    }
}
