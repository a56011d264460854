//! Feature kinds and the fixed-length vectors that describe a blob.

mod context;
mod data;
mod extract;


use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

pub use context::{FrameNeighborhood, OutlierCandidate};
pub use data::{ClassifiableOutlierGroup, OutlierFeatureData, OutlierGroupFeatureData};
pub use extract::extract_features;

/// A measurable blob property.
///
/// The discriminant is the feature's slot in every [`OutlierFeatureData`].
/// The string form is the column name used in training files.
#[repr(u8)]
#[derive(
    Debug,
    Display,
    EnumIter,
    EnumString,
    EnumCount,
    IntoStaticStr,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Size = 0,
    Width = 1,
    Height = 2,
    CenterX = 3,
    CenterY = 4,
    MinX = 5,
    MinY = 6,
    MaxX = 7,
    MaxY = 8,
    Hypotenuse = 9,
    AspectRatio = 10,
    FillAmount = 11,
    SurfaceAreaRatio = 12,
    AverageBrightness = 13,
    MedianBrightness = 14,
    MaxBrightness = 15,
    #[strum(to_string = "avgCountOfFirst10HoughLines")]
    AvgCountOfFirst10HoughLines = 16,
    #[strum(to_string = "maxThetaDiffOfFirst10HoughLines")]
    MaxThetaDiffOfFirst10HoughLines = 17,
    #[strum(to_string = "maxRhoDiffOfFirst10HoughLines")]
    MaxRhoDiffOfFirst10HoughLines = 18,
    AvgCountOfAllHoughLines = 19,
    MaxThetaDiffOfAllHoughLines = 20,
    MaxRhoDiffOfAllHoughLines = 21,
    NumberOfNearbyOutliersInSameFrame = 22,
    AdjacentFrameNeighboringOutliersBestTheta = 23,
    HistogramStreakDetection = 24,
    LongerHistogramStreakDetection = 25,
    MaxHoughTransformCount = 26,
    MaxHoughTheta = 27,
    NeighboringInterFrameOutlierThetaScore = 28,
    MaxOverlap = 29,
    MaxOverlapTimesThetaHisto = 30,
    PixelBorderAmount = 31,
}

impl Feature {
    /// Slot of this feature in a feature vector.
    #[inline]
    pub const fn sort_order(self) -> usize {
        self as usize
    }

    pub fn from_sort_order(index: usize) -> Option<Feature> {
        Feature::iter().find(|feature| feature.sort_order() == index)
    }

    /// Whether computing this feature needs neighbouring blobs, in this frame
    /// or adjacent ones.
    pub const fn needs_async(self) -> bool {
        matches!(
            self,
            Feature::NumberOfNearbyOutliersInSameFrame
                | Feature::AdjacentFrameNeighboringOutliersBestTheta
                | Feature::HistogramStreakDetection
                | Feature::LongerHistogramStreakDetection
                | Feature::NeighboringInterFrameOutlierThetaScore
                | Feature::MaxOverlap
                | Feature::MaxOverlapTimesThetaHisto
        )
    }

    /// Every feature, in slot order.
    pub fn canonical() -> Vec<Feature> {
        let mut features: Vec<Feature> = Feature::iter().collect();
        features.sort_by_key(|feature| feature.sort_order());
        features
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Number of feature slots in a vector.
pub const FEATURE_COUNT: usize = Feature::COUNT;
