//! Outlier blob detection core: merges overlapping detector blobs, measures
//! them as fixed-length feature vectors, scores them with decision trees, and
//! exports training matrices.

pub mod blob;
pub mod classifier;
pub mod config;
pub mod feature;
pub mod geometry;
pub mod hough;
pub mod pipeline;
pub mod sync;
pub mod training;

pub use blob::{Blob, BlobId, BlobRectifier, BoundingBox, Pixel, PixelBlob};
pub use classifier::{
    ClassifierType, DecisionTree, DecisionTreeStruct, ForestClassifier,
    NamedOutlierGroupClassifier, OutlierGroupClassifier, SourceDecisionTree, render_source,
};
pub use config::{Config, ConfigError};
pub use feature::{
    ClassifiableOutlierGroup, Feature, OutlierFeatureData, OutlierGroupFeatureData,
    extract_features,
};
pub use geometry::{CircularIterator, CircularMask, Coord};
pub use hough::{HoughLineHistogram, Line};
pub use pipeline::{FramePipeline, PipelineError, PipelineReport};
pub use sync::{BlobIdSet, PixelStatus, PixelStatusTracker};
pub use training::{CondensedOutlierGroupValueMatrix, MatrixError, OutlierGroupValueMatrix};
