use hashbrown::HashSet;

use crate::blob::{Blob, BoundingBox, PixelBlob};
use crate::hough::{HoughLineHistogram, Line};

use super::{Feature, OutlierFeatureData, extract_features};

/// A rectified blob with its Hough lines, ready for feature extraction.
#[derive(Debug, Clone)]
pub struct OutlierCandidate {
    blob: PixelBlob,
    lines: Vec<Line>,
    bounds: Option<BoundingBox>,
    histogram: HoughLineHistogram,
}

impl OutlierCandidate {
    pub fn new(blob: PixelBlob, lines: Vec<Line>, histogram_increment: u32) -> Self {
        let group_size = u32::try_from(blob.size()).unwrap_or(u32::MAX).max(1);
        let histogram = HoughLineHistogram::new(histogram_increment, &lines, group_size);
        Self {
            bounds: blob.bounding_box(),
            blob,
            lines,
            histogram,
        }
    }

    pub fn blob(&self) -> &PixelBlob {
        &self.blob
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounds
    }

    pub fn histogram(&self) -> &HoughLineHistogram {
        &self.histogram
    }

    /// Shared pixels over the mean size of both blobs; `1` is total overlap.
    pub fn pixel_overlap(&self, other: &OutlierCandidate) -> f64 {
        let (Some(a), Some(b)) = (self.bounds, other.bounds) else {
            return 0.0;
        };
        if a.min.0 > b.max.0 || a.min.1 > b.max.1 || b.min.0 > a.max.0 || b.min.1 > a.max.1 {
            return 0.0;
        }

        let coords: HashSet<(usize, usize)> =
            self.blob.pixels().iter().map(|p| p.coord()).collect();
        let shared = other
            .blob
            .pixels()
            .iter()
            .filter(|p| coords.contains(&p.coord()))
            .count();
        if shared == 0 {
            return 0.0;
        }
        let mean_size = (self.blob.size() + other.blob.size()) as f64 / 2.0;
        shared as f64 / mean_size
    }

    /// Histogram agreement weighted by how well `other`'s dominant angle runs
    /// along the line joining both blobs.
    pub fn streak_score(&self, other: &OutlierCandidate) -> f64 {
        let (Some(a), Some(b)) = (self.bounds, other.bounds) else {
            return 0.0;
        };
        let histogram_score = other.histogram.match_score(&self.histogram);
        histogram_score * theta_score(a.center_theta(&b), other.histogram.max_theta())
    }
}

/// `1` when the angles agree, `0` when they are 180 degrees apart.
fn theta_score(theta1: f64, theta2: f64) -> f64 {
    let mut opposite = theta1 + 180.0;
    if opposite >= 360.0 {
        opposite -= 360.0;
    }
    let mut difference = opposite - theta2;
    if difference < 0.0 {
        difference += 360.0;
    }
    if difference > 360.0 {
        difference -= 360.0;
    }
    difference / 180.0
}

/// The blobs around a candidate: its own frame and the frames either side.
#[derive(Debug, Clone, Copy)]
pub struct FrameNeighborhood<'a> {
    pub frame: &'a [OutlierCandidate],
    pub previous: Option<&'a [OutlierCandidate]>,
    pub next: Option<&'a [OutlierCandidate]>,
    pub frame_width: usize,
    pub frame_height: usize,
}

impl FrameNeighborhood<'_> {
    /// Center distance under which two blobs count as neighbours.
    pub fn max_nearby_distance(&self) -> f64 {
        self.frame_width as f64 / 8.0
    }

    /// Every feature of `candidate`, intrinsic and neighbourhood ones.
    pub fn features(&self, candidate: &OutlierCandidate) -> OutlierFeatureData {
        let intrinsic = extract_features(
            &candidate.blob,
            &candidate.lines,
            self.frame_width,
            self.frame_height,
        );
        OutlierFeatureData::from_fn(|index| {
            let Some(feature) = Feature::from_sort_order(index) else {
                return 0.0;
            };
            self.value(candidate, feature)
                .unwrap_or_else(|| intrinsic.value(feature))
        })
    }

    /// A neighbourhood feature of `candidate`, `None` for intrinsic features.
    ///
    /// Streak features that follow chains across several frames are not
    /// tracked and read as `0.0`.
    pub fn value(&self, candidate: &OutlierCandidate, feature: Feature) -> Option<f64> {
        let value = match feature {
            Feature::NumberOfNearbyOutliersInSameFrame => {
                nearby(candidate, self.frame, self.max_nearby_distance())
                    .filter(|other| other.blob.id() != candidate.blob.id())
                    .count() as f64
            }
            Feature::HistogramStreakDetection => {
                self.best_adjacent(candidate, |other| candidate.streak_score(other))
            }
            Feature::MaxOverlap => {
                self.best_adjacent(candidate, |other| candidate.pixel_overlap(other))
            }
            Feature::MaxOverlapTimesThetaHisto => self.best_adjacent(candidate, |other| {
                candidate.pixel_overlap(other) * other.histogram.match_score(&candidate.histogram)
            }),
            Feature::AdjacentFrameNeighboringOutliersBestTheta
            | Feature::LongerHistogramStreakDetection
            | Feature::NeighboringInterFrameOutlierThetaScore => 0.0,
            _ => return None,
        };
        Some(value)
    }

    fn best_adjacent(
        &self,
        candidate: &OutlierCandidate,
        score: impl Fn(&OutlierCandidate) -> f64,
    ) -> f64 {
        let distance = self.max_nearby_distance();
        let previous = self.previous.unwrap_or_default();
        let next = self.next.unwrap_or_default();
        nearby(candidate, previous, distance)
            .chain(nearby(candidate, next, distance))
            .map(score)
            .fold(0.0, f64::max)
    }
}

/// Blobs of `frame` whose center lies within `distance` of `candidate`'s.
fn nearby<'c>(
    candidate: &'c OutlierCandidate,
    frame: &'c [OutlierCandidate],
    distance: f64,
) -> impl Iterator<Item = &'c OutlierCandidate> + 'c {
    frame
        .iter()
        .filter(move |other| match (candidate.bounds, other.bounds) {
            (Some(a), Some(b)) => a.center_distance(&b) < distance,
            _ => false,
        })
}
