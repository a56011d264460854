use hashbrown::HashSet;

use crate::blob::{Blob, BoundingBox, PixelBlob};
use crate::hough::Line;

use super::{Feature, OutlierFeatureData};

const FIRST_LINES: usize = 10;

/// Computes the features a blob carries on its own.
///
/// Positions and extents are normalized by the frame size. Features that need
/// neighbouring blobs are left at `0.0`; see
/// [`FrameNeighborhood`](super::FrameNeighborhood) for those.
pub fn extract_features(
    blob: &PixelBlob,
    lines: &[Line],
    frame_width: usize,
    frame_height: usize,
) -> OutlierFeatureData {
    let Some(bounds) = blob.bounding_box() else {
        return OutlierFeatureData::zeroed();
    };
    let extractor = Intrinsic {
        blob,
        bounds,
        lines,
        frame_width: frame_width as f64,
        frame_height: frame_height as f64,
    };
    OutlierFeatureData::from_fn(|index| {
        Feature::from_sort_order(index)
            .and_then(|feature| extractor.value(feature))
            .unwrap_or(0.0)
    })
}

struct Intrinsic<'a> {
    blob: &'a PixelBlob,
    bounds: BoundingBox,
    lines: &'a [Line],
    frame_width: f64,
    frame_height: f64,
}

impl Intrinsic<'_> {
    fn value(&self, feature: Feature) -> Option<f64> {
        let size = self.blob.size() as f64;
        let bounds = &self.bounds;
        let value = match feature {
            Feature::Size => size / (self.frame_width * self.frame_height),
            Feature::Width => bounds.width() as f64 / self.frame_width,
            Feature::Height => bounds.height() as f64 / self.frame_height,
            Feature::CenterX => bounds.center().0 / self.frame_width,
            Feature::CenterY => bounds.center().1 / self.frame_height,
            Feature::MinX => bounds.min.0 as f64 / self.frame_width,
            Feature::MinY => bounds.min.1 as f64 / self.frame_height,
            Feature::MaxX => bounds.max.0 as f64 / self.frame_width,
            Feature::MaxY => bounds.max.1 as f64 / self.frame_height,
            Feature::Hypotenuse => bounds.hypotenuse() / (self.frame_width * self.frame_height),
            Feature::AspectRatio => bounds.width() as f64 / bounds.height() as f64,
            Feature::FillAmount => size / bounds.area() as f64,
            Feature::SurfaceAreaRatio => surface_area_ratio(self.blob),
            Feature::AverageBrightness => f64::from(self.blob.average_intensity()),
            Feature::MedianBrightness => f64::from(self.blob.median_intensity()),
            Feature::MaxBrightness => f64::from(self.blob.max_intensity()),
            Feature::AvgCountOfFirst10HoughLines => {
                average_count(&self.lines[..self.lines.len().min(FIRST_LINES)], size)
            }
            Feature::MaxThetaDiffOfFirst10HoughLines => {
                max_diff(&self.lines[..self.lines.len().min(FIRST_LINES)], |l| l.theta)
            }
            Feature::MaxRhoDiffOfFirst10HoughLines => {
                max_diff(&self.lines[..self.lines.len().min(FIRST_LINES)], |l| l.rho)
            }
            Feature::AvgCountOfAllHoughLines => average_count(self.lines, size),
            Feature::MaxThetaDiffOfAllHoughLines => max_diff(self.lines, |l| l.theta),
            Feature::MaxRhoDiffOfAllHoughLines => max_diff(self.lines, |l| l.rho),
            Feature::MaxHoughTransformCount => self
                .lines
                .first()
                .map_or(0.0, |line| f64::from(line.count) / size),
            Feature::MaxHoughTheta => self.lines.first().map_or(0.0, |line| line.theta),
            Feature::PixelBorderAmount => pixel_border_amount(self.blob),
            _ => return None,
        };
        Some(value)
    }
}

/// Mean vote count per blob pixel, `0` without lines.
fn average_count(lines: &[Line], size: f64) -> f64 {
    if lines.is_empty() {
        return 0.0;
    }
    let sum: f64 = lines.iter().map(|line| f64::from(line.count) / size).sum();
    sum / lines.len() as f64
}

/// Largest distance of any line's value from the strongest line's.
fn max_diff(lines: &[Line], value: impl Fn(&Line) -> f64) -> f64 {
    let Some(first) = lines.first() else {
        return 0.0;
    };
    let reference = value(first);
    lines
        .iter()
        .map(|line| (value(line) - reference).abs())
        .fold(0.0, f64::max)
}

fn coord_set(blob: &PixelBlob) -> HashSet<(usize, usize)> {
    blob.pixels().iter().map(|p| p.coord()).collect()
}

/// Share of pixels missing at least one of their four direct neighbours.
fn surface_area_ratio(blob: &PixelBlob) -> f64 {
    let coords = coord_set(blob);
    if coords.is_empty() {
        return 0.0;
    }
    let surface = coords
        .iter()
        .filter(|&&(x, y)| {
            let interior = x > 0
                && y > 0
                && coords.contains(&(x - 1, y))
                && coords.contains(&(x + 1, y))
                && coords.contains(&(x, y - 1))
                && coords.contains(&(x, y + 1));
            !interior
        })
        .count();
    surface as f64 / coords.len() as f64
}

/// Mean number of the eight surrounding pixels that also belong to the blob.
fn pixel_border_amount(blob: &PixelBlob) -> f64 {
    let coords = coord_set(blob);
    if coords.is_empty() {
        return 0.0;
    }
    let neighbours: usize = coords
        .iter()
        .map(|&(x, y)| {
            let mut count = 0;
            for ny in y.saturating_sub(1)..=y + 1 {
                for nx in x.saturating_sub(1)..=x + 1 {
                    if (nx, ny) != (x, y) && coords.contains(&(nx, ny)) {
                        count += 1;
                    }
                }
            }
            count
        })
        .sum();
    neighbours as f64 / coords.len() as f64
}
