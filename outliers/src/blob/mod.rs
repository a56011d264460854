//! Blobs of outlying pixels and the rectifier that merges overlapping ones.

mod rectifier;

#[cfg(test)]
mod tests;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

pub use rectifier::BlobRectifier;

/// Unique id of a blob within a frame.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlobId(pub u32);

impl std::fmt::Display for BlobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "blob {}", self.0)
    }
}

/// A pixel belonging to a blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub x: usize,
    pub y: usize,
    #[serde(default)]
    pub intensity: u16,
}

impl Pixel {
    pub const fn new(x: usize, y: usize, intensity: u16) -> Self {
        Self { x, y, intensity }
    }

    #[inline]
    pub const fn coord(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Row-major index into a frame `width` pixels wide.
    #[inline]
    pub const fn index(&self, width: usize) -> usize {
        self.y * width + self.x
    }
}

/// What the rectifier needs from a detector's blob.
pub trait Blob {
    fn id(&self) -> BlobId;

    fn pixels(&self) -> &[Pixel];

    /// Tries to merge `other` into `self`, keeping `self`'s id.
    ///
    /// Returning `false` is a normal outcome: the blob declined the merge and
    /// nothing changed.
    fn absorb(&mut self, other: &Self) -> bool;
}

/// Inclusive pixel bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min: (usize, usize),
    pub max: (usize, usize),
}

impl BoundingBox {
    pub fn width(&self) -> usize {
        self.max.0 - self.min.0 + 1
    }

    pub fn height(&self) -> usize {
        self.max.1 - self.min.1 + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min.0 + self.max.0) as f64 / 2.0,
            (self.min.1 + self.max.1) as f64 / 2.0,
        )
    }

    pub fn hypotenuse(&self) -> f64 {
        (self.width() as f64).hypot(self.height() as f64)
    }

    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let (x1, y1) = self.center();
        let (x2, y2) = other.center();
        (x1 - x2).hypot(y1 - y2)
    }

    /// Angle in degrees, `[0, 180)`, of the line joining both centers.
    ///
    /// Level centers give `0`, vertically aligned centers give `90`.
    pub fn center_theta(&self, other: &BoundingBox) -> f64 {
        let (x1, y1) = self.center();
        let (x2, y2) = other.center();
        if y1 == y2 {
            return 0.0;
        }
        if x1 == x2 {
            return 90.0;
        }

        let width = (x1 - x2).abs();
        let height = (y1 - y2).abs();
        let theta = if (x1 < x2) == (y1 < y2) {
            std::f64::consts::FRAC_PI_2 + (height / width).atan()
        } else {
            (width / height).atan()
        };
        theta.to_degrees()
    }
}

/// A detector blob: a set of pixels with an optional merged size limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelBlob {
    id: BlobId,
    pixels: Vec<Pixel>,
    #[serde(default)]
    max_size: Option<usize>,
}

impl PixelBlob {
    pub fn new(id: BlobId, pixels: Vec<Pixel>) -> Self {
        Self {
            id,
            pixels,
            max_size: None,
        }
    }

    /// Refuse merges that would grow the blob past `max_size` pixels.
    pub fn with_max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn add(&mut self, pixel: Pixel) {
        self.pixels.push(pixel);
    }

    /// Mean intensity, `0` for an empty blob.
    pub fn average_intensity(&self) -> u16 {
        if self.pixels.is_empty() {
            return 0;
        }
        let sum: u64 = self.pixels.iter().map(|p| u64::from(p.intensity)).sum();
        (sum / self.pixels.len() as u64) as u16
    }

    pub fn max_intensity(&self) -> u16 {
        self.pixels.iter().map(|p| p.intensity).max().unwrap_or(0)
    }

    /// Median of the non-zero intensities, `0` if there are none.
    pub fn median_intensity(&self) -> u16 {
        let mut values: Vec<u16> = self
            .pixels
            .iter()
            .map(|p| p.intensity)
            .filter(|v| *v > 0)
            .collect();
        if values.is_empty() {
            return 0;
        }
        values.sort_unstable();
        values[values.len() / 2]
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.pixels.first()?;
        let mut bounds = BoundingBox {
            min: first.coord(),
            max: first.coord(),
        };
        for pixel in &self.pixels[1..] {
            bounds.min.0 = bounds.min.0.min(pixel.x);
            bounds.min.1 = bounds.min.1.min(pixel.y);
            bounds.max.0 = bounds.max.0.max(pixel.x);
            bounds.max.1 = bounds.max.1.max(pixel.y);
        }
        Some(bounds)
    }

    /// Intensities laid out row-major over the bounding box, `0` where the
    /// blob has no pixel.
    pub fn pixel_values(&self) -> Vec<u16> {
        let Some(bounds) = self.bounding_box() else {
            return Vec::new();
        };
        let width = bounds.width();
        let mut values = vec![0; bounds.area()];
        for pixel in &self.pixels {
            values[(pixel.y - bounds.min.1) * width + (pixel.x - bounds.min.0)] = pixel.intensity;
        }
        values
    }
}

impl Blob for PixelBlob {
    fn id(&self) -> BlobId {
        self.id
    }

    fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    fn absorb(&mut self, other: &Self) -> bool {
        if self.id == other.id {
            return false;
        }
        let known: HashSet<(usize, usize)> = self.pixels.iter().map(Pixel::coord).collect();
        let new_pixels: Vec<Pixel> = other
            .pixels
            .iter()
            .filter(|p| !known.contains(&p.coord()))
            .copied()
            .collect();
        if let Some(max_size) = self.max_size {
            if self.pixels.len() + new_pixels.len() > max_size {
                return false;
            }
        }
        self.pixels.extend(new_pixels);
        true
    }
}
