//! Radius-parameterized coordinate tables for local search and painting.
//!
//! Both tables use a square window of side `2 * (radius + 1) + 1` centered on
//! `(radius + 1, radius + 1)`. The mask holds points strictly inside the
//! radius, the iterator visits points at or inside it.

mod circular_iterator;
mod circular_mask;


pub use circular_iterator::CircularIterator;
pub use circular_mask::CircularMask;

/// Integer pixel coordinate that may lie outside the image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Coord {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A window coordinate and its distance from the window center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CoordWithDistance {
    pub coord: Coord,
    pub distance: f64,
}

/// Window geometry shared by the mask and the iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub radius: u32,
    pub center: i32,
    pub size: usize,
}

impl Window {
    pub fn new(radius: u32) -> Self {
        let center = radius as i32 + 1;
        Self {
            radius,
            center,
            size: 2 * center as usize + 1,
        }
    }

    /// Every window coordinate with its distance from center, row-major.
    pub fn coords_with_distance(&self) -> impl Iterator<Item = CoordWithDistance> + '_ {
        let center = Coord::new(self.center, self.center);
        let size = self.size as i32;
        (0..size).flat_map(move |y| {
            (0..size).map(move |x| {
                let coord = Coord::new(x, y);
                CoordWithDistance {
                    coord,
                    distance: coord.distance(center),
                }
            })
        })
    }
}
