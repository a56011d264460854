use super::{CoordWithDistance, Window};

/// Visits the points around a center nearest first, out to `radius`
/// inclusive.
///
/// The table is built once per radius; ties in distance keep row-major order.
#[derive(Debug, Clone)]
pub struct CircularIterator {
    values: Vec<CoordWithDistance>,
    window: Window,
}

impl CircularIterator {
    pub fn new(radius: u32) -> Self {
        let window = Window::new(radius);
        let mut values: Vec<CoordWithDistance> = window.coords_with_distance().collect();
        // stable, so equal distances stay row-major
        values.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self { values, window }
    }

    pub fn radius(&self) -> u32 {
        self.window.radius
    }

    pub fn size(&self) -> usize {
        self.window.size
    }

    pub fn center(&self) -> i32 {
        self.window.center
    }

    /// Calls `visit` with world coordinates around `(x, y)` in ascending
    /// distance, stopping as soon as `visit` returns `false`.
    pub fn iterate(&self, x: i32, y: i32, mut visit: impl FnMut(i32, i32) -> bool) {
        let radius = f64::from(self.window.radius);
        let center = self.window.center;
        for item in self.values.iter().filter(|item| item.distance <= radius) {
            if !visit(item.coord.x - center + x, item.coord.y - center + y) {
                return;
            }
        }
    }

    /// The distance of each visited point, in visit order.
    pub fn distances(&self) -> impl Iterator<Item = f64> + '_ {
        let radius = f64::from(self.window.radius);
        self.values
            .iter()
            .map(|item| item.distance)
            .filter(move |distance| *distance <= radius)
    }
}
