use super::Window;

/// Square boolean paint mask of the points strictly closer than `radius` to
/// the window center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularMask {
    // row-major, size * size
    values: Vec<bool>,
    window: Window,
}

impl CircularMask {
    pub fn new(radius: u32) -> Self {
        let window = Window::new(radius);
        let radius = f64::from(radius);
        let values = window
            .coords_with_distance()
            .map(|item| item.distance < radius)
            .collect();
        Self { values, window }
    }

    pub fn radius(&self) -> u32 {
        self.window.radius
    }

    /// Side length of the square window.
    pub fn size(&self) -> usize {
        self.window.size
    }

    pub fn center(&self) -> usize {
        self.window.center as usize
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.window.size && y < self.window.size && self.values[y * self.window.size + x]
    }

    /// Calls `visit` with the window-local `(x, y)` of every point in the mask,
    /// row by row.
    pub fn iterate(&self, mut visit: impl FnMut(usize, usize)) {
        let size = self.window.size;
        for (index, _) in self.values.iter().enumerate().filter(|(_, inside)| **inside) {
            visit(index % size, index / size);
        }
    }

    pub fn count(&self) -> usize {
        self.values.iter().filter(|inside| **inside).count()
    }
}
