//! Angle histograms over ranked Hough transform lines.
//!
//! The transform itself lives elsewhere; this module consumes its output.

use serde::{Deserialize, Serialize};

/// A detected line in polar form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Angle in degrees, `[0, 360)`.
    pub theta: f64,
    /// Distance from the origin in pixels.
    pub rho: f64,
    /// Votes the line received.
    pub count: u32,
}

impl Line {
    pub fn new(theta: f64, rho: f64, count: u32) -> Self {
        Self { theta, rho, count }
    }
}

/// Vote totals bucketed by line angle, normalized by group size.
#[derive(Debug, Clone, PartialEq)]
pub struct HoughLineHistogram {
    values: Vec<f64>,
    increment: u32,
}

impl HoughLineHistogram {
    /// Buckets `lines` into `360 / increment` bins of `increment` degrees.
    ///
    /// # Panics
    ///
    /// Panics if `increment` does not divide 360, if `group_size` is zero, or
    /// if a line's theta is outside `[0, 360)`.
    pub fn new(increment: u32, lines: &[Line], group_size: u32) -> Self {
        assert!(
            increment > 0 && 360 % increment == 0,
            "histogram increment {increment} must divide 360"
        );
        assert!(group_size > 0, "histogram group size must be positive");

        let mut values = vec![0.0; (360 / increment) as usize];
        for line in lines {
            assert!(
                (0.0..360.0).contains(&line.theta),
                "line theta {} outside [0, 360)",
                line.theta
            );
            let index = (line.theta / f64::from(increment)) as usize;
            values[index] += f64::from(line.count) / f64::from(group_size);
        }

        Self { values, increment }
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Overlap of the best aligned bucket: the largest per-bucket minimum.
    ///
    /// Histograms with different increments never match and score `0`.
    pub fn match_score(&self, other: &HoughLineHistogram) -> f64 {
        if self.increment != other.increment {
            return 0.0;
        }
        self.values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a.min(*b))
            .fold(0.0, f64::max)
    }

    /// Lower edge, in degrees, of the bucket with the largest value.
    ///
    /// The first bucket wins ties; an empty histogram reports `0`.
    pub fn max_theta(&self) -> f64 {
        let mut max_value = 0.0;
        let mut max_index = 0;
        for (index, value) in self.values.iter().enumerate() {
            if *value > max_value {
                max_value = *value;
                max_index = index;
            }
        }
        let theta = (max_index as u32 * self.increment) as f64;
        theta.rem_euclid(360.0)
    }
}
