use std::path::Path;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::blob::{BlobId, Pixel};
use crate::hough::Line;

use super::PipelineError;

/// One frame's detector output as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFile {
    pub frame_index: usize,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub blobs: Vec<BlobRecord>,
}

/// A detected blob and the Hough lines found in it, strongest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobRecord {
    pub id: BlobId,
    pub pixels: Vec<Pixel>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl FrameFile {
    /// Decodes and checks a frame of at most `max_pixels` pixels.
    pub fn from_json(path: &Path, bytes: &[u8], max_pixels: usize) -> Result<Self, PipelineError> {
        let frame: FrameFile =
            serde_json::from_slice(bytes).map_err(|source| PipelineError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        frame.check(path, max_pixels)?;
        Ok(frame)
    }

    /// Rejects input the rectifier and histogram would otherwise panic on.
    fn check(&self, path: &Path, max_pixels: usize) -> Result<(), PipelineError> {
        let invalid = |reason: String| PipelineError::InvalidFrame {
            path: path.to_path_buf(),
            reason,
        };

        match self.width.checked_mul(self.height) {
            Some(pixels) if pixels <= max_pixels => {}
            _ => {
                return Err(invalid(format!(
                    "{}x{} frame exceeds {max_pixels} pixels",
                    self.width, self.height
                )));
            }
        }

        let mut ids = HashSet::with_capacity(self.blobs.len());
        for blob in &self.blobs {
            if !ids.insert(blob.id) {
                return Err(invalid(format!("duplicate {}", blob.id)));
            }
            if let Some(pixel) = blob
                .pixels
                .iter()
                .find(|p| p.x >= self.width || p.y >= self.height)
            {
                return Err(invalid(format!(
                    "{} pixel ({}, {}) outside {}x{}",
                    blob.id, pixel.x, pixel.y, self.width, self.height
                )));
            }
            if let Some(line) = blob
                .lines
                .iter()
                .find(|line| !(0.0..360.0).contains(&line.theta))
            {
                return Err(invalid(format!(
                    "{} line theta {} outside [0, 360)",
                    blob.id, line.theta
                )));
            }
        }
        Ok(())
    }
}
