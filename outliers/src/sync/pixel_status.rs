use common::Shared;
use hashbrown::HashMap;

use crate::blob::BlobId;

/// What is known about a pixel during blob detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelStatus {
    #[default]
    Unknown,
    Background,
    Blobbed(BlobId),
}

/// Pixel statuses keyed by coordinate, behind an async lock.
///
/// Pixels never recorded read as [`PixelStatus::Unknown`].
#[derive(Debug, Clone, Default)]
pub struct PixelStatusTracker {
    statuses: Shared<HashMap<(usize, usize), PixelStatus>>,
}

impl PixelStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn status(&self, x: usize, y: usize) -> PixelStatus {
        self.statuses
            .lock()
            .await
            .get(&(x, y))
            .copied()
            .unwrap_or_default()
    }

    /// Records `status`, returning the previous one.
    pub async fn record(&self, x: usize, y: usize, status: PixelStatus) -> PixelStatus {
        self.statuses
            .lock()
            .await
            .insert((x, y), status)
            .unwrap_or_default()
    }

    /// Number of pixels with a recorded status.
    pub async fn len(&self) -> usize {
        self.statuses.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.statuses.lock().await.is_empty()
    }
}
