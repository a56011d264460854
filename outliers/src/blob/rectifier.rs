use std::collections::BTreeMap;

use hashbrown::HashSet;
use tracing::{debug, trace};

use super::{Blob, BlobId, Pixel};

/// Merges blobs that share pixels.
///
/// Keeps a frame-sized grid mapping each pixel to at most one owning blob id.
/// Every pixel that references an id belongs to the live blob registered
/// under that id.
#[derive(Debug)]
pub struct BlobRectifier<B: Blob> {
    blobs: BTreeMap<BlobId, B>,
    // row-major, width * height
    refs: Vec<Option<BlobId>>,
    absorbed: HashSet<BlobId>,
    width: usize,
    height: usize,
    frame_index: usize,
}

impl<B: Blob> BlobRectifier<B> {
    /// # Panics
    ///
    /// Panics if two blobs share an id.
    pub fn new(
        blobs: impl IntoIterator<Item = B>,
        width: usize,
        height: usize,
        frame_index: usize,
    ) -> Self {
        let mut index = BTreeMap::new();
        for blob in blobs {
            let id = blob.id();
            let previous = index.insert(id, blob);
            assert!(previous.is_none(), "duplicate {id} in frame {frame_index}");
        }
        Self {
            blobs: index,
            refs: vec![None; width * height],
            absorbed: HashSet::new(),
            width,
            height,
            frame_index,
        }
    }

    /// One pass over every registered blob, in id order.
    ///
    /// Each blob looks for the first of its pixels already claimed by another
    /// live blob and offers itself to that blob. If taken, the blob is removed
    /// and its pixels re-pointed to the survivor; otherwise it claims every
    /// pixel not yet claimed. Returns how many blobs were absorbed.
    pub fn rectify(&mut self) -> usize {
        let ids: Vec<BlobId> = self.blobs.keys().copied().collect();
        let mut absorbed = 0;

        for id in ids {
            if self.absorbed.contains(&id) {
                continue;
            }
            let Some(blob) = self.blobs.remove(&id) else {
                continue;
            };

            if let Some(target_id) = self.first_conflict(&blob) {
                let merged = match self.blobs.get_mut(&target_id) {
                    Some(target) => target.absorb(&blob),
                    None => false,
                };
                if merged {
                    trace!(frame = self.frame_index, %id, %target_id, "absorbed");
                    self.absorbed.insert(id);
                    self.point_pixels(blob.pixels(), target_id);
                    absorbed += 1;
                    continue;
                }
            }

            self.claim_pixels(&blob);
            self.blobs.insert(id, blob);
        }

        debug!(
            frame = self.frame_index,
            absorbed,
            remaining = self.blobs.len(),
            "rectify pass done"
        );
        absorbed
    }

    /// Repeats [`rectify`](Self::rectify) until a pass absorbs nothing.
    ///
    /// A single pass can leave a live blob overlapping the survivor of a merge
    /// that happened after the blob claimed its pixels; the next pass folds it
    /// in.
    pub fn rectify_until_stable(&mut self) -> usize {
        let mut total = 0;
        loop {
            let absorbed = self.rectify();
            total += absorbed;
            if absorbed == 0 {
                return total;
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// The id owning `(x, y)`, if any.
    pub fn blob_ref(&self, x: usize, y: usize) -> Option<BlobId> {
        self.refs[self.index(x, y)]
    }

    pub fn blob(&self, id: BlobId) -> Option<&B> {
        self.blobs.get(&id)
    }

    pub fn blobs(&self) -> impl Iterator<Item = &B> {
        self.blobs.values()
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_absorbed(&self, id: BlobId) -> bool {
        self.absorbed.contains(&id)
    }

    pub fn absorbed(&self) -> &HashSet<BlobId> {
        &self.absorbed
    }

    pub fn into_blobs(self) -> Vec<B> {
        self.blobs.into_values().collect()
    }

    fn first_conflict(&self, blob: &B) -> Option<BlobId> {
        let id = blob.id();
        blob.pixels()
            .iter()
            .filter_map(|pixel| self.refs[self.index(pixel.x, pixel.y)])
            .find(|other| *other != id && self.blobs.contains_key(other))
    }

    fn claim_pixels(&mut self, blob: &B) {
        let id = blob.id();
        for pixel in blob.pixels() {
            let index = self.index(pixel.x, pixel.y);
            self.refs[index].get_or_insert(id);
        }
    }

    fn point_pixels(&mut self, pixels: &[Pixel], id: BlobId) {
        for pixel in pixels {
            let index = self.index(pixel.x, pixel.y);
            self.refs[index] = Some(id);
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} frame {}",
            self.width,
            self.height,
            self.frame_index
        );
        y * self.width + x
    }
}
