use common::Shared;
use hashbrown::HashSet;

use crate::blob::BlobId;

/// A set of blob ids behind an async lock. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct BlobIdSet {
    ids: Shared<HashSet<BlobId>>,
}

impl BlobIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: BlobId) -> bool {
        self.ids.lock().await.contains(&id)
    }

    /// Returns `false` if `id` was already present.
    pub async fn insert(&self, id: BlobId) -> bool {
        self.ids.lock().await.insert(id)
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }

    pub async fn snapshot(&self) -> HashSet<BlobId> {
        self.ids.snapshot().await
    }

    /// Adds every id of `other`, as of when its snapshot is taken.
    pub async fn union(&self, other: &BlobIdSet) {
        // release other's lock before taking ours
        let theirs = other.snapshot().await;
        self.ids.lock().await.extend(theirs);
    }
}

impl From<HashSet<BlobId>> for BlobIdSet {
    fn from(ids: HashSet<BlobId>) -> Self {
        Self {
            ids: Shared::new(ids),
        }
    }
}
