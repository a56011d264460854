use crate::shared::Shared;

/// An append-only list behind an async lock.
#[derive(Debug)]
pub struct SharedVec<T> {
    items: Shared<Vec<T>>,
}

impl<T> Clone for SharedVec<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T> Default for SharedVec<T> {
    fn default() -> Self {
        Self {
            items: Shared::new(Vec::new()),
        }
    }
}

impl<T> From<Vec<T>> for SharedVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Shared::new(items),
        }
    }
}

impl<T> SharedVec<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, item: T) {
        self.items.lock().await.push(item);
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// A copy of every element, in append order, as of this call.
    pub async fn elements(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.snapshot().await
    }
}
