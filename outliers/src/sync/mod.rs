//! Blob bookkeeping shared between parallel workers.

mod blob_id_set;
mod pixel_status;

pub use blob_id_set::BlobIdSet;
pub use pixel_status::{PixelStatus, PixelStatusTracker};
