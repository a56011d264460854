//! Batch driver: loads frame files, merges overlapping blobs, extracts and
//! scores features, and collects them into a training matrix.

mod frame;


use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{DispatchHandler, IoGate, MethodList, NumberRunning, TaskRunner, method};
use hashbrown::HashMap;
use rayon::prelude::*;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, info, trace, warn};

use crate::blob::{Blob, BlobId, BlobRectifier, PixelBlob};
use crate::classifier::OutlierGroupClassifier;
use crate::config::Config;
use crate::feature::{FrameNeighborhood, OutlierCandidate, OutlierFeatureData};
use crate::training::{CondensedOutlierGroupValueMatrix, MatrixError};

pub use frame::{BlobRecord, FrameFile};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read frame '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode frame '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid frame '{path}': {reason}")]
    InvalidFrame { path: PathBuf, reason: String },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("Frame task failed: {0}")]
    Join(#[from] JoinError),
}

/// A frame after rectification, ready for feature extraction.
#[derive(Debug, Clone)]
pub struct RectifiedFrame {
    pub frame_index: usize,
    pub width: usize,
    pub height: usize,
    pub absorbed: usize,
    pub candidates: Vec<OutlierCandidate>,
}

/// Features and, when a classifier is set, the score of one surviving blob.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBlob {
    pub frame_index: usize,
    pub blob: BlobId,
    pub features: OutlierFeatureData,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Frames loaded and rectified; skipped duplicates are not counted.
    pub frames: usize,
    /// Blobs merged into others across all frames.
    pub absorbed: usize,
    /// Surviving blobs, ordered by frame index then blob id.
    pub blobs: Vec<ScoredBlob>,
}

type FrameResult = Result<Option<RectifiedFrame>, PipelineError>;

/// Runs frame files through rectification and feature extraction.
///
/// Clones share the gate, counters and matrix.
#[derive(Clone)]
pub struct FramePipeline {
    config: Arc<Config>,
    gate: IoGate,
    dispatch: DispatchHandler,
    runner: TaskRunner,
    frames_remaining: NumberRunning,
    matrix: CondensedOutlierGroupValueMatrix,
    classifier: Option<Arc<dyn OutlierGroupClassifier>>,
}

impl FramePipeline {
    /// # Panics
    ///
    /// Panics if `config` fails [`Config::validate`].
    pub fn new(config: Config) -> Self {
        config.validate();
        Self {
            gate: IoGate::new(config.max_concurrent_loads, config.max_concurrent_saves),
            dispatch: DispatchHandler::new(),
            runner: TaskRunner::new(config.max_concurrent_tasks),
            frames_remaining: NumberRunning::new(),
            matrix: CondensedOutlierGroupValueMatrix::new(),
            classifier: None,
            config: Arc::new(config),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn OutlierGroupClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Frames queued or loading and not yet rectified.
    pub fn frames_remaining(&self) -> &NumberRunning {
        &self.frames_remaining
    }

    pub fn matrix(&self) -> &CondensedOutlierGroupValueMatrix {
        &self.matrix
    }

    /// Processes every file in `paths` and appends one matrix row per
    /// surviving blob.
    ///
    /// Frames are loaded and rectified in parallel, smallest position first.
    /// Features are extracted once all frames are in, so each frame can see
    /// the frames on either side of it.
    pub async fn process(&self, paths: &[PathBuf]) -> Result<PipelineReport, PipelineError> {
        let queue: MethodList<FrameResult> =
            MethodList::with_remove_observer(|queued| trace!(queued, "frame dequeued"));
        for (position, path) in paths.iter().enumerate() {
            let pipeline = self.clone();
            let path = path.clone();
            self.frames_remaining.increment();
            let work = method(move || {
                let pipeline = pipeline.clone();
                let path = path.clone();
                async move {
                    let result = pipeline.load_frame(&path).await;
                    let _ = pipeline.frames_remaining.decrement();
                    result
                }
            });
            queue.add(position as i64, work).await;
        }
        info!(frames = paths.len(), "queued frames");

        let mut handles = Vec::with_capacity(paths.len());
        while let Some((position, work)) = queue.pop_next().await {
            trace!(position, "dispatching frame");
            handles.push(self.runner.run(work()).await);
        }

        let mut frames = Vec::with_capacity(handles.len());
        let mut failure = None;
        for handle in handles {
            match handle.join().await {
                Ok(Ok(Some(frame))) => frames.push(frame),
                Ok(Ok(None)) => {}
                Ok(Err(err)) => {
                    warn!(error = %err, "frame failed");
                    failure.get_or_insert(err);
                }
                Err(err) => {
                    failure.get_or_insert(err.into());
                }
            }
        }
        self.dispatch.wait().await;
        if let Some(err) = failure {
            return Err(err);
        }

        frames.sort_by_key(|frame| frame.frame_index);
        let absorbed: usize = frames.iter().map(|frame| frame.absorbed).sum();
        let frame_count = frames.len();

        let classifier = self.classifier.clone();
        let blobs =
            tokio::task::spawn_blocking(move || score_frames(&frames, classifier.as_deref()))
                .await?;

        for scored in &blobs {
            self.matrix
                .append(std::future::ready(scored.features.clone()))
                .await;
        }

        info!(
            frames = frame_count,
            blobs = blobs.len(),
            absorbed,
            "processed frames"
        );
        Ok(PipelineReport {
            frames: frame_count,
            absorbed,
            blobs,
        })
    }

    /// Writes the accumulated matrix to `dir` through the save gate.
    pub async fn write_matrix(&self, dir: &Path) -> Result<(), PipelineError> {
        self.gate.save(self.matrix.write_csv(dir)).await?;
        Ok(())
    }

    /// Loads and rectifies one frame file.
    ///
    /// Returns `None` when the same file is already being processed.
    async fn load_frame(&self, path: &Path) -> FrameResult {
        let name = path.display().to_string();
        let Ok(_guard) = self.dispatch.enter_scoped(&name) else {
            warn!(path = %name, "frame already in progress, skipping");
            return Ok(None);
        };

        let bytes = self
            .gate
            .load(tokio::fs::read(path))
            .await
            .map_err(|source| PipelineError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let frame = FrameFile::from_json(path, &bytes, self.config.max_frame_pixels)?;
        Ok(Some(self.rectify(frame)))
    }

    fn rectify(&self, frame: FrameFile) -> RectifiedFrame {
        let mut lines = HashMap::with_capacity(frame.blobs.len());
        let mut blobs = Vec::with_capacity(frame.blobs.len());
        for record in frame.blobs {
            lines.insert(record.id, record.lines);
            blobs.push(
                PixelBlob::new(record.id, record.pixels).with_max_size(self.config.max_blob_size),
            );
        }
        let detected = blobs.len();

        let mut rectifier = BlobRectifier::new(blobs, frame.width, frame.height, frame.frame_index);
        let absorbed = rectifier.rectify_until_stable();

        let candidates: Vec<OutlierCandidate> = rectifier
            .into_blobs()
            .into_iter()
            .map(|blob| {
                let blob_lines = lines.remove(&blob.id()).unwrap_or_default();
                OutlierCandidate::new(blob, blob_lines, self.config.histogram_increment)
            })
            .collect();

        debug!(
            frame = frame.frame_index,
            detected,
            absorbed,
            remaining = candidates.len(),
            "rectified frame"
        );
        RectifiedFrame {
            frame_index: frame.frame_index,
            width: frame.width,
            height: frame.height,
            absorbed,
            candidates,
        }
    }
}

/// Extracts and scores features for every candidate of `frames`, which must
/// be sorted by frame index.
///
/// Frames whose index is exactly one apart count as neighbours.
pub fn score_frames(
    frames: &[RectifiedFrame],
    classifier: Option<&dyn OutlierGroupClassifier>,
) -> Vec<ScoredBlob> {
    let mut scored = Vec::new();
    for (position, frame) in frames.iter().enumerate() {
        let previous = position
            .checked_sub(1)
            .map(|p| &frames[p])
            .filter(|p| p.frame_index + 1 == frame.frame_index);
        let next = frames
            .get(position + 1)
            .filter(|n| n.frame_index == frame.frame_index + 1);

        let neighborhood = FrameNeighborhood {
            frame: &frame.candidates,
            previous: previous.map(|p| p.candidates.as_slice()),
            next: next.map(|n| n.candidates.as_slice()),
            frame_width: frame.width,
            frame_height: frame.height,
        };

        let frame_scores: Vec<ScoredBlob> = frame
            .candidates
            .par_iter()
            .map(|candidate| {
                let features = neighborhood.features(candidate);
                let score = classifier.map(|classifier| classifier.classification(&features));
                ScoredBlob {
                    frame_index: frame.frame_index,
                    blob: candidate.blob().id(),
                    features,
                    score,
                }
            })
            .collect();
        scored.extend(frame_scores);
    }
    scored
}
