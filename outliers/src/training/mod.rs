//! Training matrices: feature vectors written out as CSV for tree training,
//! and the labelled matrices read back in.

#[cfg(test)]
mod tests;

use std::future::Future;
use std::io;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use common::SharedVec;
use thiserror::Error;
use tracing::{debug, info};

use crate::feature::{Feature, OutlierFeatureData};

pub const TYPES_FILENAME: &str = "types.csv";
pub const OUTLIER_DATA_FILENAME: &str = "outlier_data.csv";
pub const POSITIVE_DATA_FILENAME: &str = "positive_data.csv";
pub const NEGATIVE_DATA_FILENAME: &str = "negative_data.csv";

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("Failed to remove '{path}': {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown feature '{name}' in '{path}'")]
    UnknownFeature { path: PathBuf, name: String },

    #[error("Bad value on line {line} of '{path}': {source}")]
    Value {
        path: PathBuf,
        line: usize,
        #[source]
        source: ParseFloatError,
    },

    #[error("Line {line} of '{path}' has {actual} values, expected {expected}")]
    RowLength {
        path: PathBuf,
        line: usize,
        expected: usize,
        actual: usize,
    },
}

/// Accumulates one feature vector per blob for later export.
///
/// Clones share the same rows, so parallel workers can append to one matrix.
#[derive(Debug, Clone)]
pub struct CondensedOutlierGroupValueMatrix {
    features: Vec<Feature>,
    rows: SharedVec<OutlierFeatureData>,
}

impl Default for CondensedOutlierGroupValueMatrix {
    fn default() -> Self {
        Self {
            features: Feature::canonical(),
            rows: SharedVec::new(),
        }
    }
}

impl CondensedOutlierGroupValueMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Awaits `row` and appends the result.
    pub async fn append<F>(&self, row: F)
    where
        F: Future<Output = OutlierFeatureData>,
    {
        let row = row.await;
        self.rows.append(row).await;
    }

    pub async fn len(&self) -> usize {
        self.rows.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.is_empty().await
    }

    pub async fn rows(&self) -> Vec<OutlierFeatureData> {
        self.rows.elements().await
    }

    /// Replaces `types.csv` and `outlier_data.csv` in `dir`.
    ///
    /// Existing files are removed first. A failure part way through leaves
    /// whatever was already written.
    pub async fn write_csv(&self, dir: &Path) -> Result<(), MatrixError> {
        let header = self
            .features
            .iter()
            .map(|feature| feature.name())
            .collect::<Vec<_>>()
            .join(",");

        let rows = self.rows().await;
        let mut data = String::new();
        for row in &rows {
            let line = row
                .values()
                .iter()
                .map(|value| format!("{value:?}"))
                .collect::<Vec<_>>()
                .join(",");
            data.push_str(&line);
            data.push('\n');
        }

        replace_file(&dir.join(TYPES_FILENAME), header).await?;
        replace_file(&dir.join(OUTLIER_DATA_FILENAME), data).await?;

        info!(
            dir = %dir.display(),
            rows = rows.len(),
            "wrote training matrix"
        );
        Ok(())
    }
}

async fn replace_file(path: &Path, contents: String) -> Result<(), MatrixError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed previous file"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(MatrixError::Remove {
                path: path.to_path_buf(),
                source,
            });
        }
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| MatrixError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Labelled training data: feature vectors known to be paintable or not.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierGroupValueMatrix {
    pub features: Vec<Feature>,
    pub positive_values: Vec<Vec<f64>>,
    pub negative_values: Vec<Vec<f64>>,
}

impl OutlierGroupValueMatrix {
    /// Reads `types.csv`, `positive_data.csv` and `negative_data.csv` from
    /// `dir`. Returns `Ok(None)` if any of them is missing.
    pub async fn read(dir: &Path) -> Result<Option<Self>, MatrixError> {
        let types_path = dir.join(TYPES_FILENAME);
        let Some(types) = read_optional(&types_path).await? else {
            return Ok(None);
        };
        let features = types
            .trim()
            .split(',')
            .map(|name| {
                Feature::from_str(name.trim()).map_err(|_| MatrixError::UnknownFeature {
                    path: types_path.clone(),
                    name: name.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let positive_path = dir.join(POSITIVE_DATA_FILENAME);
        let Some(positive) = read_optional(&positive_path).await? else {
            return Ok(None);
        };
        let negative_path = dir.join(NEGATIVE_DATA_FILENAME);
        let Some(negative) = read_optional(&negative_path).await? else {
            return Ok(None);
        };

        let positive_values = parse_rows(&positive_path, &positive, features.len())?;
        let negative_values = parse_rows(&negative_path, &negative, features.len())?;
        debug!(
            dir = %dir.display(),
            positive = positive_values.len(),
            negative = negative_values.len(),
            "read training matrix"
        );

        Ok(Some(Self {
            features,
            positive_values,
            negative_values,
        }))
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>, MatrixError> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(MatrixError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses comma separated rows of `width` values.
///
/// A short final row, as left by an interrupted write, is dropped. A final
/// row cut right after a comma counts as short. Any other bad row is an error.
fn parse_rows(path: &Path, contents: &str, width: usize) -> Result<Vec<Vec<f64>>, MatrixError> {
    let lines: Vec<&str> = contents.lines().filter(|line| !line.is_empty()).collect();
    let mut rows = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let line_number = index + 1;
        let is_last = line_number == lines.len();

        let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let cut_after_comma = is_last && fields.len() > 1 && fields.last() == Some(&"");
        if cut_after_comma {
            fields.pop();
        }

        let row = fields
            .iter()
            .map(|value| {
                value.parse::<f64>().map_err(|source| MatrixError::Value {
                    path: path.to_path_buf(),
                    line: line_number,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if row.len() == width && !cut_after_comma {
            rows.push(row);
        } else if is_last && row.len() < width {
            debug!(path = %path.display(), line = line_number, "dropping truncated last row");
        } else {
            return Err(MatrixError::RowLength {
                path: path.to_path_buf(),
                line: line_number,
                expected: width,
                actual: row.len() + usize::from(cut_after_comma),
            });
        }
    }
    Ok(rows)
}
