//! Builds a training matrix from frame dumps.
//!
//! ```text
//! outlier_matrix <config.yaml> <output_dir> <frame.json>...
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use common::setup_logging;
use outliers::{Config, FramePipeline};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let (Some(config_path), Some(output_dir)) = (args.next(), args.next()) else {
        bail!("usage: outlier_matrix <config.yaml> <output_dir> <frame.json>...");
    };
    let config_path = PathBuf::from(config_path);
    let output_dir = PathBuf::from(output_dir);
    let frames: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if frames.is_empty() {
        bail!("no frame files given");
    }

    let config = Config::from_yaml_file(&config_path)?;
    setup_logging(&config.log)?;
    info!(
        config = %config_path.display(),
        frames = frames.len(),
        "starting"
    );

    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("creating '{}'", output_dir.display()))?;

    let pipeline = FramePipeline::new(config);
    let report = pipeline.process(&frames).await?;
    pipeline.write_matrix(&output_dir).await?;

    info!(
        frames = report.frames,
        blobs = report.blobs.len(),
        absorbed = report.absorbed,
        output = %output_dir.display(),
        "done"
    );
    Ok(())
}
