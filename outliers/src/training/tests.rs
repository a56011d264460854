use tempfile::TempDir;

use super::*;
use crate::feature::FEATURE_COUNT;

fn row(first: f64) -> OutlierFeatureData {
    OutlierFeatureData::from_fn(|index| if index == 0 { first } else { index as f64 * 0.5 })
}

async fn read(path: &Path) -> String {
    tokio::fs::read_to_string(path).await.unwrap()
}

// =============================================================================
// Writer
// =============================================================================

#[tokio::test]
async fn writes_header_and_rows_in_append_order() {
    let dir = TempDir::new().unwrap();
    let matrix = CondensedOutlierGroupValueMatrix::new();
    matrix.append(async { row(3.0) }).await;
    matrix.append(async { row(0.25) }).await;
    assert_eq!(matrix.len().await, 2);

    matrix.write_csv(dir.path()).await.unwrap();

    let header = read(&dir.path().join(TYPES_FILENAME)).await;
    let names: Vec<&str> = header.split(',').collect();
    assert_eq!(names.len(), FEATURE_COUNT);
    assert_eq!(names[0], "size");
    assert_eq!(names[13], "averageBrightness");
    assert_eq!(names[31], "pixelBorderAmount");

    let data = read(&dir.path().join(OUTLIER_DATA_FILENAME)).await;
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("3.0,0.5,1.0,1.5,"));
    assert!(lines[1].starts_with("0.25,0.5,"));
    assert_eq!(lines[0].split(',').count(), FEATURE_COUNT);
    assert!(data.ends_with('\n'));
}

#[tokio::test]
async fn rewrite_replaces_previous_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(OUTLIER_DATA_FILENAME), "stale\nstale\nstale\n").unwrap();

    let matrix = CondensedOutlierGroupValueMatrix::new();
    matrix.write_csv(dir.path()).await.unwrap();
    assert_eq!(read(&dir.path().join(OUTLIER_DATA_FILENAME)).await, "");

    matrix.append(async { row(1.0) }).await;
    matrix.write_csv(dir.path()).await.unwrap();
    assert_eq!(read(&dir.path().join(OUTLIER_DATA_FILENAME)).await.lines().count(), 1);
}

#[tokio::test]
async fn clones_share_rows() {
    let matrix = CondensedOutlierGroupValueMatrix::new();
    let worker = matrix.clone();
    let handle = tokio::spawn(async move {
        worker.append(async { row(9.0) }).await;
    });
    handle.await.unwrap();

    let rows = matrix.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value(Feature::Size), 9.0);
}

#[tokio::test]
async fn write_into_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let err = CondensedOutlierGroupValueMatrix::new()
        .write_csv(&missing)
        .await
        .unwrap_err();
    assert!(matches!(err, MatrixError::Write { .. }), "{err}");
}

// =============================================================================
// Reader
// =============================================================================

async fn write_labelled(dir: &Path, positive: &str, negative: &str) {
    tokio::fs::write(dir.join(TYPES_FILENAME), "size,maxHoughTheta,centerX\n")
        .await
        .unwrap();
    tokio::fs::write(dir.join(POSITIVE_DATA_FILENAME), positive)
        .await
        .unwrap();
    tokio::fs::write(dir.join(NEGATIVE_DATA_FILENAME), negative)
        .await
        .unwrap();
}

#[tokio::test]
async fn reads_labelled_matrix() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "1.0,45.0,0.5\n2.0,90.0,0.25\n", "0.0,0.0,0.0\n").await;

    let matrix = OutlierGroupValueMatrix::read(dir.path()).await.unwrap().unwrap();
    assert_eq!(
        matrix.features,
        vec![Feature::Size, Feature::MaxHoughTheta, Feature::CenterX]
    );
    assert_eq!(
        matrix.positive_values,
        vec![vec![1.0, 45.0, 0.5], vec![2.0, 90.0, 0.25]]
    );
    assert_eq!(matrix.negative_values, vec![vec![0.0, 0.0, 0.0]]);
}

#[tokio::test]
async fn truncated_last_row_is_dropped() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "1.0,45.0,0.5\n2.0,90", "").await;

    let matrix = OutlierGroupValueMatrix::read(dir.path()).await.unwrap().unwrap();
    assert_eq!(matrix.positive_values, vec![vec![1.0, 45.0, 0.5]]);
    assert!(matrix.negative_values.is_empty());
}

#[tokio::test]
async fn last_row_cut_after_comma_is_dropped() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "1.0,45.0,0.5\n2.0,90.0,", "").await;

    let matrix = OutlierGroupValueMatrix::read(dir.path()).await.unwrap().unwrap();
    assert_eq!(matrix.positive_values, vec![vec![1.0, 45.0, 0.5]]);
}

#[tokio::test]
async fn long_last_row_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "1.0,45.0,0.5\n2.0,90.0,0.25,7.0\n", "").await;

    let err = OutlierGroupValueMatrix::read(dir.path()).await.unwrap_err();
    assert!(
        matches!(err, MatrixError::RowLength { line: 2, expected: 3, actual: 4, .. }),
        "{err}"
    );
}

#[tokio::test]
async fn bad_value_in_last_row_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "1.0,45.0,0.5\n2.0,abc,0.25\n", "").await;

    let err = OutlierGroupValueMatrix::read(dir.path()).await.unwrap_err();
    assert!(matches!(err, MatrixError::Value { line: 2, .. }), "{err}");
}

#[tokio::test]
async fn short_row_in_the_middle_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "1.0,45.0\n2.0,90.0,0.25\n", "").await;

    let err = OutlierGroupValueMatrix::read(dir.path()).await.unwrap_err();
    assert!(
        matches!(err, MatrixError::RowLength { line: 1, expected: 3, actual: 2, .. }),
        "{err}"
    );
}

#[tokio::test]
async fn missing_file_reads_as_none() {
    let dir = TempDir::new().unwrap();
    assert!(OutlierGroupValueMatrix::read(dir.path()).await.unwrap().is_none());

    write_labelled(dir.path(), "", "").await;
    tokio::fs::remove_file(dir.path().join(NEGATIVE_DATA_FILENAME))
        .await
        .unwrap();
    assert!(OutlierGroupValueMatrix::read(dir.path()).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_feature_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_labelled(dir.path(), "", "").await;
    tokio::fs::write(dir.path().join(TYPES_FILENAME), "size,bogus")
        .await
        .unwrap();

    let err = OutlierGroupValueMatrix::read(dir.path()).await.unwrap_err();
    assert!(matches!(err, MatrixError::UnknownFeature { ref name, .. } if name == "bogus"));
}

#[tokio::test]
async fn written_header_reads_back() {
    let dir = TempDir::new().unwrap();
    let matrix = CondensedOutlierGroupValueMatrix::new();
    matrix.append(async { row(4.0) }).await;
    matrix.write_csv(dir.path()).await.unwrap();
    tokio::fs::copy(
        dir.path().join(OUTLIER_DATA_FILENAME),
        dir.path().join(POSITIVE_DATA_FILENAME),
    )
    .await
    .unwrap();
    tokio::fs::write(dir.path().join(NEGATIVE_DATA_FILENAME), "")
        .await
        .unwrap();

    let read = OutlierGroupValueMatrix::read(dir.path()).await.unwrap().unwrap();
    assert_eq!(read.features, Feature::canonical());
    assert_eq!(read.positive_values, vec![row(4.0).into_values()]);
}
