use super::*;

fn blob(id: u32, coords: &[(usize, usize)]) -> PixelBlob {
    let pixels = coords
        .iter()
        .map(|&(x, y)| Pixel::new(x, y, 100))
        .collect();
    PixelBlob::new(BlobId(id), pixels)
}

/// Every grid entry points at a live blob that owns the pixel.
fn assert_grid_consistent(rectifier: &BlobRectifier<PixelBlob>) {
    for y in 0..rectifier.height() {
        for x in 0..rectifier.width() {
            if let Some(id) = rectifier.blob_ref(x, y) {
                let owner = rectifier
                    .blob(id)
                    .unwrap_or_else(|| panic!("({x}, {y}) points at dead {id}"));
                assert!(
                    owner.pixels().iter().any(|p| p.coord() == (x, y)),
                    "({x}, {y}) points at {id} which does not contain it"
                );
            }
        }
    }
}

// =============================================================================
// PixelBlob
// =============================================================================

#[test]
fn pixel_blob_statistics() {
    let blob = PixelBlob::new(
        BlobId(1),
        vec![
            Pixel::new(2, 3, 10),
            Pixel::new(4, 3, 0),
            Pixel::new(3, 5, 30),
            Pixel::new(2, 4, 20),
        ],
    );

    assert_eq!(blob.size(), 4);
    assert_eq!(blob.average_intensity(), 15);
    assert_eq!(blob.max_intensity(), 30);
    assert_eq!(blob.median_intensity(), 20);

    let bounds = blob.bounding_box().unwrap();
    assert_eq!(bounds.min, (2, 3));
    assert_eq!(bounds.max, (4, 5));
    assert_eq!((bounds.width(), bounds.height()), (3, 3));
    assert_eq!(bounds.center(), (3.0, 4.0));

    assert_eq!(blob.pixel_values(), vec![10, 0, 0, 20, 0, 0, 0, 30, 0]);
}

#[test]
fn empty_blob_statistics() {
    let blob = PixelBlob::new(BlobId(1), vec![]);
    assert!(blob.is_empty());
    assert_eq!(blob.average_intensity(), 0);
    assert_eq!(blob.median_intensity(), 0);
    assert!(blob.bounding_box().is_none());
    assert!(blob.pixel_values().is_empty());
}

#[test]
fn absorb_skips_shared_pixels() {
    let mut a = blob(1, &[(0, 0), (1, 0)]);
    let b = blob(2, &[(1, 0), (2, 0)]);

    assert!(a.absorb(&b));
    assert_eq!(a.id(), BlobId(1));
    assert_eq!(a.size(), 3);
}

#[test]
fn absorb_refuses_self_and_oversize() {
    let mut a = blob(1, &[(0, 0), (1, 0)]).with_max_size(Some(3));
    let same = blob(1, &[(5, 5)]);
    assert!(!a.absorb(&same));

    let big = blob(2, &[(1, 0), (2, 0), (3, 0)]);
    assert!(!a.absorb(&big));
    assert_eq!(a.size(), 2);

    let small = blob(3, &[(1, 0), (2, 0)]);
    assert!(a.absorb(&small));
    assert_eq!(a.size(), 3);
}

// =============================================================================
// BlobRectifier
// =============================================================================

#[test]
fn disjoint_blobs_stay_independent() {
    let mut rectifier = BlobRectifier::new(
        [blob(1, &[(0, 0), (1, 0)]), blob(2, &[(3, 3), (3, 2)])],
        4,
        4,
        0,
    );

    assert_eq!(rectifier.rectify(), 0);
    assert_eq!(rectifier.blob_count(), 2);
    assert_eq!(rectifier.blob_ref(0, 0), Some(BlobId(1)));
    assert_eq!(rectifier.blob_ref(1, 0), Some(BlobId(1)));
    assert_eq!(rectifier.blob_ref(3, 3), Some(BlobId(2)));
    assert_eq!(rectifier.blob_ref(3, 2), Some(BlobId(2)));
    assert_eq!(rectifier.blob_ref(2, 2), None);
    assert_grid_consistent(&rectifier);
}

#[test]
fn overlapping_pair_merges_into_one() {
    let mut rectifier = BlobRectifier::new(
        [blob(1, &[(0, 0), (1, 0)]), blob(2, &[(1, 0), (2, 0)])],
        3,
        3,
        7,
    );

    assert_eq!(rectifier.rectify(), 1);

    assert_eq!(rectifier.blob_count(), 1);
    assert!(rectifier.blob(BlobId(2)).is_none());
    assert!(rectifier.is_absorbed(BlobId(2)));
    // row 0 is grid indices 0, 1, 2
    for x in 0..3 {
        assert_eq!(rectifier.blob_ref(x, 0), Some(BlobId(1)));
    }
    assert_eq!(rectifier.blob(BlobId(1)).unwrap().size(), 3);
    assert_grid_consistent(&rectifier);
}

#[test]
fn refused_merge_keeps_first_claim() {
    let mut rectifier = BlobRectifier::new(
        [
            blob(1, &[(0, 0), (1, 0)]).with_max_size(Some(2)),
            blob(2, &[(1, 0), (2, 0)]),
        ],
        3,
        1,
        0,
    );

    assert_eq!(rectifier.rectify_until_stable(), 0);

    assert_eq!(rectifier.blob_count(), 2);
    assert!(rectifier.absorbed().is_empty());
    assert_eq!(rectifier.blob_ref(0, 0), Some(BlobId(1)));
    assert_eq!(rectifier.blob_ref(1, 0), Some(BlobId(1)));
    assert_eq!(rectifier.blob_ref(2, 0), Some(BlobId(2)));
    assert_grid_consistent(&rectifier);
}

#[test]
fn first_conflicting_pixel_picks_the_target() {
    // blob 3 touches blob 2 at its first pixel and blob 1 at its second
    let mut rectifier = BlobRectifier::new(
        [
            blob(1, &[(0, 0)]),
            blob(2, &[(2, 0)]),
            blob(3, &[(2, 0), (0, 0), (1, 0)]),
        ],
        3,
        1,
        0,
    );

    assert_eq!(rectifier.rectify(), 1);
    assert_eq!(rectifier.blob(BlobId(2)).unwrap().size(), 3);
    assert_eq!(rectifier.blob(BlobId(1)).unwrap().size(), 1);
}

#[test]
fn chained_overlap_needs_a_second_pass() {
    // 3 bridges 1 and 2 but is processed after both claimed their pixels
    let blobs = [
        blob(1, &[(0, 0)]),
        blob(2, &[(2, 0)]),
        blob(3, &[(0, 0), (1, 0), (2, 0)]),
    ];

    let mut single = BlobRectifier::new(blobs.clone(), 3, 1, 0);
    assert_eq!(single.rectify(), 1);
    // blob 2 is still live but its pixel now points at blob 1
    assert_eq!(single.blob_count(), 2);
    assert_eq!(single.blob_ref(2, 0), Some(BlobId(1)));

    let mut stable = BlobRectifier::new(blobs, 3, 1, 0);
    assert_eq!(stable.rectify_until_stable(), 2);
    assert_eq!(stable.blob_count(), 1);
    let survivor = stable.blob(BlobId(1)).unwrap();
    assert_eq!(survivor.size(), 3);
    for x in 0..3 {
        assert_eq!(stable.blob_ref(x, 0), Some(BlobId(1)));
    }
    assert_grid_consistent(&stable);
}

#[test]
fn absorbed_blob_is_not_reprocessed() {
    let mut rectifier = BlobRectifier::new(
        [
            blob(1, &[(0, 0), (1, 0)]),
            blob(2, &[(1, 0), (2, 0)]),
            blob(3, &[(2, 0), (3, 0)]),
        ],
        4,
        1,
        0,
    );

    // 2 joins 1, then 3 finds (2, 0) already pointing at 1
    assert_eq!(rectifier.rectify(), 2);
    assert_eq!(rectifier.blob_count(), 1);
    assert_eq!(rectifier.blob(BlobId(1)).unwrap().size(), 4);
    assert_eq!(rectifier.rectify(), 0);
    assert_grid_consistent(&rectifier);
}

#[test]
fn into_blobs_returns_survivors_in_id_order() {
    let mut rectifier = BlobRectifier::new(
        [blob(5, &[(0, 0)]), blob(2, &[(1, 1)]), blob(9, &[(1, 1)])],
        2,
        2,
        0,
    );
    rectifier.rectify_until_stable();

    let ids: Vec<BlobId> = rectifier.into_blobs().iter().map(Blob::id).collect();
    assert_eq!(ids, vec![BlobId(2), BlobId(5)]);
}

#[test]
#[should_panic(expected = "duplicate blob 4")]
fn duplicate_ids_rejected() {
    BlobRectifier::new([blob(4, &[(0, 0)]), blob(4, &[(1, 0)])], 2, 1, 0);
}

#[test]
#[should_panic(expected = "outside 2x2 frame")]
fn pixel_outside_frame_panics() {
    let mut rectifier = BlobRectifier::new([blob(1, &[(2, 0)])], 2, 2, 0);
    rectifier.rectify();
}
