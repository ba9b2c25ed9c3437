mod common;

use common::init_logging;
use common::synthetic_image::{blank_u8, ring_pattern_u8, stripes_u8};
use fingerprint_features::image::ImageU8;
use fingerprint_features::stages::BlockCoord;
use fingerprint_features::{
    CompactParams, Error, FeatureExtractor, PipelineParams, SingularityKind, StageKind, run,
    run_compact,
};
use image::{GrayImage, ImageFormat};
use std::io::Cursor;
use std::time::{Duration, Instant};

fn view(width: usize, height: usize, data: &[u8]) -> ImageU8<'_> {
    ImageU8 {
        w: width,
        h: height,
        stride: width,
        data,
    }
}

#[test]
fn ring_pattern_wavelength_is_recovered() {
    init_logging();
    let (width, height) = (256usize, 256usize);
    let buffer = ring_pattern_u8(width, height, 10.0, 120.0);
    let result = run(view(width, height, &buffer), &PipelineParams::default())
        .expect("ring pattern should process");

    let grid = result.frequency.grid;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let mut checked = 0;
    for block in grid.blocks() {
        let rect = grid.block_rect(block);
        // Every corner of the block between 40 and 100 px from the centre.
        let inside = [
            (rect.x0, rect.y0),
            (rect.x1, rect.y0),
            (rect.x0, rect.y1),
            (rect.x1, rect.y1),
        ]
        .iter()
        .all(|&(x, y)| {
            let r = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
            (40.0..=100.0).contains(&r)
        });
        if !inside {
            continue;
        }
        let lambda = result
            .frequency
            .wavelength(block)
            .unwrap_or_else(|| panic!("block {block:?} has no estimate"));
        assert!(
            (lambda - 10.0).abs() <= 2.0,
            "block {block:?}: wavelength {lambda}"
        );
        checked += 1;
    }
    assert!(checked >= 12, "only {checked} blocks inside the annulus");
    assert!(!result.features.minutiae.is_empty() || result.skeleton.ridges.count_set() > 0);
}

#[test]
fn ring_pattern_centre_is_a_whorl() {
    init_logging();
    let (width, height) = (256usize, 256usize);
    let buffer = ring_pattern_u8(width, height, 10.0, 120.0);
    let result = run(view(width, height, &buffer), &PipelineParams::default())
        .expect("ring pattern should process");

    // The rings are centred on the corner shared by blocks (7..=8, 7..=8).
    let whorl = result
        .features
        .singularities
        .iter()
        .find(|s| {
            s.kind == SingularityKind::Whorl
                && (7..=8).contains(&s.block.row)
                && (7..=8).contains(&s.block.col)
        })
        .unwrap_or_else(|| panic!("no whorl at the centre: {:?}", result.features.singularities));
    assert!(
        (whorl.poincare_index_deg - 360.0).abs() <= 1.0,
        "index {}",
        whorl.poincare_index_deg
    );
}

#[test]
fn blank_image_yields_no_features() {
    init_logging();
    let buffer = blank_u8(200, 150, 255);
    let result = run(view(200, 150, &buffer), &PipelineParams::default())
        .expect("blank image must not raise");
    assert!(result.features.minutiae.is_empty());
    assert!(result.features.singularities.is_empty());
    assert_eq!(result.segmentation.block_mask.foreground_count(), 0);
    assert_eq!(result.frequency.valid_count(), 0);
}

#[test]
fn straight_ridges_have_no_singularities() {
    init_logging();
    let buffer = stripes_u8(160, 160, 30f32.to_radians(), 9.0);
    let result = run(view(160, 160, &buffer), &PipelineParams::default()).unwrap();
    assert!(result.features.singularities.is_empty());
    let inner = result.orientation.angle_deg(BlockCoord::new(5, 5));
    assert!((inner - 30.0).abs() < 3.0, "orientation {inner}");
    assert!(result.skeleton.ridges.data.iter().all(|&v| v <= 1));
}

#[test]
fn mosaic_tiles_are_the_stage_images() {
    init_logging();
    let (width, height) = (128usize, 96usize);
    let buffer = ring_pattern_u8(width, height, 10.0, 60.0);
    let result = run(view(width, height, &buffer), &PipelineParams::default()).unwrap();

    let kinds: Vec<StageKind> = result.stages.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, StageKind::ALL[..9].to_vec());
    assert!(result.stages.iter().enumerate().all(|(i, r)| r.index == i + 1));

    let mosaic = result.mosaic.as_ref().expect("mosaic rendered");
    assert_eq!(mosaic.dimensions(), (4 * width as u32, 2 * height as u32));
    let tiles: Vec<_> = result
        .stages
        .iter()
        .filter(|r| r.kind != StageKind::Frequency)
        .collect();
    assert_eq!(tiles.len(), 8);
    for (i, record) in tiles.iter().enumerate() {
        let ox = (i % 4) as u32 * width as u32;
        let oy = (i / 4) as u32 * height as u32;
        for (x, y, px) in record.image.enumerate_pixels() {
            assert_eq!(mosaic.get_pixel(ox + x, oy + y), px, "{:?} at ({x}, {y})", record.kind);
        }
    }
}

#[test]
fn expired_deadline_returns_no_partial_result() {
    init_logging();
    let buffer = ring_pattern_u8(128, 128, 10.0, 60.0);
    let extractor = FeatureExtractor::default();

    let past = Instant::now()
        .checked_sub(Duration::from_millis(1))
        .unwrap_or_else(Instant::now);
    let err = extractor.process_with_deadline(view(128, 128, &buffer), past);
    assert!(matches!(err, Err(Error::DeadlineExceeded { .. })));

    let later = Instant::now() + Duration::from_secs(3600);
    assert!(extractor
        .process_with_deadline(view(128, 128, &buffer), later)
        .is_ok());
}

#[test]
fn encoded_input_matches_raw_input() {
    init_logging();
    let (width, height) = (128usize, 128usize);
    let buffer = ring_pattern_u8(width, height, 10.0, 60.0);
    let gray = GrayImage::from_raw(width as u32, height as u32, buffer.clone()).unwrap();
    let mut png = Cursor::new(Vec::new());
    gray.write_to(&mut png, ImageFormat::Png).unwrap();

    let extractor = FeatureExtractor::default();
    let from_png = extractor.process_encoded(png.get_ref()).unwrap();
    let from_raw = extractor.process(view(width, height, &buffer)).unwrap();
    assert_eq!(from_png.features.minutiae, from_raw.features.minutiae);
    assert_eq!(from_png.original, from_raw.original);

    assert!(matches!(extractor.process_encoded(&[]), Err(Error::EmptyInput)));
    assert!(matches!(
        extractor.process_encoded(b"not an image"),
        Err(Error::Decode(_))
    ));
}

#[test]
fn compact_params_drive_the_run() {
    init_logging();
    let buffer = ring_pattern_u8(128, 128, 10.0, 60.0);
    let compact = CompactParams {
        block_size: 8,
        ..CompactParams::default()
    };
    let result = run_compact(view(128, 128, &buffer), &compact).unwrap();
    assert_eq!(result.orientation.grid.block_size, 8);
    assert_eq!(result.segmentation.block_mask.grid.rows, 16);
}

#[test]
fn report_serializes_features_and_stages() {
    init_logging();
    let buffer = ring_pattern_u8(128, 128, 10.0, 60.0);
    let params = PipelineParams::default();
    let result = run(view(128, 128, &buffer), &params).unwrap();
    let report = result.report(&params);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stages"].as_array().map(Vec::len), Some(9));
    assert_eq!(
        json["features"]["minutiae"].as_array().map(Vec::len),
        Some(result.features.minutiae.len())
    );
    assert_eq!(json["input"]["width"], 128);
    assert!(json["stages"][0].get("image").is_none());
    assert!(report.summary_line().contains("endings"));
}
