use fingerprint_features::image::ImageU8;
use fingerprint_features::{FeatureExtractor, PipelineParams};
use std::f32::consts::PI;

fn main() {
    env_logger::init();

    // Demo stub: concentric rings with a 10-pixel period.
    let (w, h) = (256usize, 256usize);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    let gray: Vec<u8> = (0..w * h)
        .map(|i| {
            let dx = (i % w) as f32 - cx;
            let dy = (i / w) as f32 - cy;
            let r = (dx * dx + dy * dy).sqrt();
            (127.5 + 100.0 * (2.0 * PI * r / 10.0).cos()) as u8
        })
        .collect();
    let img = ImageU8 {
        w,
        h,
        stride: w,
        data: &gray,
    };

    let extractor = FeatureExtractor::new(PipelineParams::default());
    match extractor.process(img) {
        Ok(res) => println!(
            "minutiae={} singularities={} median_wavelength={:?} latency_ms={:.3}",
            res.features.minutiae.len(),
            res.features.singularities.len(),
            res.frequency.median_wavelength(),
            res.timings.total_ms
        ),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}
