use fingerprint_features::config::load_config;
use fingerprint_features::image::io::{load_grayscale_image, save_rgb_png, write_json_file};
use fingerprint_features::{Error, FeatureExtractor};
use log::info;
use std::env;
use std::path::Path;
use std::time::{Duration, Instant};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let config_path = args.next().ok_or_else(usage)?;
    let timeout = args
        .next()
        .map(|ms| ms.parse::<u64>().map(Duration::from_millis))
        .transpose()
        .map_err(|e| format!("invalid timeout: {e}\n{}", usage()))?;

    let config_path = Path::new(&config_path);
    let mut config = load_config(config_path)?;
    if let Some(base) = config_path.parent() {
        config.resolve_paths(base);
    }

    let params = config.pipeline_params();
    let gray = load_grayscale_image(&config.input)?;
    info!(
        "loaded {} ({}x{})",
        config.input.display(),
        gray.width(),
        gray.height()
    );

    let extractor = FeatureExtractor::new(params.clone());
    let result = match timeout {
        Some(limit) => extractor.process_with_deadline(gray.as_view(), Instant::now() + limit),
        None => extractor.process(gray.as_view()),
    };
    let result = match result {
        Err(Error::DeadlineExceeded { stage }) => {
            return Err(format!("timed out before the {stage} stage").into())
        }
        other => other?,
    };

    if config.output.stage_images {
        for record in &result.stages {
            let path = config.output.dir.join(format!("{}.png", record.file_stem()));
            save_rgb_png(&record.image, &path)?;
        }
        println!(
            "Saved {} stage images to {}",
            result.stages.len(),
            config.output.dir.display()
        );
    }
    if let (Some(path), Some(mosaic)) = (&config.output.mosaic, &result.mosaic) {
        save_rgb_png(mosaic, path)?;
        println!("Saved mosaic to {}", path.display());
    }

    let report = result.report(&params);
    if let Some(path) = &config.output.report_json {
        write_json_file(path, &report)?;
        println!("Saved feature report to {}", path.display());
    }
    println!("{}", report.summary_line());

    Ok(())
}

fn usage() -> String {
    "Usage: extract_features <config.json> [timeout_ms]".to_string()
}
