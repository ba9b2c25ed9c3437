use crate::error::{Error, Result};
use crate::params::{CompactParams, PipelineParams};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of the `extract_features` tool.
///
/// ```json
/// {
///   "input": "data/finger.png",
///   "params": { "blockSize": 16, "segment": { "relativeThreshold": 0.2 } },
///   "output": { "dir": "out", "report_json": "out/report.json", "mosaic": "out/mosaic.png" }
/// }
/// ```
///
/// A flat `compact` object (`blockSize`, `varianceThreshold`, `minWaveLength`,
/// `maxWaveLength`, `kernelSize`, `tolerance`) may be given instead of
/// `params` and takes precedence when both are present.
#[derive(Debug, Deserialize)]
pub struct ExtractToolConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub params: PipelineParams,
    #[serde(default)]
    pub compact: Option<CompactParams>,
    pub output: ExtractOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct ExtractOutputConfig {
    /// Directory receiving one PNG per stage.
    pub dir: PathBuf,
    #[serde(default = "default_true")]
    pub stage_images: bool,
    #[serde(rename = "report_json")]
    pub report_json: Option<PathBuf>,
    pub mosaic: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl ExtractToolConfig {
    /// Effective pipeline parameters.
    pub fn pipeline_params(&self) -> PipelineParams {
        match &self.compact {
            Some(compact) => PipelineParams::from_compact(compact),
            None => self.params.clone(),
        }
    }

    /// Resolve relative paths against `base` (usually the config's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.input);
        join(&mut self.output.dir);
        if let Some(p) = self.output.report_json.as_mut() {
            join(p);
        }
        if let Some(p) = self.output.mosaic.as_mut() {
            join(p);
        }
    }
}

pub fn parse_config(text: &str) -> Result<ExtractToolConfig> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_config(path: &Path) -> Result<ExtractToolConfig> {
    let data = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_config(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ScanKernel;

    #[test]
    fn nested_params_fall_back_to_defaults() {
        let cfg = parse_config(
            r#"{
                "input": "finger.png",
                "params": { "blockSize": 12, "gabor": { "sigmaFactor": 0.5 } },
                "output": { "dir": "out" }
            }"#,
        )
        .unwrap();
        let params = cfg.pipeline_params();
        assert_eq!(params.block_size, 12);
        assert_eq!(params.gabor.sigma_factor, 0.5);
        assert_eq!(params.gabor.angle_step_deg, 3.0);
        assert_eq!(params.frequency.max_wavelength, 15.0);
        assert!(cfg.output.stage_images);
        assert!(cfg.output.report_json.is_none());
    }

    #[test]
    fn compact_params_take_precedence() {
        let cfg = parse_config(
            r#"{
                "input": "finger.png",
                "params": { "blockSize": 12 },
                "compact": { "blockSize": 20, "varianceThreshold": 0.3, "kernelSize": "5x5", "tolerance": 2.0 },
                "output": { "dir": "out", "report_json": "report.json" }
            }"#,
        )
        .unwrap();
        let params = cfg.pipeline_params();
        assert_eq!(params.block_size, 20);
        assert_eq!(params.segment.relative_threshold, 0.3);
        assert_eq!(params.minutiae.kernel, ScanKernel::FiveByFive);
        assert_eq!(params.singularity.tolerance_deg, 2.0);
        assert_eq!(params.frequency.min_wavelength, 5.0);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let mut cfg = parse_config(
            r#"{ "input": "in.png", "output": { "dir": "/abs/out", "mosaic": "m.png" } }"#,
        )
        .unwrap();
        cfg.resolve_paths(Path::new("/cfg"));
        assert_eq!(cfg.input, PathBuf::from("/cfg/in.png"));
        assert_eq!(cfg.output.dir, PathBuf::from("/abs/out"));
        assert_eq!(cfg.output.mosaic, Some(PathBuf::from("/cfg/m.png")));
    }

    #[test]
    fn missing_output_is_a_json_error() {
        assert!(matches!(
            parse_config(r#"{ "input": "in.png" }"#),
            Err(Error::Json(_))
        ));
    }
}
