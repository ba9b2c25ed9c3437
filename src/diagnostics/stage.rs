use crate::error::Result;
use crate::image::io::encode_png;
use crate::pipeline::StageKind;
use image::RgbImage;
use serde::Serialize;
use std::collections::BTreeMap;

/// One visualised pipeline step: position, labels, the parameters it ran
/// with and its RGB raster.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    /// 1-based position in the stage sequence.
    pub index: usize,
    pub kind: StageKind,
    pub name: String,
    pub description: String,
    pub details: String,
    pub parameters: BTreeMap<String, String>,
    #[serde(skip)]
    pub image: RgbImage,
}

impl StageRecord {
    pub fn new(index: usize, kind: StageKind, details: impl Into<String>, image: RgbImage) -> Self {
        Self {
            index,
            kind,
            name: kind.title().to_string(),
            description: kind.description().to_string(),
            details: details.into(),
            parameters: BTreeMap::new(),
            image,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.parameters.insert(key.to_string(), value.to_string());
        self
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }

    /// File name stem such as `03_segmentation`.
    pub fn file_stem(&self) -> String {
        format!("{:02}_{}", self.index, self.kind.name())
    }
}
