use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A face reported by the detection service, in frame pixel coordinates.
///
/// The detector's JSON object is kept as received and is what gets sent back
/// to the storage endpoint, so integer coordinates and fields this client does
/// not know about reach it untouched. The accessors are a read-only view used
/// for drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct FaceRegion {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    name: String,
    confidence: f64,
    raw: Map<String, Value>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaceRegionError {
    #[error("face region has no numeric `{0}`")]
    MissingCoordinate(&'static str),
}

impl FaceRegion {
    /// Build a region from typed values, as a detector would report it.
    pub fn new(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        name: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let name = name.into();
        let mut raw = Map::new();
        raw.insert("xmin".into(), Value::from(xmin));
        raw.insert("ymin".into(), Value::from(ymin));
        raw.insert("xmax".into(), Value::from(xmax));
        raw.insert("ymax".into(), Value::from(ymax));
        raw.insert("name".into(), Value::from(name.clone()));
        raw.insert("confidence".into(), Value::from(confidence));
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            name,
            confidence,
            raw,
        }
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Recognized label, or empty when the backend sent none (or `null`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recognition confidence in [0, 1]; 0 when absent.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// The object exactly as the detector sent it.
    pub fn as_json(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl TryFrom<Map<String, Value>> for FaceRegion {
    type Error = FaceRegionError;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let coord = |key: &'static str| {
            raw.get(key)
                .and_then(Value::as_f64)
                .ok_or(FaceRegionError::MissingCoordinate(key))
        };
        let xmin = coord("xmin")?;
        let ymin = coord("ymin")?;
        let xmax = coord("xmax")?;
        let ymax = coord("ymax")?;
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let confidence = raw.get("confidence").and_then(Value::as_f64).unwrap_or(0.0);
        Ok(Self {
            xmin,
            ymin,
            xmax,
            ymax,
            name,
            confidence,
            raw,
        })
    }
}

impl From<FaceRegion> for Map<String, Value> {
    fn from(region: FaceRegion) -> Self {
        region.raw
    }
}

/// A still frame as JPEG, base64-encoded without a data-URL prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap an already base64-encoded JPEG.
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the base64 text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of one orchestrated detect → persist step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detections_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResult {
    pub fn stored(filename: impl Into<String>, detections_count: usize) -> Self {
        Self {
            success: true,
            filename: Some(filename.into()),
            detections_count: Some(detections_count),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            filename: None,
            detections_count: None,
            error: Some(error.into()),
        }
    }
}

/// A frame accepted by the storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored {
    pub filename: String,
}

/// A model produced by the training endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedModel {
    pub model_path: String,
}

/// Network-level failure: connection error, non-2xx status or malformed body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
