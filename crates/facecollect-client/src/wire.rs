//! JSON request/response bodies and how each response maps to a result.

use facecollect_core::{
    DetectError, FaceRegion, FetchError, PersistError, RegisteredFaceSet, Stored, TrainError,
    TrainedModel, TransportError,
};
use serde::{Deserialize, Serialize};

/// Used when a failure response carries no `error` text.
const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Serialize)]
pub struct DetectRequest<'a> {
    pub image: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct DetectResponse {
    /// Absent on most detection responses; only an explicit `false` counts.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub faces: Option<Vec<FaceRegion>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CaptureRequest<'a> {
    pub image: &'a str,
    pub detections: &'a [FaceRegion],
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CaptureResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrainResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisteredFacesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub class_name_to_id: Option<RegisteredFaceSet>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a non-2xx response, when the server bothered to send one.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// A response body that states whether the operation succeeded.
///
/// Backends report business failures with an error status and such a body,
/// so these are decoded regardless of the HTTP status.
pub trait Outcome {
    fn succeeded(&self) -> bool;
}

impl Outcome for CaptureResponse {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl Outcome for TrainResponse {
    fn succeeded(&self) -> bool {
        self.success
    }
}

impl Outcome for RegisteredFacesResponse {
    fn succeeded(&self) -> bool {
        self.success
    }
}

fn error_text(error: Option<String>) -> String {
    error.unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

impl DetectResponse {
    pub fn into_regions(self) -> Result<Vec<FaceRegion>, DetectError> {
        if self.success == Some(false) {
            return Err(DetectError::Rejected(error_text(self.error)));
        }
        match self.faces {
            Some(faces) if !faces.is_empty() => Ok(faces),
            _ => Err(DetectError::NoFaceDetected),
        }
    }
}

impl CaptureResponse {
    pub fn into_stored(self) -> Result<Stored, PersistError> {
        if !self.success {
            return Err(PersistError::Rejected(error_text(self.error)));
        }
        let filename = self.filename.ok_or_else(|| {
            TransportError::new("malformed response: success without filename")
        })?;
        Ok(Stored { filename })
    }
}

impl TrainResponse {
    pub fn into_model(self) -> Result<TrainedModel, TrainError> {
        if !self.success {
            return Err(TrainError::Failed(error_text(self.error)));
        }
        let model_path = self.model_path.ok_or_else(|| {
            TransportError::new("malformed response: success without model_path")
        })?;
        Ok(TrainedModel { model_path })
    }
}

impl RegisteredFacesResponse {
    pub fn into_set(self) -> Result<RegisteredFaceSet, FetchError> {
        if !self.success {
            return Err(FetchError::Failed(error_text(self.error)));
        }
        Ok(self.class_name_to_id.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_detect_faces_present() {
        let resp: DetectResponse = parse(
            r#"{"faces": [{"xmin": 10, "ymin": 20, "xmax": 110, "ymax": 140, "name": "ann", "confidence": 0.93}]}"#,
        );
        let regions = resp.into_regions().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name(), "ann");
    }

    #[test]
    fn test_detect_empty_faces_is_no_face() {
        let resp: DetectResponse = parse(r#"{"faces": []}"#);
        assert_eq!(resp.into_regions().unwrap_err(), DetectError::NoFaceDetected);
    }

    #[test]
    fn test_detect_absent_faces_is_no_face() {
        let resp: DetectResponse = parse(r#"{"success": true}"#);
        assert_eq!(resp.into_regions().unwrap_err(), DetectError::NoFaceDetected);
    }

    #[test]
    fn test_detect_explicit_failure() {
        let resp: DetectResponse = parse(r#"{"success": false, "error": "bad image"}"#);
        assert_eq!(
            resp.into_regions().unwrap_err(),
            DetectError::Rejected("bad image".into())
        );
    }

    #[test]
    fn test_detect_failure_wins_over_faces() {
        let resp: DetectResponse = parse(
            r#"{"success": false, "faces": [{"xmin": 0, "ymin": 0, "xmax": 1, "ymax": 1}]}"#,
        );
        assert_eq!(
            resp.into_regions().unwrap_err(),
            DetectError::Rejected("unknown error".into())
        );
    }

    #[test]
    fn test_capture_request_shape() {
        let detections = vec![FaceRegion::new(1.0, 2.0, 3.0, 4.0, "ann", 0.5)];
        let body = serde_json::to_value(CaptureRequest {
            image: "abc=",
            detections: &detections,
            name: "ann",
        })
        .unwrap();
        assert_eq!(body["image"], "abc=");
        assert_eq!(body["name"], "ann");
        assert_eq!(body["detections"][0]["xmax"], 3.0);
        assert_eq!(body["detections"][0]["confidence"], 0.5);
    }

    #[test]
    fn test_detections_forwarded_unchanged_to_capture() {
        let resp: DetectResponse = parse(
            r#"{"faces": [{"xmin": 10, "ymin": 20, "xmax": 110, "ymax": 140, "name": "ann", "confidence": 0.93, "class_id": 3}]}"#,
        );
        let detections = resp.into_regions().unwrap();
        let body = serde_json::to_value(CaptureRequest {
            image: "abc=",
            detections: &detections,
            name: "ann",
        })
        .unwrap();
        assert_eq!(
            body["detections"][0],
            serde_json::json!({
                "xmin": 10, "ymin": 20, "xmax": 110, "ymax": 140,
                "name": "ann", "confidence": 0.93, "class_id": 3
            })
        );
        assert!(body["detections"][0]["xmin"].is_u64());
    }

    #[test]
    fn test_detect_null_name_is_not_a_decode_error() {
        let resp: DetectResponse = parse(
            r#"{"faces": [{"xmin": 0, "ymin": 0, "xmax": 5, "ymax": 5, "name": null, "confidence": null}]}"#,
        );
        let regions = resp.into_regions().unwrap();
        assert_eq!(regions[0].name(), "");
        assert!(regions[0].as_json()["name"].is_null());
    }

    #[test]
    fn test_detect_request_shape() {
        let body = serde_json::to_string(&DetectRequest { image: "abc=" }).unwrap();
        assert_eq!(body, r#"{"image":"abc="}"#);
    }

    #[test]
    fn test_capture_success() {
        let resp: CaptureResponse = parse(r#"{"success": true, "filename": "ann_17.jpg"}"#);
        assert_eq!(resp.into_stored().unwrap().filename, "ann_17.jpg");
    }

    #[test]
    fn test_capture_failure_is_verbatim() {
        let resp: CaptureResponse =
            parse(r#"{"success": false, "error": "Could not save image: disk full"}"#);
        assert_eq!(
            resp.into_stored().unwrap_err().to_string(),
            "Could not save image: disk full"
        );
    }

    #[test]
    fn test_capture_success_without_filename_is_transport() {
        let resp: CaptureResponse = parse(r#"{"success": true}"#);
        assert!(matches!(
            resp.into_stored().unwrap_err(),
            PersistError::Transport(_)
        ));
    }

    #[test]
    fn test_train_outcomes() {
        let ok: TrainResponse = parse(r#"{"success": true, "model_path": "models/best.pt"}"#);
        assert_eq!(ok.into_model().unwrap().model_path, "models/best.pt");

        let failed: TrainResponse = parse(r#"{"success": false, "error": "no data"}"#);
        assert_eq!(
            failed.into_model().unwrap_err(),
            TrainError::Failed("no data".into())
        );
    }

    #[test]
    fn test_registered_faces_outcomes() {
        let ok: RegisteredFacesResponse =
            parse(r#"{"success": true, "class_name_to_id": {"bob": 2, "ann": 0, "cy": 1}}"#);
        assert_eq!(ok.into_set().unwrap().render(), "ann, cy, bob");

        let empty: RegisteredFacesResponse = parse(r#"{"success": true}"#);
        assert!(empty.into_set().unwrap().is_empty());

        let failed: RegisteredFacesResponse = parse(r#"{"success": false}"#);
        assert_eq!(
            failed.into_set().unwrap_err(),
            FetchError::Failed("unknown error".into())
        );
    }
}
