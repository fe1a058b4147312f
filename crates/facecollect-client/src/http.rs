use std::time::Duration;

use async_trait::async_trait;
use facecollect_core::{
    DetectError, Detector, EncodedImage, FaceRegion, FaceRegistry, FetchError, PersistError,
    Persister, RegisteredFaceSet, Stored, TrainError, TrainedModel, Trainer, TransportError,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::wire::{
    CaptureRequest, CaptureResponse, DetectRequest, DetectResponse, ErrorBody, Outcome,
    RegisteredFacesResponse, TrainResponse,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid base URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Where the backend lives.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the detection/training API.
    pub api_url: String,
    /// Origin serving `/capture_data`.
    pub capture_url: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

/// `reqwest` client for every backend endpoint.
pub struct HttpBackend {
    client: Client,
    api_url: String,
    capture_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_url: normalize_base(&config.api_url)?,
            capture_url: normalize_base(&config.capture_url)?,
        })
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    fn capture_endpoint(&self) -> String {
        format!("{}/capture_data", self.capture_url)
    }

    async fn get(&self, url: &str) -> Result<Response, TransportError> {
        tracing::debug!(url, "GET");
        self.client.get(url).send().await.map_err(transport)
    }

    async fn post<B>(&self, url: &str, body: Option<&B>) -> Result<Response, TransportError>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(url, "POST");
        let request = match body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.post(url).header(CONTENT_TYPE, "application/json"),
        };
        request.send().await.map_err(transport)
    }
}

/// Validate a base URL and strip trailing slashes so endpoint paths join cleanly.
fn normalize_base(url: &str) -> Result<String, ClientError> {
    Url::parse(url).map_err(|e| ClientError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url.trim_end_matches('/').to_string())
}

fn transport(e: reqwest::Error) -> TransportError {
    TransportError::new(e.to_string())
}

/// Decode a 2xx body; any other status is a transport error.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::new(status_message(status, &body)));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| TransportError::new(format!("malformed response: {e}")))
}

/// Decode a body that reports its own outcome.
///
/// A non-2xx status whose body decodes to an unsuccessful outcome is returned
/// as that outcome, so the caller sees the server's error text. Anything else
/// off a non-2xx status is a transport error.
async fn read_outcome<T>(response: Response) -> Result<T, TransportError>
where
    T: DeserializeOwned + Outcome,
{
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    match serde_json::from_str::<T>(&body) {
        Ok(outcome) if status.is_success() || !outcome.succeeded() => Ok(outcome),
        Ok(_) => Err(TransportError::new(status_message(status, &body))),
        Err(e) if status.is_success() => {
            Err(TransportError::new(format!("malformed response: {e}")))
        }
        Err(_) => Err(TransportError::new(status_message(status, &body))),
    }
}

fn status_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(error) }) => format!("HTTP {status}: {error}"),
        _ => format!("HTTP {status}"),
    }
}

#[async_trait]
impl Detector for HttpBackend {
    async fn detect(&self, frame: &EncodedImage) -> Result<Vec<FaceRegion>, DetectError> {
        let url = self.api_endpoint("detect_frame");
        let response = self
            .post(&url, Some(&DetectRequest { image: frame.as_str() }))
            .await?;
        let regions = read_json::<DetectResponse>(response).await?.into_regions()?;
        tracing::debug!(faces = regions.len(), "detection succeeded");
        Ok(regions)
    }
}

#[async_trait]
impl Persister for HttpBackend {
    async fn persist(
        &self,
        frame: &EncodedImage,
        detections: &[FaceRegion],
        label: &str,
    ) -> Result<Stored, PersistError> {
        let url = self.capture_endpoint();
        let body = CaptureRequest {
            image: frame.as_str(),
            detections,
            name: label,
        };
        let response = self.post(&url, Some(&body)).await?;
        read_outcome::<CaptureResponse>(response).await?.into_stored()
    }
}

#[async_trait]
impl Trainer for HttpBackend {
    async fn train(&self) -> Result<TrainedModel, TrainError> {
        let url = self.api_endpoint("train_model");
        let response = self.post::<()>(&url, None).await?;
        read_outcome::<TrainResponse>(response).await?.into_model()
    }
}

#[async_trait]
impl FaceRegistry for HttpBackend {
    async fn fetch(&self) -> Result<RegisteredFaceSet, FetchError> {
        let url = self.api_endpoint("get_registered_faces");
        let response = self.get(&url).await?;
        read_outcome::<RegisteredFacesResponse>(response)
            .await?
            .into_set()
    }
}
