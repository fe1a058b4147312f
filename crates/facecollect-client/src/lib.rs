//! facecollect-client — HTTP implementations of the backend ports.
//!
//! Speaks the JSON protocol of the face detection/training service. The
//! capture endpoint may live on a different origin than the rest of the API.

pub mod http;
pub mod wire;

pub use http::{BackendConfig, ClientError, HttpBackend};
