//! Kinetrace HTTP - Uploader for PostgREST-style collectors
//!
//! Ships session registrations and frame batches to two REST endpoints
//! under a configurable base URL:
//! - `POST {base}/rest/v1/motion_sessions` - one row per session
//! - `POST {base}/rest/v1/motion_frames` - one row per sample, batched
//!
//! The uploader satisfies the synchronous [`Uploader`] contract by running
//! a private current-thread tokio runtime and blocking on each request.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info, warn};

use kinetrace_core::codec;
use kinetrace_core::session;
use kinetrace_core::{Sample, SessionConfig, Uploader};

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
/// Whole-request timeout, covering the response body
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Uploader backed by an HTTP client and a private async runtime.
///
/// Every trait method blocks the calling thread until the request settles,
/// so this type must not be driven from inside another async runtime. The
/// pipeline calls it from plain threads.
pub struct HttpUploader {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session_id: String,
    ready: bool,
}

impl HttpUploader {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create uploader runtime")?;

        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            runtime,
            client,
            base_url: String::new(),
            api_key: String::new(),
            session_id: "no_session".to_string(),
            ready: false,
        })
    }

    /// Session registration endpoint for the given collector base URL
    pub fn sessions_url(base: &str) -> String {
        format!("{}/rest/v1/motion_sessions", base.trim_end_matches('/'))
    }

    /// Frame batch endpoint for the given collector base URL
    pub fn frames_url(base: &str) -> String {
        format!("{}/rest/v1/motion_frames", base.trim_end_matches('/'))
    }

    /// POST a JSON body with collector auth headers; true on any 2xx
    fn post_json(&self, url: &str, body: String) -> bool {
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .body(body);

        let response = match self.runtime.block_on(request.send()) {
            Ok(resp) => resp,
            Err(e) => {
                warn!(url = %url, error = %e, "collector request failed");
                return false;
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = %status, "collector accepted request");
            return true;
        }

        match status.as_u16() {
            401 => warn!(url = %url, "collector returned 401 - API key rejected"),
            404 => warn!(url = %url, "collector returned 404 - check base URL and table names"),
            _ => {
                let body = self.runtime.block_on(response.text()).unwrap_or_default();
                warn!(url = %url, status = %status, body = %body, "collector rejected request");
            }
        }
        false
    }
}

impl Uploader for HttpUploader {
    fn initialize(&mut self, config: &SessionConfig) -> bool {
        if self.ready {
            debug!(session = %self.session_id, "uploader already initialized");
            return true;
        }

        self.base_url = config.collector_base_url.trim_end_matches('/').to_string();
        self.api_key = config.api_key.clone();
        self.session_id = session::generate_session_id();
        self.ready = true;

        if config.enable_cloud_upload && self.base_url.is_empty() {
            warn!("collector base URL is empty; uploads will fail");
        }

        info!(session = %self.session_id, "HTTP uploader initialized");
        true
    }

    fn create_session(&mut self, device_description: &str) -> bool {
        if !self.ready {
            return false;
        }

        let url = Self::sessions_url(&self.base_url);
        let payload = codec::session_payload(
            &self.session_id,
            device_description,
            session::epoch_seconds(),
        );

        info!(session = %self.session_id, url = %url, "registering session");
        self.post_json(&url, payload.to_string())
    }

    fn upload_frame_batch(&mut self, samples: &[Sample], filename_hint: &str) -> bool {
        if !self.ready || samples.is_empty() {
            return false;
        }

        let url = Self::frames_url(&self.base_url);
        let body = codec::batch_payload(&self.session_id, samples);
        debug!(
            samples = samples.len(),
            bytes = body.len(),
            file = %filename_hint,
            "uploading frame batch"
        );

        let ok = self.post_json(&url, body);
        if ok {
            info!(samples = samples.len(), file = %filename_hint, "batch accepted");
        }
        ok
    }

    fn shutdown(&mut self) {
        if self.ready {
            info!(session = %self.session_id, "HTTP uploader shut down");
            self.ready = false;
        }
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }
}
