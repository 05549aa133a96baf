//! HEAD-based image existence probe.
//!
//! Upstream records regularly point at images that no longer resolve; a dead
//! poster URL is worse than the fallback. The probe confirms a candidate with
//! a short-timeout HEAD request before the merge accepts it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::sources::ImageProbe;

/// The probe must never stall a batch; image hosts that take longer than
/// this are treated as dead.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe implementation backed by HTTP HEAD requests.
pub struct HeadImageProbe {
    client: reqwest::Client,
}

impl HeadImageProbe {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        Self { client }
    }
}

impl Default for HeadImageProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProbe for HeadImageProbe {
    async fn is_usable(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        match self.client.head(url).send().await {
            Ok(resp) => {
                let is_image = resp
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|ct| ct.starts_with("image/"));
                resp.status() == StatusCode::OK && is_image
            }
            Err(e) => {
                debug!(url, error = %e, "Image probe failed");
                false
            }
        }
    }
}
