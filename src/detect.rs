use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::json;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info};

use crate::config::DetectionConfig;

/// Credential environment variable required by the CLI surface.
pub const CREDENTIAL_ENV: &str = "GOOGLE_API_KEY";

/// One raw time-coded segment from the detection service, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotSpan {
    pub start_offset: f64,
    pub end_offset: f64,
}

/// Remote shot-change detection boundary.
///
/// Given a video locator and a model name, eventually returns the ordered
/// raw segments. Implementations own their transport; the rest of the tool
/// never sees anything but this seam.
#[async_trait]
pub trait ShotAnnotator {
    async fn annotate(&self, uri: &str, model: &str) -> Result<Vec<ShotSpan>>;
}

/// Video Intelligence REST client: submit an annotate request, then poll
/// the returned long-running operation until it completes.
pub struct VideoIntelligenceClient {
    config: DetectionConfig,
    api_key: String,
    client: reqwest::Client,
}

impl VideoIntelligenceClient {
    pub fn new(config: DetectionConfig, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            api_key,
            client,
        }
    }

    async fn submit(&self, uri: &str, model: &str) -> Result<String> {
        let request = json!({
            "inputUri": uri,
            "features": ["SHOT_CHANGE_DETECTION"],
            "videoContext": {
                "shotChangeDetectionConfig": {
                    "model": model,
                },
            },
        });

        let url = format!(
            "{}/v1/videos:annotate?key={}",
            self.config.endpoint, self.api_key
        );
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            bail!("annotation request rejected: {}", error_text);
        }

        let body: serde_json::Value = response.json().await?;
        let operation = body["name"]
            .as_str()
            .ok_or_else(|| anyhow!("annotation response carried no operation name"))?;

        debug!("annotation operation started: {}", operation);
        Ok(operation.to_string())
    }

    /// Block on the long-running operation until done or deadline.
    ///
    /// A single bounded wait: a timeout or a remote failure is fatal and
    /// surfaces to the caller, there is no retry or backoff.
    async fn wait_for_operation(&self, operation: &str) -> Result<serde_json::Value> {
        let deadline = Instant::now() + Duration::from_secs(self.config.operation_timeout_secs);
        let url = format!("{}/v1/{}?key={}", self.config.endpoint, operation, self.api_key);

        loop {
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                let error_text = response.text().await?;
                bail!("operation poll rejected: {}", error_text);
            }

            let body: serde_json::Value = response.json().await?;
            if let Some(error) = body.get("error") {
                bail!("annotation failed remotely: {}", error);
            }
            if body["done"].as_bool().unwrap_or(false) {
                return Ok(body);
            }

            if Instant::now() >= deadline {
                bail!(
                    "annotation did not complete within {} seconds",
                    self.config.operation_timeout_secs
                );
            }
            sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }
    }

    fn parse_spans(body: &serde_json::Value) -> Result<Vec<ShotSpan>> {
        let annotations = body["response"]["annotationResults"][0]["shotAnnotations"]
            .as_array()
            .ok_or_else(|| anyhow!("annotation result carried no shot annotations"))?;

        annotations
            .iter()
            .map(|shot| {
                Ok(ShotSpan {
                    start_offset: parse_offset(&shot["startTimeOffset"])?,
                    end_offset: parse_offset(&shot["endTimeOffset"])?,
                })
            })
            .collect()
    }
}

/// Parse a protobuf Duration JSON value such as `"12.500s"`.
///
/// A zero offset may be omitted entirely, which decodes as 0.
fn parse_offset(value: &serde_json::Value) -> Result<f64> {
    if value.is_null() {
        return Ok(0.0);
    }
    let text = value
        .as_str()
        .ok_or_else(|| anyhow!("unexpected time offset {}", value))?;
    let seconds = text
        .strip_suffix('s')
        .unwrap_or(text)
        .parse()
        .map_err(|_| anyhow!("unparseable time offset '{}'", text))?;
    Ok(seconds)
}

#[async_trait]
impl ShotAnnotator for VideoIntelligenceClient {
    async fn annotate(&self, uri: &str, model: &str) -> Result<Vec<ShotSpan>> {
        let operation = self.submit(uri, model).await?;

        info!("Processing video for shot change annotations...");
        info!("This may take up to 30 minutes, please wait");
        let body = self.wait_for_operation(&operation).await?;

        let spans = Self::parse_spans(&body)?;
        info!("✅ Annotation completed with {} shots", spans.len());
        Ok(spans)
    }
}
