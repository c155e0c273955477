use crate::draw::annotations::{RecognitionResult, VariableTable};
use crate::draw::buffer::PixelBuffer;
use crate::draw::settings::SurfaceSettings;
use anyhow::{anyhow, Context, Result};
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CALCULATE_ROUTE: &str = "/calculate";
const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizeRequest {
    /// Whole canvas as a PNG data URL.
    pub image: String,
    pub variables: VariableTable,
}

pub trait Recognizer: Send + Sync {
    fn recognize(&self, request: &RecognizeRequest) -> Result<Vec<RecognitionResult>>;
}

pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            buffer.pixels(),
            buffer.width(),
            buffer.height(),
            ColorType::Rgba8,
        )
        .with_context(|| {
            format!(
                "encode {}x{} canvas as png",
                buffer.width(),
                buffer.height()
            )
        })?;
    Ok(bytes)
}

pub fn encode_png_data_url(buffer: &PixelBuffer) -> Result<String> {
    let png = encode_png(buffer)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png);
    Ok(format!("{PNG_DATA_URL_PREFIX}{encoded}"))
}

#[derive(Serialize)]
struct CalculateBody<'a> {
    image: &'a str,
    dict_of_vars: &'a VariableTable,
}

#[derive(Deserialize)]
struct CalculateResponse {
    #[serde(default)]
    data: Vec<RecognitionResult>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes a `/calculate` response body. The service reports failures with
/// `status: "error"` on an otherwise successful HTTP response.
pub fn parse_response(body: &str) -> Result<Vec<RecognitionResult>> {
    let response: CalculateResponse =
        serde_json::from_str(body).context("deserialize recognizer response")?;
    if response.status.as_deref() == Some("error") {
        let reason = response
            .error
            .unwrap_or_else(|| "no error detail".to_string());
        return Err(anyhow!("recognizer reported an error: {reason}"));
    }
    Ok(response.data)
}

pub struct HttpRecognizer {
    client: Client,
    endpoint: String,
}

impl HttpRecognizer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("sketch-calc recognizer client")
            .build()
            .context("build recognizer http client")?;
        Ok(Self {
            client,
            endpoint: format!("{}{CALCULATE_ROUTE}", base_url.trim_end_matches('/')),
        })
    }

    pub fn from_settings(settings: &SurfaceSettings) -> Result<Self> {
        Self::new(
            &settings.recognizer_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Recognizer for HttpRecognizer {
    fn recognize(&self, request: &RecognizeRequest) -> Result<Vec<RecognitionResult>> {
        let body = serde_json::to_string(&CalculateBody {
            image: &request.image,
            dict_of_vars: &request.variables,
        })
        .context("serialize recognizer request")?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .with_context(|| format!("post canvas to {}", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("recognizer at {} rejected the request", self.endpoint))?;
        let text = response.text().context("read recognizer response body")?;
        parse_response(&text)
    }
}
