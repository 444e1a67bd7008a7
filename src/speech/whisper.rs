use crate::error::{CallError, MultiTranslateError, Result};
use crate::speech::SpeechRecognizer;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// OpenAI transcription endpoint.
const WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Maximum file size for Whisper API (25 MB).
const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Maximum retries for API calls.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// Recognises speech in a finished WAV recording with OpenAI Whisper.
pub struct WhisperRecognizer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    recording: PathBuf,
    language: Option<String>,
    max_retries: u32,
}

impl WhisperRecognizer {
    pub fn new(api_key: String, recording: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: WHISPER_API_URL.to_string(),
            recording: recording.into(),
            language: None,
            max_retries: MAX_RETRIES,
        }
    }

    /// Hint the spoken language (ISO 639-1 code).
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn build_form(&self, bytes: Vec<u8>) -> Result<Form> {
        let file_name = self
            .recording
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording.wav")
            .to_string();

        let file_part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", "whisper-1")
            .text("response_format", "json");

        if let Some(ref lang) = self.language {
            form = form.text("language", lang.clone());
        }

        Ok(form)
    }

    async fn call_api(&self, form: Form) -> std::result::Result<String, CallError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CallError::Transient(e.into()))?;

        let status = response.status();
        debug!("Whisper API response status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| CallError::Transient(e.into()))?;
        if status.is_success() {
            let parsed: TranscriptionResponse =
                serde_json::from_str(&body).map_err(|e| CallError::Fatal(e.into()))?;
            return Ok(parsed.text);
        }

        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        let err = MultiTranslateError::Api(format!("Whisper API error ({}): {}", status, message));
        Err(CallError::from_status(status, err))
    }
}

/// Check the recording is a readable WAV with at least one sample.
fn inspect_recording(path: &Path) -> Result<Duration> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let frames = reader.duration();
    if spec.sample_rate == 0 {
        return Err(MultiTranslateError::Speech(
            "recording has a sample rate of 0".to_string(),
        ));
    }
    if frames == 0 {
        return Err(MultiTranslateError::Speech(
            "recording contains no audio".to_string(),
        ));
    }
    Ok(Duration::from_secs_f64(
        frames as f64 / spec.sample_rate as f64,
    ))
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    async fn recognize(&self) -> Result<String> {
        if !self.recording.exists() {
            return Err(MultiTranslateError::FileNotFound(
                self.recording.display().to_string(),
            ));
        }

        let metadata = fs::metadata(&self.recording).await?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(MultiTranslateError::Speech(format!(
                "Recording too large for Whisper API: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        let duration = inspect_recording(&self.recording)?;
        debug!(
            "Recognising {:.1}s of audio from {:?}",
            duration.as_secs_f64(),
            self.recording
        );

        let bytes = fs::read(&self.recording).await?;
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            // multipart forms are consumed by send, rebuild each attempt
            let form = self.build_form(bytes.clone())?;

            match self.call_api(form).await {
                Ok(text) => return Ok(text),
                Err(CallError::Fatal(e)) => return Err(e),
                Err(CallError::Transient(e)) => {
                    warn!("Attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MultiTranslateError::Api("Unknown error".to_string())))
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}
