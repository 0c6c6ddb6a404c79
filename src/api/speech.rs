use super::client::{to_json_body, ApiClient, RequestOptions};
use super::error::ApiError;
use super::types::{SpeechRequest, Transcription};
use crate::config::{ALLOWED_AUDIO_SUFFIXES, MAX_AUDIO_BYTES, MAX_TTS_CHARS};

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// An audio clip to transcribe.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub filename: String,
    pub data: Bytes,
}

impl AudioUpload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Read an audio file from disk.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.m4a")
            .to_string();
        Ok(Self::new(filename, data))
    }

    fn suffix(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("m4a")
            .to_ascii_lowercase()
    }

    /// Check size and format before uploading.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.data.len() > MAX_AUDIO_BYTES {
            return Err(ApiError::precondition("Audio file exceeds 10MB limit."));
        }
        let suffix = self.suffix();
        if !ALLOWED_AUDIO_SUFFIXES.contains(&suffix.as_str()) {
            return Err(ApiError::precondition(format!(
                "Unsupported audio format: .{suffix}"
            )));
        }
        Ok(())
    }

    fn mime_type(&self) -> &'static str {
        match self.suffix().as_str() {
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "ogg" => "audio/ogg",
            _ => "audio/mp4",
        }
    }
}

impl ApiClient {
    /// Transcribe an audio clip.
    pub async fn speech_to_text(
        &self,
        audio: &AudioUpload,
        language: Option<&str>,
    ) -> Result<Transcription, ApiError> {
        self.require_api_key()?;
        audio.validate()?;

        let part = Part::bytes(audio.data.to_vec())
            .file_name(audio.filename.clone())
            .mime_str(audio.mime_type())
            .map_err(|e| ApiError::precondition(format!("Invalid audio type: {e}")))?;
        let form = Form::new().part("file", part);

        let mut options = RequestOptions::post().multipart(form);
        if let Some(language) = language {
            options = options.query("language", language);
        }
        self.request_json("/stt", options).await
    }

    /// Synthesize speech; returns MP3 audio.
    pub async fn text_to_speech(&self, text: &str, language: &str) -> Result<Bytes, ApiError> {
        self.require_api_key()?;
        let length = text.chars().count();
        if length == 0 || length > MAX_TTS_CHARS {
            return Err(ApiError::precondition(format!(
                "Text must be between 1 and {MAX_TTS_CHARS} characters"
            )));
        }

        let body = to_json_body(&SpeechRequest {
            text: text.to_string(),
            language: language.to_string(),
        })?;
        self.request_bytes("/tts", RequestOptions::post().json(body))
            .await
    }
}
