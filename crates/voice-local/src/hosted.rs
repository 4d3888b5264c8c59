//! Hosted speech-to-text over HTTP
//!
//! Captured audio is resampled to 16 kHz, written to a temporary WAV file and
//! posted to a Hugging Face inference endpoint. The endpoint defaults to a
//! Whisper model.

use crate::{Result, Transcriber, TranscriptionConfig, VoiceError};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/openai/whisper-large-v3";
const TARGET_RATE: u32 = 16000;

pub struct HostedTranscriber {
    client: Client,
    endpoint: String,
    token: String,
}

impl HostedTranscriber {
    pub fn new(token: impl Into<String>, endpoint: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VoiceError::Device(format!("http client: {e}")))?;
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        info!("hosted transcription via {endpoint}");
        Ok(Self {
            client,
            endpoint,
            token: token.into(),
        })
    }

    /// `None` when the config carries no token.
    pub fn from_config(cfg: &TranscriptionConfig) -> Option<Result<Self>> {
        let token = cfg.token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some(Self::new(
            token,
            cfg.endpoint.clone(),
            Duration::from_secs(cfg.request_timeout_secs.max(1)),
        ))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn write_wav(&self, path: &std::path::Path, audio: &[f32], sample_rate: u32) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let wav_err = |e: hound::Error| VoiceError::Transcription(format!("wav encode: {e}"));

        let mut writer = hound::WavWriter::create(path, spec).map_err(wav_err)?;
        for &sample in audio {
            let pcm = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            writer.write_sample(pcm).map_err(wav_err)?;
        }
        writer.finalize().map_err(wav_err)?;
        Ok(())
    }
}

impl Transcriber for HostedTranscriber {
    fn transcribe(&self, pcm: &[i16], sample_rate_hz: u32) -> Result<String> {
        let audio: Vec<f32> = pcm.iter().map(|&s| s as f32 / 32768.0).collect();
        let audio = resample_linear(&audio, sample_rate_hz, TARGET_RATE);

        let tmp = tempfile::NamedTempFile::new()?;
        self.write_wav(tmp.path(), &audio, TARGET_RATE)?;
        let bytes = std::fs::read(tmp.path())?;

        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "audio/wav")
            .body(bytes)
            .send()
            .map_err(|e| VoiceError::Transcription(format!("request: {e}")))?;

        if !resp.status().is_success() {
            return Err(VoiceError::Transcription(format!(
                "inference error: {}",
                resp.status()
            )));
        }

        let text = resp
            .text()
            .map_err(|e| VoiceError::Transcription(format!("response: {e}")))?;
        debug!("transcription response: {text}");
        Ok(extract_text(&text))
    }
}

/// Pull `text` out of a JSON reply; fall back to the raw body.
fn extract_text(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(text) = value.get("text").and_then(|t| t.as_str()) {
            return text.trim().to_string();
        }
    }
    body.trim().to_string()
}

/// Simple linear resampling
pub(crate) fn resample_linear(samples: &[f32], sr_in: u32, sr_out: u32) -> Vec<f32> {
    if sr_in == sr_out || samples.is_empty() || sr_in == 0 {
        return samples.to_vec();
    }

    let ratio = sr_out as f64 / sr_in as f64;
    let out_len = (samples.len() as f64 * ratio) as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 / ratio;
        let i0 = (pos.floor() as usize).min(samples.len() - 1);
        let i1 = (i0 + 1).min(samples.len() - 1);
        let t = pos - i0 as f64;
        out.push(samples[i0] * (1.0 - t) as f32 + samples[i1] * t as f32);
    }

    out
}
