//! Microphone capture with energy-based phrase detection

use crate::{ListenConfig, Result, SpeechInput, Transcriber, Utterance, VoiceError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const CHUNK_SAMPLES: usize = 1024;
const CALIBRATION: Duration = Duration::from_millis(500);

pub struct MicStream {
    _stream: cpal::Stream,
}

pub struct MicConfig {
    pub sample_rate_hz: u32,
    pub channels: u16,
}

pub fn start_default_input_i16() -> Result<(MicStream, MicConfig, Receiver<Vec<i16>>)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| VoiceError::Device("no default input device".into()))?;
    let config = device
        .default_input_config()
        .map_err(|e| VoiceError::Device(format!("input config: {e}")))?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    let (tx, rx) = mpsc::channel::<Vec<i16>>();
    let stream = match config.sample_format() {
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), channels, tx, |s| s),
        cpal::SampleFormat::U16 => {
            build_stream::<u16>(&device, &config.into(), channels, tx, |s| {
                (s as i32 - 32768) as i16
            })
        }
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &config.into(), channels, tx, |s| {
                (s.clamp(-1.0, 1.0) * 32767.0) as i16
            })
        }
        other => {
            return Err(VoiceError::Device(format!(
                "unsupported sample format: {other:?}"
            )))
        }
    }?;
    stream
        .play()
        .map_err(|e| VoiceError::Device(format!("stream play: {e}")))?;
    Ok((
        MicStream { _stream: stream },
        MicConfig {
            sample_rate_hz: sample_rate,
            channels,
        },
        rx,
    ))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: u16,
    tx: Sender<Vec<i16>>,
    convert: fn(T) -> i16,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + Send + 'static,
{
    let channels = channels.max(1) as usize;
    let mut buf = Vec::<i16>::with_capacity(CHUNK_SAMPLES * 2);
    device
        .build_input_stream(
            config,
            move |data: &[T], _| {
                // first channel only
                buf.extend(data.chunks_exact(channels).map(|frame| convert(frame[0])));
                if buf.len() >= CHUNK_SAMPLES {
                    let _ = tx.send(std::mem::take(&mut buf));
                }
            },
            |err| warn!("input stream error: {err}"),
            None,
        )
        .map_err(|e| VoiceError::Device(format!("build input stream: {e}")))
}

/// RMS level of a chunk in 0..1
pub(crate) fn rms(chunk: &[i16]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    let sum: f64 = chunk
        .iter()
        .map(|&s| {
            let v = s as f64 / 32768.0;
            v * v
        })
        .sum();
    (sum / chunk.len() as f64).sqrt() as f32
}

/// Blocking microphone input: waits for speech, records one phrase and hands
/// it to a transcriber.
pub struct MicInput {
    config: ListenConfig,
    transcriber: Box<dyn Transcriber + Send>,
}

impl MicInput {
    pub fn new(config: ListenConfig, transcriber: Box<dyn Transcriber + Send>) -> Self {
        Self {
            config,
            transcriber,
        }
    }

    fn capture_phrase(&self) -> Result<(Vec<i16>, u32)> {
        let (_stream, mic_cfg, rx) = start_default_input_i16()?;
        let threshold = self.calibrate(&rx)?;
        debug!(threshold, "ambient calibration done");

        let listen_deadline =
            Instant::now() + Duration::from_secs_f32(self.config.listen_timeout_secs);
        let mut phrase = Vec::new();
        let mut started: Option<Instant> = None;
        let mut quiet_since: Option<Instant> = None;

        loop {
            let now = Instant::now();
            match started {
                None if now >= listen_deadline => return Err(VoiceError::Timeout),
                Some(t) if now.duration_since(t).as_secs_f32() >= self.config.phrase_limit_secs => {
                    break
                }
                _ => {}
            }

            let chunk = match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(VoiceError::Device("microphone stream ended".into()))
                }
            };
            let loud = rms(&chunk) >= threshold;

            if started.is_none() {
                if !loud {
                    continue;
                }
                info!("speech detected");
                started = Some(now);
            }
            phrase.extend_from_slice(&chunk);

            if loud {
                quiet_since = None;
            } else {
                let since = *quiet_since.get_or_insert(now);
                if now.duration_since(since).as_secs_f32() >= self.config.pause_secs {
                    break;
                }
            }
        }

        Ok((phrase, mic_cfg.sample_rate_hz))
    }

    fn calibrate(&self, rx: &Receiver<Vec<i16>>) -> Result<f32> {
        let end = Instant::now() + CALIBRATION;
        let mut levels = Vec::new();
        while Instant::now() < end {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(chunk) => levels.push(rms(&chunk)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(VoiceError::Device("microphone stream ended".into()))
                }
            }
        }
        let ambient = if levels.is_empty() {
            0.0
        } else {
            levels.iter().sum::<f32>() / levels.len() as f32
        };
        Ok((ambient * 1.5).max(self.config.energy_threshold))
    }
}

impl SpeechInput for MicInput {
    fn listen(&mut self) -> Result<Utterance> {
        info!("Listening...");
        let (pcm, sample_rate) = self.capture_phrase()?;
        info!("Recognizing...");
        let text = self.transcriber.transcribe(&pcm, sample_rate)?;
        if text.trim().is_empty() {
            return Err(VoiceError::Transcription("no words recognized".into()));
        }
        info!("User said: {text}");
        Ok(Utterance::now(text.trim().to_lowercase()))
    }

    fn name(&self) -> &'static str {
        "microphone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_levels() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0; 64]), 0.0);
        let loud = rms(&[16384; 64]);
        assert!((loud - 0.5).abs() < 1e-3);
    }
}
