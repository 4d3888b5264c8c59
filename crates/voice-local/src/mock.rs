use crate::{Result, Speaker, SpeechInput, Utterance, VoiceError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted listen result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Say(String),
    Timeout,
    Unintelligible,
}

/// Input that replays a fixed script, then reports `Closed`.
pub struct ScriptedInput {
    script: VecDeque<ScriptStep>,
}

impl ScriptedInput {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            script: steps.into_iter().collect(),
        }
    }

    /// Script made only of spoken lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| ScriptStep::Say(l.into())))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SpeechInput for ScriptedInput {
    fn listen(&mut self) -> Result<Utterance> {
        match self.script.pop_front() {
            Some(ScriptStep::Say(text)) => Ok(Utterance::now(text)),
            Some(ScriptStep::Timeout) => Err(VoiceError::Timeout),
            Some(ScriptStep::Unintelligible) => {
                Err(VoiceError::Transcription("unintelligible audio".into()))
            }
            None => Err(VoiceError::Closed),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Speaker that keeps everything it was asked to say.
#[derive(Clone, Default)]
pub struct RecordingSpeaker {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, shared with clones of this speaker
    pub fn spoken(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&mut self, text: &str) -> Result<()> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(text.to_string());
        }
        Ok(())
    }
}
