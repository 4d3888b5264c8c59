use crate::{Result, Utterance};

/// Source of user commands. `listen` blocks until one utterance is captured
/// or the source gives up; it is the session's only suspension point.
pub trait SpeechInput {
    fn listen(&mut self) -> Result<Utterance>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Sink for assistant replies.
pub trait Speaker {
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Transient status such as "Listening..." that is shown, not spoken.
    fn status(&mut self, _text: &str) {}
}

/// Turns captured mono PCM into text.
pub trait Transcriber {
    fn transcribe(&self, pcm: &[i16], sample_rate_hz: u32) -> Result<String>;
}
