use crate::{Result, Speaker, SpeechInput, Utterance, VoiceError};
use std::io::{self, BufRead, Write};

/// Typed input, one command per line. End of input closes the source.
pub struct ConsoleInput<R = io::StdinLock<'static>> {
    reader: R,
    prompt: Option<String>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> ConsoleInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            prompt: Some("You: ".to_string()),
        }
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }
}

impl<R: BufRead> SpeechInput for ConsoleInput<R> {
    fn listen(&mut self) -> Result<Utterance> {
        if let Some(prompt) = &self.prompt {
            let mut stdout = io::stdout();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(VoiceError::Closed);
        }
        Ok(Utterance::now(line.trim()))
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Prints replies instead of synthesizing them.
pub struct ConsoleSpeaker<W = io::Stdout> {
    out: W,
    label: String,
}

impl ConsoleSpeaker {
    pub fn stdout(assistant_name: &str) -> Self {
        Self::new(io::stdout(), assistant_name)
    }
}

impl<W: Write> ConsoleSpeaker<W> {
    pub fn new(out: W, assistant_name: &str) -> Self {
        let mut label = assistant_name.to_string();
        if let Some(first) = label.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        Self { out, label }
    }
}

impl<W: Write> Speaker for ConsoleSpeaker<W> {
    fn speak(&mut self, text: &str) -> Result<()> {
        tracing::debug!(text, "speak");
        writeln!(self.out, "{}: {}", self.label, text)?;
        self.out.flush()?;
        Ok(())
    }

    fn status(&mut self, text: &str) {
        tracing::debug!(text, "status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_console_input_reads_lines_until_eof() {
        let mut input = ConsoleInput::new(Cursor::new("open notepad\n  news  \n")).with_prompt(None);
        assert_eq!(input.listen().unwrap().text, "open notepad");
        assert_eq!(input.listen().unwrap().text, "news");
        assert!(matches!(input.listen(), Err(VoiceError::Closed)));
    }

    #[test]
    fn test_blank_line_is_empty_utterance() {
        let mut input = ConsoleInput::new(Cursor::new("\n")).with_prompt(None);
        assert_eq!(input.listen().unwrap().text, "");
    }

    #[test]
    fn test_console_speaker_labels_lines() {
        let mut buf = Vec::new();
        {
            let mut speaker = ConsoleSpeaker::new(&mut buf, "jarvis");
            speaker.speak("Opening notepad").unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "Jarvis: Opening notepad\n");
    }
}
