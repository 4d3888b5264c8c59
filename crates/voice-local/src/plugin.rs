#[cfg(feature = "mock")]
use crate::ScriptedInput;
use crate::{ConsoleInput, ListenConfig, SpeechInput, TranscriptionConfig};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputBackendKind {
    /// Typed commands on stdin
    Console,
    /// Empty script; useful for wiring checks
    Mock,
    /// Default microphone with hosted transcription
    Microphone,
}

pub fn new_input_backend(
    kind: InputBackendKind,
    cfg: ListenConfig,
    transcription: &TranscriptionConfig,
) -> Result<Box<dyn SpeechInput>, String> {
    match kind {
        InputBackendKind::Console => Ok(Box::new(ConsoleInput::stdin())),
        InputBackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                let _ = cfg;
                Ok(Box::new(ScriptedInput::new([])))
            }
            #[cfg(not(feature = "mock"))]
            {
                let _ = cfg;
                Err("mock feature not enabled".into())
            }
        }
        InputBackendKind::Microphone => {
            #[cfg(feature = "audio")]
            {
                match crate::HostedTranscriber::from_config(transcription) {
                    Some(Ok(transcriber)) => {
                        Ok(Box::new(crate::MicInput::new(cfg, Box::new(transcriber))))
                    }
                    Some(Err(e)) => Err(e.to_string()),
                    None => Err("microphone input needs HUGGINGFACEHUB_API_TOKEN for transcription".into()),
                }
            }
            #[cfg(not(feature = "audio"))]
            {
                let _ = (cfg, transcription);
                Err("audio feature not enabled".into())
            }
        }
    }
}
