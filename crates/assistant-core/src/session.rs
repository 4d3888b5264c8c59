//! The call-and-response loop
//!
//! One cycle moves through `Idle -> Listening -> Transcribing -> Dispatching
//! -> Responding -> Idle`. `Listening` is the only place the session blocks,
//! and it spans one [`SpeechInput::listen`] call, which captures and
//! transcribes together. `Transcribing` is entered once that call returns and
//! covers turning its result into a transcript or an input error.
//! Continuous listening ends on silence, on the stop phrase, or on an internal
//! error; every other failure is spoken and the loop carries on. A typed
//! command is one cycle and always goes back to idle.

use crate::config::Settings;
use crate::dispatcher::{Conversation, Dispatcher, Response};
use crate::error::{AssistantError, Result};
use crate::services::Services;
use contact_store::ContactStore;
use intent_parser::{Intent, IntentParser};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use voice_local::{Speaker, SpeechInput};

const STOP_REPLY: &str = "Okay, I will stop listening.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Listening,
    Transcribing,
    Dispatching,
    Responding,
}

/// What the caller should do after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Control {
    Continue,
    ReturnToIdle,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleOutcome {
    /// Normalized transcript, absent on silence
    pub transcript: Option<String>,
    pub intent: Option<Intent>,
    pub response: Option<Response>,
    pub control: Control,
}

impl CycleOutcome {
    fn idle() -> Self {
        Self {
            transcript: None,
            intent: None,
            response: None,
            control: Control::ReturnToIdle,
        }
    }
}

/// Input and output channels; also answers the dispatcher's follow-up
/// questions.
struct VoiceIo {
    input: Box<dyn SpeechInput>,
    speaker: Box<dyn Speaker>,
}

impl VoiceIo {
    /// Speak every line. `false` if the speaker failed.
    fn respond(&mut self, response: &Response) -> bool {
        for line in &response.lines {
            if let Err(e) = self.speaker.speak(line) {
                error!("speaker failed: {e}");
                return false;
            }
        }
        true
    }
}

impl Conversation for VoiceIo {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.speaker.speak(question)?;
        self.speaker.status("Listening...");
        let utterance = self.input.listen()?;
        debug!(answer = %utterance.text, "follow-up answer");
        Ok(utterance.text.trim().to_lowercase())
    }
}

pub struct Session {
    parser: IntentParser,
    dispatcher: Dispatcher,
    io: VoiceIo,
    state: SessionState,
}

impl Session {
    pub fn new(
        parser: IntentParser,
        dispatcher: Dispatcher,
        input: Box<dyn SpeechInput>,
        speaker: Box<dyn Speaker>,
    ) -> Self {
        Self {
            parser,
            dispatcher,
            io: VoiceIo { input, speaker },
            state: SessionState::Idle,
        }
    }

    /// Open the store and real services described by `settings`.
    pub fn open(
        settings: Settings,
        input: Box<dyn SpeechInput>,
        speaker: Box<dyn Speaker>,
    ) -> Result<Self> {
        let parser = IntentParser::new(settings.intent_config())
            .map_err(|e| AssistantError::Internal(e.to_string()))?;
        let path = settings.resolve_database_path()?;
        let store = ContactStore::open(&path)?;
        info!("database: {}", path.display());
        let services = Services::from_settings(&settings)
            .map_err(|e| AssistantError::Internal(format!("service setup: {e}")))?;
        info!(input = input.name(), "session ready");
        Ok(Self::new(
            parser,
            Dispatcher::new(settings, store, services),
            input,
            speaker,
        ))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn greet(&mut self) -> bool {
        let name = capitalize(&self.dispatcher.settings().assistant_name);
        self.io
            .respond(&Response::ok(format!("Hello, I am {name}. How can I help you?")))
    }

    /// Listen and handle commands until a cycle asks to return to idle.
    /// Returns the number of cycles run.
    pub fn run_continuous(&mut self) -> usize {
        let mut cycles = 0;
        loop {
            let outcome = self.listen_once();
            cycles += 1;
            if outcome.control == Control::ReturnToIdle {
                info!(cycles, "continuous listening ended");
                return cycles;
            }
        }
    }

    /// One voice cycle.
    pub fn listen_once(&mut self) -> CycleOutcome {
        self.transition(SessionState::Listening);
        self.io.speaker.status("Listening...");
        // blocks for capture and transcription both
        let heard = self.io.input.listen();

        self.transition(SessionState::Transcribing);
        let text = match heard.map_err(AssistantError::from) {
            Ok(utterance) => utterance.text.trim().to_lowercase(),
            Err(AssistantError::InputTimeout) => {
                info!("no speech captured");
                return self.finish(CycleOutcome::idle());
            }
            Err(err @ AssistantError::TranscriptionFailure(_)) => {
                warn!("{err}");
                let response = Response::failed(err.apology());
                return self.reply(None, None, response, Control::Continue);
            }
            Err(err) => {
                error!("input failed: {err}");
                return self.finish(CycleOutcome::idle());
            }
        };

        if text.is_empty() {
            info!("empty transcript");
            return self.finish(CycleOutcome::idle());
        }
        info!("User said: {text}");
        self.handle(text)
    }

    /// One typed command. Text mode never keeps listening afterwards, so
    /// the outcome always returns to idle.
    pub fn submit_text(&mut self, text: &str) -> CycleOutcome {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            info!("Empty message received");
            return CycleOutcome::idle();
        }
        CycleOutcome {
            control: Control::ReturnToIdle,
            ..self.handle(text)
        }
    }

    /// Release the store.
    pub fn close(self) -> Result<()> {
        self.dispatcher.close()?;
        debug!("session closed");
        Ok(())
    }

    fn handle(&mut self, text: String) -> CycleOutcome {
        if self.parser.is_stop_phrase(&text) {
            let response = Response::ok(STOP_REPLY);
            return self.reply(Some(text), None, response, Control::ReturnToIdle);
        }

        self.transition(SessionState::Dispatching);
        let parsed = self.parser.parse(&text);
        info!(intent = %parsed.intent, rule = parsed.rule, "classified");

        match self.dispatcher.dispatch(parsed.intent.clone(), &mut self.io) {
            Ok(response) => {
                self.reply(Some(text), Some(parsed.intent), response, Control::Continue)
            }
            Err(err) => {
                error!("command failed: {err}");
                let response = Response::failed(err.apology());
                self.reply(
                    Some(text),
                    Some(parsed.intent),
                    response,
                    Control::ReturnToIdle,
                )
            }
        }
    }

    fn reply(
        &mut self,
        transcript: Option<String>,
        intent: Option<Intent>,
        response: Response,
        control: Control,
    ) -> CycleOutcome {
        self.transition(SessionState::Responding);
        let spoken = self.io.respond(&response);
        self.finish(CycleOutcome {
            transcript,
            intent,
            response: Some(response),
            control: if spoken { control } else { Control::ReturnToIdle },
        })
    }

    fn finish(&mut self, outcome: CycleOutcome) -> CycleOutcome {
        self.transition(SessionState::Idle);
        outcome
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKeys;
    use crate::testing::{services, Handles};
    use voice_local::{RecordingSpeaker, ScriptStep, ScriptedInput};

    fn session(steps: Vec<ScriptStep>, keys: ApiKeys) -> (Session, RecordingSpeaker, Handles) {
        let settings = Settings {
            keys,
            ..Settings::default()
        };
        let store = ContactStore::open_in_memory().unwrap();
        store.insert_contact("Mom", "9876543210", None).unwrap();
        let (services, handles) = services();
        let parser = IntentParser::new(settings.intent_config()).unwrap();
        let speaker = RecordingSpeaker::new();
        let session = Session::new(
            parser,
            Dispatcher::new(settings, store, services),
            Box::new(ScriptedInput::new(steps)),
            Box::new(speaker.clone()),
        );
        (session, speaker, handles)
    }

    fn say(text: &str) -> ScriptStep {
        ScriptStep::Say(text.to_string())
    }

    #[test]
    fn test_silence_ends_loop_without_classifying() {
        let (mut s, speaker, _) = session(vec![ScriptStep::Timeout], ApiKeys::default());
        let outcome = s.listen_once();
        assert_eq!(outcome.control, Control::ReturnToIdle);
        assert!(outcome.intent.is_none());
        assert!(speaker.spoken().is_empty());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_empty_transcript_is_silence() {
        let (mut s, _, _) = session(vec![say("   ")], ApiKeys::default());
        let outcome = s.listen_once();
        assert_eq!(outcome.control, Control::ReturnToIdle);
        assert!(outcome.transcript.is_none());
    }

    #[test]
    fn test_continuous_runs_until_silence() {
        let (mut s, speaker, handles) = session(
            vec![
                say("Open Notepad"),
                ScriptStep::Unintelligible,
                say("asdkjasd"),
                ScriptStep::Timeout,
                say("never reached"),
            ],
            ApiKeys::default(),
        );
        assert_eq!(s.run_continuous(), 4);
        assert_eq!(handles.launcher.launched(), ["notepad"]);
        let spoken = speaker.spoken();
        assert_eq!(spoken.len(), 3);
        assert_eq!(spoken[1], "Sorry, I couldn't understand that");
        assert_eq!(spoken[2], "I'm not sure how to handle: asdkjasd");
    }

    #[test]
    fn test_stop_phrase() {
        let (mut s, speaker, _) = session(
            vec![say("jarvis stop listening"), say("open notepad")],
            ApiKeys::default(),
        );
        assert_eq!(s.run_continuous(), 1);
        assert_eq!(speaker.spoken(), [STOP_REPLY]);
    }

    #[test]
    fn test_contact_action_asks_through_input() {
        let (mut s, speaker, handles) = session(
            vec![say("send message to mom"), say("whatsapp"), say("see you soon")],
            ApiKeys::default(),
        );
        let outcome = s.listen_once();
        assert_eq!(outcome.control, Control::Continue);
        assert!(matches!(outcome.intent, Some(Intent::ContactAction { .. })));
        assert_eq!(
            handles.launcher.launched(),
            ["https://web.whatsapp.com/send?phone=919876543210&text=see%20you%20soon"]
        );
        let spoken = speaker.spoken();
        assert_eq!(spoken[0], crate::contact_flow::CHANNEL_PROMPT);
        assert_eq!(spoken[1], crate::contact_flow::BODY_PROMPT);
        assert!(spoken[2].starts_with("WhatsApp opened for Mom"));
    }

    #[test]
    fn test_submit_text() {
        let (mut s, speaker, _) = session(Vec::new(), ApiKeys::default());
        let outcome = s.submit_text("weather in Paris");
        assert_eq!(outcome.control, Control::ReturnToIdle);
        assert_eq!(
            outcome.intent,
            Some(Intent::Weather {
                city: Some("paris".into())
            })
        );
        let response = outcome.response.unwrap();
        assert!(!response.handled);
        assert!(response.text().contains("not configured"));
        assert_eq!(speaker.spoken().len(), 1);

        let outcome = s.submit_text("");
        assert_eq!(outcome.control, Control::ReturnToIdle);
        assert!(outcome.intent.is_none());
    }

    #[test]
    fn test_submit_text_returns_to_idle_when_handled() {
        let (mut s, speaker, handles) = session(Vec::new(), ApiKeys::default());
        let outcome = s.submit_text("open notepad");
        assert!(outcome.response.as_ref().unwrap().handled);
        assert_eq!(outcome.control, Control::ReturnToIdle);
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(handles.launcher.launched(), ["notepad"]);
        assert_eq!(speaker.spoken().len(), 1);
    }

    #[test]
    fn test_greet_and_close() {
        let (mut s, speaker, _) = session(Vec::new(), ApiKeys::default());
        assert!(s.greet());
        assert_eq!(speaker.spoken(), ["Hello, I am Jarvis. How can I help you?"]);
        s.close().unwrap();
    }
}
