//! Deep links for reaching a contact
//!
//! WhatsApp actions go through `web.whatsapp.com` or the `whatsapp://`
//! scheme; mobile actions use the standard `sms:` and `tel:` URIs so the
//! platform's phone app takes over.

use super::ServiceError;
use intent_parser::ContactActionKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    WhatsApp,
    Mobile,
}

impl Channel {
    /// Reads a spoken answer such as "use whatsapp please".
    pub fn from_answer(answer: &str) -> Option<Self> {
        let answer = answer.to_lowercase();
        if answer.contains("whatsapp") || answer.contains("wahtsapp") {
            Some(Channel::WhatsApp)
        } else if answer.contains("mobile") || answer.contains("phone") {
            Some(Channel::Mobile)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::WhatsApp => "whatsapp",
            Channel::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URI that performs `kind` toward `phone` over `channel`. `phone` is in
/// `+<digits>` form; `body` is only used for messages.
pub fn contact_uri(
    channel: Channel,
    kind: ContactActionKind,
    phone: &str,
    body: Option<&str>,
) -> Result<String, ServiceError> {
    let digits = phone.trim_start_matches('+');
    let text = urlencoding::encode(body.unwrap_or_default());
    match (channel, kind) {
        (Channel::WhatsApp, ContactActionKind::Message) => Ok(format!(
            "https://web.whatsapp.com/send?phone={digits}&text={text}"
        )),
        (Channel::WhatsApp, ContactActionKind::PhoneCall) => {
            Ok(format!("whatsapp://call?phone={digits}"))
        }
        (Channel::WhatsApp, ContactActionKind::VideoCall) => {
            Ok(format!("whatsapp://send?phone={digits}"))
        }
        (Channel::Mobile, ContactActionKind::Message) => Ok(format!("sms:{phone}?body={text}")),
        (Channel::Mobile, ContactActionKind::PhoneCall) => Ok(format!("tel:{phone}")),
        (Channel::Mobile, ContactActionKind::VideoCall) => Err(ServiceError::Unsupported(
            "video call over mobile".to_string(),
        )),
    }
}

/// What to tell the user once the URI has been opened.
pub fn success_message(channel: Channel, kind: ContactActionKind, name: &str) -> String {
    match (channel, kind) {
        (Channel::WhatsApp, ContactActionKind::Message) => {
            format!("WhatsApp opened for {name} with your message ready to send")
        }
        (Channel::WhatsApp, ContactActionKind::PhoneCall) => {
            format!("Calling {name} on WhatsApp")
        }
        (Channel::WhatsApp, ContactActionKind::VideoCall) => {
            format!("Opening chat with {name} for a video call")
        }
        (Channel::Mobile, ContactActionKind::Message) => {
            format!("Opening your messages to text {name}")
        }
        (Channel::Mobile, _) => format!("Calling {name}"),
    }
}
