//! Voice-skill request dispatch.
//!
//! Turns a voice-platform request envelope into a spoken response envelope.
//! Only the launch request and the rowing-conditions intent touch the
//! reading cache; the rest are canned replies.

use crate::cache::{Clock, MeasureSource, ReadingCache};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

pub const INTENT_ROWING_CONDITIONS: &str = "RowingConditionsIntent";
pub const INTENT_LAUNCH: &str = "AMAZON.LaunchIntent";
pub const INTENT_HELP: &str = "AMAZON.HelpIntent";
pub const INTENT_CANCEL: &str = "AMAZON.CancelIntent";
pub const INTENT_STOP: &str = "AMAZON.StopIntent";

pub const FETCH_FAILED_SPEECH: &str = "I'm having trouble getting data";
pub const FOLLOW_UP_REPROMPT: &str =
    "Is there anything else you'd like to know about rowing conditions?";
pub const HELP_SPEECH: &str = "I can tell you if it's safe to row today at Reading Rowing Club \
     based on river flow conditions. Just ask \"can I row today?\" and I'll check the latest \
     flow data for Reading UK from the UK Environment Agency.";
pub const GOODBYE_SPEECH: &str = "Stay safe on the water!";
pub const UNHANDLED_SPEECH: &str = "Sorry, I had trouble doing what you asked. Please try again.";

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    pub request: SkillRequest,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillRequest {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub intent: Option<Intent>,
    /// Present on `SessionEndedRequest`.
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: SkillResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillResponse {
    #[serde(rename = "outputSpeech", skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(rename = "shouldEndSession")]
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reprompt {
    #[serde(rename = "outputSpeech")]
    pub output_speech: OutputSpeech,
}

fn plain_text(text: &str) -> OutputSpeech {
    OutputSpeech {
        speech_type: "PlainText".to_string(),
        text: text.to_string(),
    }
}

/// Small builder mirroring how replies are assembled: speak, optionally
/// reprompt, and end the session unless a reprompt keeps it open.
#[derive(Debug, Default)]
struct ResponseBuilder {
    speech: Option<String>,
    reprompt: Option<String>,
}

impl ResponseBuilder {
    fn speak(mut self, text: impl Into<String>) -> Self {
        self.speech = Some(text.into());
        self
    }

    fn reprompt(mut self, text: impl Into<String>) -> Self {
        self.reprompt = Some(text.into());
        self
    }

    fn build(self) -> ResponseEnvelope {
        let should_end_session = self.reprompt.is_none();
        ResponseEnvelope {
            version: "1.0".to_string(),
            response: SkillResponse {
                output_speech: self.speech.as_deref().map(plain_text),
                reprompt: self.reprompt.as_deref().map(|text| Reprompt {
                    output_speech: plain_text(text),
                }),
                should_end_session,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What a request envelope asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum SkillAction {
    RowingConditions,
    Help,
    Goodbye,
    SessionEnded(Option<String>),
    Reflect(String),
    Unhandled(String),
}

impl SkillAction {
    pub fn from_request(request: &SkillRequest) -> Self {
        match request.request_type.as_str() {
            "LaunchRequest" => SkillAction::RowingConditions,
            "SessionEndedRequest" => SkillAction::SessionEnded(request.reason.clone()),
            "IntentRequest" => match request.intent.as_ref().map(|i| i.name.as_str()) {
                Some(INTENT_ROWING_CONDITIONS) | Some(INTENT_LAUNCH) => {
                    SkillAction::RowingConditions
                }
                Some(INTENT_HELP) => SkillAction::Help,
                Some(INTENT_CANCEL) | Some(INTENT_STOP) => SkillAction::Goodbye,
                Some(other) => SkillAction::Reflect(other.to_string()),
                None => SkillAction::Unhandled("IntentRequest without intent".to_string()),
            },
            other => SkillAction::Unhandled(other.to_string()),
        }
    }
}

/// Handles one request envelope against the shared reading cache.
pub fn handle_envelope<S: MeasureSource, C: Clock>(
    envelope: &RequestEnvelope,
    cache: &ReadingCache<S, C>,
) -> ResponseEnvelope {
    let action = SkillAction::from_request(&envelope.request);
    info!(
        request_type = %envelope.request.request_type,
        request_id = envelope.request.request_id.as_deref().unwrap_or("-"),
        version = envelope.version.as_deref().unwrap_or("-"),
        ?action,
        "dispatching skill request"
    );

    match action {
        SkillAction::RowingConditions => {
            let speech = match cache.current_advisory() {
                Ok(advisory) => {
                    info!(tier = ?advisory.tier, "advisory ready");
                    advisory.message
                }
                Err(e) => {
                    error!(error = %e, "could not build advisory");
                    FETCH_FAILED_SPEECH.to_string()
                }
            };
            ResponseBuilder::default()
                .speak(speech)
                .reprompt(FOLLOW_UP_REPROMPT)
                .build()
        }
        SkillAction::Help => ResponseBuilder::default()
            .speak(HELP_SPEECH)
            .reprompt(HELP_SPEECH)
            .build(),
        SkillAction::Goodbye => ResponseBuilder::default().speak(GOODBYE_SPEECH).build(),
        SkillAction::SessionEnded(reason) => {
            info!(reason = reason.as_deref().unwrap_or("unknown"), "session ended");
            ResponseBuilder::default().build()
        }
        SkillAction::Reflect(name) => ResponseBuilder::default()
            .speak(format!("You just triggered {}", name))
            .build(),
        SkillAction::Unhandled(what) => {
            warn!(%what, "unhandled skill request");
            ResponseBuilder::default()
                .speak(UNHANDLED_SPEECH)
                .reprompt(UNHANDLED_SPEECH)
                .build()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
