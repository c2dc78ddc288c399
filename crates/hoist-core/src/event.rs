//! Event and prompt wire types.
//!
//! Every unit on an installer event stream is one JSON-encoded [`Event`]:
//!
//! ```json
//! {"kind": "prompt", "prompt": {"id": "9f..", "kind": "yes_no", "message": "proceed?", "resolved": false}}
//! ```

use serde::{Deserialize, Serialize};

/// Kind of an installer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Progress notification from the workflow.
    Status,
    /// Terminal workflow failure.
    Error,
    /// Prompt asked or answered; the event embeds the prompt snapshot.
    Prompt,
    /// Domain of the provisioned cluster (success only).
    Domain,
    /// Dashboard login token (success only).
    DashboardLoginToken,
    /// URL-safe base64 of the cluster CA certificate (success only).
    CaCert,
    /// Terminal successful completion.
    Done,
}

impl EventKind {
    /// Wire name, also used as the SSE `event:` label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Error => "error",
            Self::Prompt => "prompt",
            Self::Domain => "domain",
            Self::DashboardLoginToken => "dashboard_login_token",
            Self::CaCert => "ca_cert",
            Self::Done => "done",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record in a session's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Snapshot of the prompt at emission time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
}

impl Event {
    fn new(kind: EventKind, description: Option<String>) -> Self {
        Self {
            kind,
            description,
            prompt: None,
        }
    }

    pub fn status(description: impl Into<String>) -> Self {
        Self::new(EventKind::Status, Some(description.into()))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, Some(message.into()))
    }

    /// Informational event carrying a value disclosed at completion.
    pub fn info(kind: EventKind, value: impl Into<String>) -> Self {
        Self::new(kind, Some(value.into()))
    }

    pub fn prompt(prompt: Prompt) -> Self {
        Self {
            kind: EventKind::Prompt,
            description: None,
            prompt: Some(prompt),
        }
    }

    pub fn done() -> Self {
        Self::new(EventKind::Done, None)
    }
}

/// Kind of question posed to the human operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    YesNo,
    Input,
}

/// A question from the workflow, as seen by observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub kind: PromptKind,
    pub message: String,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<PromptReply>,
}

impl Prompt {
    /// A fresh, unresolved prompt.
    pub fn new(id: String, kind: PromptKind, message: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            message: message.into(),
            resolved: false,
            response: None,
        }
    }

    /// Copy of this prompt in its resolved state.
    #[must_use]
    pub fn resolved_with(&self, reply: PromptReply) -> Self {
        Self {
            resolved: true,
            response: Some(reply),
            ..self.clone()
        }
    }
}

/// The answer handed back to the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PromptReply {
    Yes(bool),
    Text(String),
}

impl PromptReply {
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Yes(yes) => Some(*yes),
            Self::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Yes(_) => None,
        }
    }
}

/// Answer payload submitted by an observer.
///
/// Yes/no prompts read `yes` (absent means no); input prompts read `input`
/// (absent means empty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptAnswer {
    #[serde(default)]
    pub yes: Option<bool>,
    #[serde(default)]
    pub input: Option<String>,
}

impl PromptAnswer {
    pub const fn yes(yes: bool) -> Self {
        Self {
            yes: Some(yes),
            input: None,
        }
    }

    pub fn input(input: impl Into<String>) -> Self {
        Self {
            yes: None,
            input: Some(input.into()),
        }
    }

    /// Interpret this answer for a prompt of the given kind.
    pub fn into_reply(self, kind: PromptKind) -> PromptReply {
        match kind {
            PromptKind::YesNo => PromptReply::Yes(self.yes.unwrap_or(false)),
            PromptKind::Input => PromptReply::Text(self.input.unwrap_or_default()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_event_omits_empty_fields() {
        let value = serde_json::to_value(Event::status("creating network")).unwrap();
        assert_eq!(
            value,
            json!({"kind": "status", "description": "creating network"})
        );
    }

    #[test]
    fn resolved_prompt_event_carries_response() {
        let prompt = Prompt::new("abc".into(), PromptKind::YesNo, "proceed?");
        let value = serde_json::to_value(Event::prompt(prompt.resolved_with(PromptReply::Yes(true))))
            .unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "prompt",
                "prompt": {
                    "id": "abc",
                    "kind": "yes_no",
                    "message": "proceed?",
                    "resolved": true,
                    "response": true
                }
            })
        );
    }

    #[test]
    fn unresolved_prompt_has_no_response_field() {
        let prompt = Prompt::new("abc".into(), PromptKind::Input, "domain?");
        let value = serde_json::to_value(&prompt).unwrap();
        assert!(value.get("response").is_none());
        assert_eq!(value["kind"], "input");
    }

    #[test]
    fn answer_defaults_follow_prompt_kind() {
        assert_eq!(
            PromptAnswer::default().into_reply(PromptKind::YesNo),
            PromptReply::Yes(false)
        );
        assert_eq!(
            PromptAnswer::default().into_reply(PromptKind::Input),
            PromptReply::Text(String::new())
        );
        assert_eq!(
            PromptAnswer::input("example.com").into_reply(PromptKind::Input),
            PromptReply::Text("example.com".into())
        );
    }

    #[test]
    fn answer_parses_original_wire_shape() {
        let answer: PromptAnswer = serde_json::from_str(r#"{"yes": true}"#).unwrap();
        assert_eq!(answer.into_reply(PromptKind::YesNo), PromptReply::Yes(true));
    }

    #[test]
    fn kind_display_is_wire_name() {
        assert_eq!(EventKind::CaCert.to_string(), "ca_cert");
        assert_eq!(EventKind::DashboardLoginToken.to_string(), "dashboard_login_token");
    }
}
