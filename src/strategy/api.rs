//! Remote correction API contract.
//!
//! The wire transport is a collaborator; this module owns only the
//! textual contract: request payload shape and the set of response
//! shapes a server may answer with. Anything else is a failure, and a
//! failure is always "no candidate".

use serde_json::{Value, json};

use crate::strategy::semantic::Semantic;

/// Instructions sent ahead of the raw input. Mirrors the embedded
/// engine's rules so both sources stay interchangeable.
const PROMPT: &str = "Fix wrong keyboard layout, mixed-layout characters and typos in the \
input. Never invent words, never expand or rephrase, prefer the minimal \
correction. Reply with the corrected text only, wrapped in <OUTPUT> tags. \
If no correction is needed, return the input unchanged.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// Connection refused, timed out or otherwise failed.
    Transport(String),
    /// Server answered with a non-success status.
    BadStatus(u16),
    /// Response parsed but matched none of the accepted shapes.
    Shape,
}

impl ApiError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "transport",
            ApiError::BadStatus(_) => "bad_status",
            ApiError::Shape => "shape",
        }
    }
}

/// Wire transport collaborator: POSTs a JSON body, returns the JSON
/// reply. Implementations own their own socket timeouts.
pub trait ApiTransport: Send + Sync {
    fn post_json(&self, url: &str, body: &Value) -> Result<Value, ApiError>;
}

pub struct ApiClient {
    url: String,
    model: String,
    transport: Box<dyn ApiTransport>,
}

impl ApiClient {
    pub fn new(url: &str, model: &str, transport: Box<dyn ApiTransport>) -> Self {
        Self {
            url: url.to_string(),
            model: model.to_string(),
            transport,
        }
    }

    fn payload(&self, text: &str, context: &str) -> Value {
        let mut body = json!({
            "prompt": format!("{PROMPT}\n<RAW_INPUT>\n{text}\n</RAW_INPUT>\n"),
            "text": text,
            "context": context,
            "max_tokens": text.chars().count() * 2,
            "temperature": 0.0,
        });
        if !self.model.is_empty() {
            body["model"] = Value::String(self.model.clone());
        }
        body
    }
}

impl Semantic for ApiClient {
    fn correct(&self, text: &str, context: &str) -> Option<String> {
        let reply = match self.transport.post_json(&self.url, &self.payload(text, context)) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = e.as_str(), url = %self.url, "api correction failed");
                return None;
            }
        };

        let result = extract_result(&reply)?;
        let trimmed = result.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    fn source_confidence(&self) -> f64 {
        0.7
    }
}

/// Pulls corrected text out of a server reply.
///
/// Accepted shapes: a top-level string field (`output`, `text`, `result`,
/// `completion`, `corrected`), or an OpenAI-style `choices` array whose
/// entries carry `text` or `message.content`. Everything else is `None`.
pub fn extract_result(data: &Value) -> Option<String> {
    if let Value::String(s) = data {
        return Some(extract_output_tags(s));
    }

    for key in ["output", "text", "result", "completion", "corrected"] {
        if let Some(Value::String(s)) = data.get(key) {
            return Some(extract_output_tags(s));
        }
    }

    for choice in data.get("choices")?.as_array()? {
        if let Some(Value::String(s)) = choice.get("text") {
            return Some(extract_output_tags(s));
        }
        if let Some(Value::String(s)) = choice.get("message").and_then(|m| m.get("content")) {
            return Some(extract_output_tags(s));
        }
    }

    None
}

fn extract_output_tags(text: &str) -> String {
    const OPEN: &str = "<OUTPUT>";
    const CLOSE: &str = "</OUTPUT>";

    if let Some(start) = text.find(OPEN) {
        if let Some(end) = text[start + OPEN.len()..].find(CLOSE) {
            let inner = &text[start + OPEN.len()..start + OPEN.len() + end];
            return inner.trim().to_string();
        }
    }
    text.trim().to_string()
}
