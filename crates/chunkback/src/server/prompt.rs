// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Request bodies and prompt extraction
//!
//! Only the fields needed to find the script are modelled; everything else a
//! client sends is ignored.

use serde::Deserialize;

use crate::error::{Error, Result};

/// OpenAI chat completion and Anthropic messages request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: MessageContent,
}

/// Plain string or an array of typed content parts
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl MessageContent {
    /// Text parts joined with newlines
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter(|part| part.kind.as_deref().map_or(true, |kind| kind == "text"))
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl ChatRequest {
    /// Content of the last `user` message
    pub fn prompt(&self) -> Result<String> {
        let messages = self
            .messages
            .as_deref()
            .filter(|messages| !messages.is_empty())
            .ok_or_else(|| Error::bad_request("Messages array is required"))?;

        messages
            .iter()
            .rev()
            .find(|message| message.role == "user")
            .map(|message| message.content.text())
            .ok_or_else(|| Error::bad_request("At least one user message is required"))
    }
}

/// Gemini `generateContent` request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentRequest {
    #[serde(default)]
    pub contents: Option<Vec<GeminiContent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiContent {
    /// Gemini treats a missing role as `user`.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentRequest {
    /// Non-empty text parts of the last user content joined with newlines
    pub fn prompt(&self) -> Result<String> {
        let contents = self
            .contents
            .as_deref()
            .filter(|contents| !contents.is_empty())
            .ok_or_else(|| Error::bad_request("Contents array is required"))?;

        let content = contents
            .iter()
            .rev()
            .find(|content| content.role.as_deref().map_or(true, |role| role == "user"))
            .ok_or_else(|| Error::bad_request("At least one user content is required"))?;

        Ok(content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn chat(body: serde_json::Value) -> ChatRequest {
        serde_json::from_value(body).unwrap()
    }

    fn gemini(body: serde_json::Value) -> GenerateContentRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn last_user_message_wins() {
        let request = chat(json!({
            "model": "gpt-4o",
            "messages": [
                {"role": "system", "content": "ignored"},
                {"role": "user", "content": "SAY \"first\""},
                {"role": "assistant", "content": "first"},
                {"role": "user", "content": "SAY \"second\""}
            ]
        }));
        assert_eq!(request.prompt().unwrap(), "SAY \"second\"");
        assert_eq!(request.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn content_parts_are_joined() {
        let request = chat(json!({
            "messages": [{"role": "user", "content": [
                {"type": "text", "text": "CHUNKSIZE 2"},
                {"type": "image", "source": {}},
                {"type": "text", "text": "SAY \"hi\""}
            ]}]
        }));
        assert_eq!(request.prompt().unwrap(), "CHUNKSIZE 2\nSAY \"hi\"");
    }

    #[test]
    fn missing_messages_are_rejected() {
        let error = chat(json!({})).prompt().unwrap_err();
        assert_eq!(error.to_string(), "Messages array is required");

        let error = chat(json!({"messages": []})).prompt().unwrap_err();
        assert_eq!(error.to_string(), "Messages array is required");

        let error = chat(json!({"messages": [{"role": "system", "content": "x"}]}))
            .prompt()
            .unwrap_err();
        assert_eq!(error.to_string(), "At least one user message is required");
    }

    #[test]
    fn gemini_prompt_joins_text_parts() {
        let request = gemini(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "old"}]},
                {"role": "model", "parts": [{"text": "reply"}]},
                {"role": "user", "parts": [{"text": "CHUNKSIZE 3"}, {"text": ""}, {"inlineData": {}}, {"text": "SAY \"x\""}]}
            ]
        }));
        assert_eq!(request.prompt().unwrap(), "CHUNKSIZE 3\nSAY \"x\"");
    }

    #[test]
    fn gemini_role_defaults_to_user() {
        let request = gemini(json!({"contents": [{"parts": [{"text": "SAY \"a\""}]}]}));
        assert_eq!(request.prompt().unwrap(), "SAY \"a\"");
    }

    #[test]
    fn gemini_requires_contents() {
        assert!(gemini(json!({})).prompt().is_err());
        let error = gemini(json!({"contents": [{"role": "model", "parts": []}]}))
            .prompt()
            .unwrap_err();
        assert_eq!(error.to_string(), "At least one user content is required");
    }
}
