// Claude API streaming client using reqwest-eventsource.
//
// Sends messages to the Anthropic Messages API with `stream: true` and
// parses the Server-Sent Events into `LlmEvent` variants that are forwarded
// over an mpsc channel for the app orchestrator to consume.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::Config;
use crate::protocol::LlmEvent;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// CoachClient
// ---------------------------------------------------------------------------

/// Low-level Claude API streaming client.
pub struct CoachClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
}

impl CoachClient {
    /// Create a new client with the given API key, model id, and sampling
    /// temperature.
    pub fn new(api_key: String, model: String, temperature: f64) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            temperature,
        }
    }

    /// Send a message to the Claude API and stream the response as
    /// `LlmEvent`s over `tx`.
    ///
    /// The `generation` counter is threaded through every emitted event so
    /// that the receiving side can discard stale events from superseded
    /// requests.
    ///
    /// Returns when the stream is complete, an error occurs, or the receiver
    /// is dropped.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            let _ = tx
                .send(LlmEvent::Error {
                    message: "API key not configured".to_string(),
                    generation,
                })
                .await;
            return Ok(());
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "temperature": self.temperature,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = match request.eventsource() {
            Ok(es) => es,
            Err(e) => {
                let _ = tx
                    .send(LlmEvent::Error {
                        message: format!("Failed to create event source: {e}"),
                        generation,
                    })
                    .await;
                return Ok(());
            }
        };

        let mut full_text = String::new();
        let mut input_tokens: u32 = 0;
        let mut output_tokens: u32 = 0;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    let event_type = msg.event.as_str();
                    let data = &msg.data;

                    match event_type {
                        "message_start" => {
                            match parse_input_tokens(data) {
                                Some(n) => input_tokens = n,
                                None => warn!("failed to parse input_tokens from message_start"),
                            }
                            debug!(input_tokens, "message_start");
                        }
                        "content_block_delta" => {
                            if let Some(text) = parse_delta_text(data) {
                                full_text.push_str(&text);
                                if tx
                                    .send(LlmEvent::Token { text, generation })
                                    .await
                                    .is_err()
                                {
                                    // Receiver dropped; abort stream.
                                    es.close();
                                    return Ok(());
                                }
                            }
                        }
                        "message_delta" => {
                            match parse_output_tokens(data) {
                                Some(n) => output_tokens = n,
                                None => warn!("failed to parse output_tokens from message_delta"),
                            }
                            debug!(output_tokens, "message_delta");
                        }
                        "message_stop" => {
                            debug!("message_stop, streaming complete");
                            let _ = tx
                                .send(LlmEvent::Complete {
                                    full_text,
                                    input_tokens,
                                    output_tokens,
                                    generation,
                                })
                                .await;
                            es.close();
                            return Ok(());
                        }
                        // Ignore ping, content_block_start, content_block_stop, etc.
                        _ => {
                            debug!(event_type, "ignoring SSE event");
                        }
                    }
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    let error_message = extract_error_message(&err);
                    let _ = tx
                        .send(LlmEvent::Error {
                            message: error_message,
                            generation,
                        })
                        .await;
                    es.close();
                    return Ok(());
                }
            }
        }

        // Stream ended without message_stop (shouldn't normally happen).
        if full_text.is_empty() {
            let _ = tx
                .send(LlmEvent::Error {
                    message: "Stream ended unexpectedly without any content".to_string(),
                    generation,
                })
                .await;
        } else {
            let _ = tx
                .send(LlmEvent::Complete {
                    full_text,
                    input_tokens,
                    output_tokens,
                    generation,
                })
                .await;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that is either an active Claude client or disabled.
pub enum LlmClient {
    /// Claude API is configured and ready.
    Active(CoachClient),
    /// LLM functionality is disabled (no API key configured).
    Disabled,
}

impl LlmClient {
    /// Build an `LlmClient` from the application config.
    ///
    /// Returns `Active` if an API key is present in credentials, otherwise
    /// `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => LlmClient::Active(CoachClient::new(
                key.clone(),
                config.llm.model.clone(),
                config.llm.temperature,
            )),
            _ => LlmClient::Disabled,
        }
    }

    /// Stream a message, delegating to the inner `CoachClient` or
    /// immediately sending an error if disabled.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
        generation: u64,
    ) -> anyhow::Result<()> {
        match self {
            LlmClient::Active(client) => {
                client
                    .stream_message(system, user_content, max_tokens, tx, generation)
                    .await
            }
            LlmClient::Disabled => {
                let _ = tx
                    .send(LlmEvent::Error {
                        message: "LLM not configured".to_string(),
                        generation,
                    })
                    .await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `input_tokens` from a `message_start` event's JSON.
///
/// Expected shape: `{ "type": "message_start", "message": { "usage": { "input_tokens": N } } }`
pub(crate) fn parse_input_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("message")?
        .get("usage")?
        .get("input_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Extract `delta.text` from a `content_block_delta` event's JSON.
///
/// Expected shape: `{ "type": "content_block_delta", "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `output_tokens` from a `message_delta` event's JSON.
///
/// Expected shape: `{ "type": "message_delta", "usage": { "output_tokens": N } }`
pub(crate) fn parse_output_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("usage")?
        .get("output_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// Extract a human-readable error message from an SSE error.
fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => {
            format!("Network error: {e}")
        }
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
