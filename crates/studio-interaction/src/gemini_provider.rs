//! GeminiProvider - live generation through the Gemini REST API.
//!
//! Blueprint calls send the architect instruction with the user's request;
//! chat calls send the assistant persona as a system instruction followed by
//! the prior transcript and the new message.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use studio_core::provider::{
    GenerationKind, GenerationProvider, GenerationRequest, HistoryTurn, ProviderError,
    ProviderMode,
};
use studio_core::session::MessageRole;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const CHAT_SYSTEM_INSTRUCTION: &str = "You are TEOS Gen, a helpful AI assistant for building compliant apps using the TEOS stack (Next.js, FastAPI, React Native).";

/// Provider implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new provider with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (used to point at a proxy).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, ProviderError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url.trim_end_matches('/'),
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                // Strip the URL so the API key never reaches the transcript
                ProviderError::Transport(err.without_url().to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            tracing::warn!(status = status.as_u16(), "Gemini API call failed");
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ProviderError::Transport(format!("Failed to parse Gemini response: {}", err.without_url()))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Live
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        tracing::debug!(kind = ?request.kind, model = %self.model, "Calling Gemini");
        let body = build_request(&request);
        self.send_request(&body).await
    }
}

fn blueprint_prompt(prompt: &str) -> String {
    format!(
        "You are TEOS Gen, an AI architect for the TEOS App Studio.\n\
         The user wants to build an app.\n\
         Analyze this request: \"{prompt}\".\n\
         Return a JSON object with the fields appName, stack (array of strings), \
         features (array of strings), compliance (string) and message (a one-paragraph summary).\n\
         Do not use Markdown formatting, just return the raw JSON string."
    )
}

fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::Assistant => "model",
        MessageRole::User | MessageRole::System => "user",
    }
}

fn history_content(turn: &HistoryTurn) -> Content {
    let text = match turn.role {
        MessageRole::System => format!("System: {}", turn.content),
        _ => turn.content.clone(),
    };
    Content {
        role: gemini_role(turn.role).to_string(),
        parts: vec![Part { text }],
    }
}

fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
    match request.kind {
        GenerationKind::Blueprint => GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: blueprint_prompt(&request.prompt),
                }],
            }],
            system_instruction: None,
        },
        GenerationKind::Chat => {
            let mut contents: Vec<Content> = request.history.iter().map(history_content).collect();
            contents.push(Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            });
            GenerateContentRequest {
                contents,
                system_instruction: Some(Content {
                    role: "system".to_string(),
                    parts: vec![Part {
                        text: CHAT_SYSTEM_INSTRUCTION.to_string(),
                    }],
                }),
            }
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> ProviderError {
    let (status_text, message) = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            (
                wrapper.error.status.unwrap_or_default(),
                wrapper.error.message.unwrap_or_else(|| body.clone()),
            )
        })
        .unwrap_or_else(|_| (String::new(), body.clone()));

    let detail = if status_text.is_empty() {
        message.clone()
    } else {
        format!("{status_text}: {message}")
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::Quota(detail),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Credentials(detail),
        StatusCode::BAD_REQUEST if message.contains("API key") => {
            ProviderError::Credentials(detail)
        }
        _ => ProviderError::Api {
            status: status.as_u16(),
            message: detail,
        },
    }
}
