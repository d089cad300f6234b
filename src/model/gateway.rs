//! HTTP client for the hosted model gateway (OpenAI-compatible
//! chat-completions contract).

use serde::{Deserialize, Serialize};

use super::{GenerateRequest, GenerativeClient, ModelError};

/// Default request timeout. Vision requests on large images can take tens of
/// seconds; the route-level client should time out before the platform does.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Chat-completions client with bearer-key auth.
pub struct GatewayClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GatewayClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self::with_timeout(base_url, api_key, model, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// The model id requests are routed to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

/// Plain text for prompt-only calls; a part list when an image rides along.
#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Ensure the image is a data URL; bare base64 is assumed to be JPEG, the
/// format every supported client uploads.
fn to_data_url(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/jpeg;base64,{image}")
    }
}

#[async_trait::async_trait]
impl GenerativeClient for GatewayClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let content = match &request.image {
            Some(image) => MessageContent::Parts(vec![
                ContentPart::Text {
                    text: request.prompt.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: to_data_url(image),
                    },
                },
            ]),
            None => MessageContent::Text(request.prompt.clone()),
        };

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature: request.temperature,
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ModelError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ModelError::Timeout(self.timeout_secs)
                } else {
                    ModelError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::ResponseParsing(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::EmptyReply)?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            reply_len = text.len(),
            "model generation complete"
        );

        Ok(text)
    }
}

/// Mock model client for testing — returns a configurable reply, or an
/// error when constructed with `failing()`.
pub struct MockModelClient {
    reply: Result<String, String>,
}

impl MockModelClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeClient for MockModelClient {
    async fn generate(&self, _request: GenerateRequest) -> Result<String, ModelError> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ModelError::HttpClient(message.clone())),
        }
    }
}
