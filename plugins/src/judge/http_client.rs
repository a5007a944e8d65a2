use nomatch_core::api::{ChatJudgeConfig, JudgeError};
use serde::{Deserialize, Serialize};
use std::{error::Error as StdError, fmt};

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatHttpErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl ChatHttpErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ChatHttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ChatHttpError {
    kind: ChatHttpErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl ChatHttpError {
    pub fn kind(&self) -> ChatHttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            ChatHttpErrorKind::Timeout
        } else if err.is_connect() {
            ChatHttpErrorKind::Connect
        } else if err.is_request() {
            ChatHttpErrorKind::Request
        } else if err.is_body() {
            ChatHttpErrorKind::Body
        } else if err.is_decode() {
            ChatHttpErrorKind::Decode
        } else {
            ChatHttpErrorKind::Unknown
        };
        let status = err.status().map(|s| s.as_u16());
        let message = err.to_string();
        ChatHttpError {
            kind,
            status,
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    fn status_error(status: u16, url: String, preview: String) -> Self {
        ChatHttpError {
            kind: ChatHttpErrorKind::Status,
            status: Some(status),
            url: Some(url),
            message: preview,
            source: None,
        }
    }

    fn decode_error(status: u16, url: String, err: serde_json::Error, preview: String) -> Self {
        let message = format!("failed to decode response body: {} | body={}", err, preview);
        ChatHttpError {
            kind: ChatHttpErrorKind::Decode,
            status: Some(status),
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    /// Maps transport failures onto the judge error taxonomy.
    pub fn into_judge_error(self, timeout_ms: u64) -> JudgeError {
        match self.kind {
            ChatHttpErrorKind::Timeout => JudgeError::Timeout(timeout_ms),
            ChatHttpErrorKind::Status => JudgeError::Status {
                status: self.status.unwrap_or_default(),
                body: self.message,
            },
            ChatHttpErrorKind::Decode => JudgeError::Malformed(self.message),
            _ => JudgeError::Transport(self.to_string()),
        }
    }
}

impl fmt::Display for ChatHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for ChatHttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// Sampling knobs sent with each completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
}

impl Sampling {
    /// Deterministic settings for the reformatting retry.
    pub const REPAIR: Sampling = Sampling {
        temperature: 0.0,
        top_p: 1.0,
    };
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    seed: u64,
    stream: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatReply,
}

#[derive(Debug, Default, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions server.
#[derive(Clone)]
pub struct ChatClient {
    api_key: String,
    http: reqwest::Client,
    model: String,
    max_tokens: u32,
    seed: u64,
    timeout_ms: u64,
    url_completions: String,
    url_models: String,
}

impl ChatClient {
    pub fn new(cfg: &ChatJudgeConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()?;
        let normalized = cfg.base_url.trim_end_matches('/');
        Ok(Self {
            api_key: cfg.api_key.clone(),
            http,
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            seed: cfg.seed,
            timeout_ms: cfg.timeout_ms,
            url_completions: format!("{}/v1/chat/completions", normalized),
            url_models: format!("{}/v1/models", normalized),
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    /// Lists models; any 2xx means the server is up.
    pub async fn ping(&self) -> Result<(), ChatHttpError> {
        let url = &self.url_models;
        tracing::debug!(target: "nomatch.judge", stage = "judge.http.ping.in", url = %url);
        let resp = self
            .auth(self.http.get(url))
            .send()
            .await
            .map_err(|err| ChatHttpError::from_reqwest(err, url.clone()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .map_err(|err| ChatHttpError::from_reqwest(err, url.clone()))?;
            return Err(ChatHttpError::status_error(
                status.as_u16(),
                url.clone(),
                preview_body(&body),
            ));
        }
        tracing::debug!(
            target: "nomatch.judge",
            stage = "judge.http.ping.out",
            status = %status
        );
        Ok(())
    }

    /// One system + user exchange; returns the trimmed content of the first
    /// choice (empty when the server sent none).
    pub async fn complete(
        &self,
        system: &str,
        user: &str,
        sampling: Sampling,
    ) -> Result<String, ChatHttpError> {
        let url = &self.url_completions;
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: self.max_tokens,
            seed: self.seed,
            stream: false,
        };
        tracing::debug!(
            target: "nomatch.judge",
            stage = "judge.http.completion.in",
            url = %url,
            prompt_len = user.len(),
            temperature = sampling.temperature
        );

        let resp = self
            .auth(self.http.post(url).json(&body))
            .send()
            .await
            .map_err(|err| ChatHttpError::from_reqwest(err, url.clone()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|err| ChatHttpError::from_reqwest(err, url.clone()))?;

        if !status.is_success() {
            return Err(ChatHttpError::status_error(
                status.as_u16(),
                url.clone(),
                preview_body(&text),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|err| {
            ChatHttpError::decode_error(status.as_u16(), url.clone(), err, preview_body(&text))
        })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
            .trim()
            .to_string();

        tracing::debug!(
            target: "nomatch.judge",
            stage = "judge.http.completion.out",
            status = %status,
            content_len = content.len()
        );
        Ok(content)
    }
}
