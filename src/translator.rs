//! Natural-language to shell-command translation.
//!
//! [`OpenAiTranslator`] talks to an OpenAI-compatible chat-completion
//! endpoint. [`PatternTranslator`] is the offline stand-in selected by
//! `AITERM_USE_MOCK`, used for demos and the binary's integration tests.

use crate::config::Config;
use crate::error::ShellError;
use crate::http_client::{HttpClient, HttpResponse, ReqwestHttpClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const SYSTEM_INSTRUCTION: &str = "You are a terminal command interpreter. \
Convert natural language into appropriate Unix/Linux terminal commands. \
Respond with ONLY the command, no explanations.";

/// Programs whose invocations are already commands. Input starting with one
/// of these is returned as-is without asking the model.
pub const STANDARD_COMMANDS: &[&str] = &[
    // files
    "ls", "cp", "mv", "rm", "mkdir", "rmdir", "touch", "chmod", "chown",
    "cat", "more", "less", "vim", "vi", "nano", "tail", "head", "diff",
    // text
    "grep", "sed", "awk", "sort", "uniq", "wc", "cut", "paste",
    "find", "locate", "which", "whereis",
    // processes and system
    "ps", "kill", "killall", "top", "htop",
    "df", "du", "free", "mount", "umount", "lsof",
    // network
    "ping", "netstat", "curl", "wget", "ssh", "telnet", "nc",
    // archives
    "tar", "gzip", "gunzip", "zip", "unzip",
    // shell
    "cd", "pwd", "echo", "export", "source", "alias", "unalias",
    "brew", "port", "git", "svn",
    "man", "history", "clear", "exit", "sudo", "su", "whoami", "open",
];

/// Returns `text` unchanged when its first word is a standard command.
pub fn passthrough(text: &str) -> Option<TranslatedCommand> {
    let first = text.split_whitespace().next()?;
    STANDARD_COMMANDS.contains(&first).then(|| {
        debug!("'{}' is a standard command, skipping translation", first);
        TranslatedCommand { text: text.trim().to_string() }
    })
}

/// A single command line produced by the translator, used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedCommand {
    pub text: String,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<TranslatedCommand, ShellError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct OpenAiTranslator {
    client: Box<dyn HttpClient>,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiTranslator {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, Box::new(ReqwestHttpClient::new()))
    }

    /// Creates a translator with an injected HTTP client (for testing).
    pub fn with_client(config: &Config, client: Box<dyn HttpClient>) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn request_body(&self, text: &str) -> Result<serde_json::Value, ShellError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_INSTRUCTION },
                ChatMessage { role: "user", content: text },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        serde_json::to_value(&request)
            .map_err(|e| ShellError::translation(format!("failed to encode request: {}", e)))
    }

    fn parse_response(response: &HttpResponse) -> Result<TranslatedCommand, ShellError> {
        let (status, body) = (response.status, response.body.as_str());
        if !response.is_success() {
            let detail = serde_json::from_str::<ApiErrorBody>(body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| body.trim().to_string());
            return Err(match status {
                401 | 403 => ShellError::translation(format!(
                    "authentication failed ({}): {}",
                    status, detail
                )),
                _ => ShellError::translation(format!("API returned {}: {}", status, detail)),
            });
        }

        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| ShellError::translation(format!("malformed response: {}", e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ShellError::translation("response contained no completion"))?;

        let text = first_command_line(&content)
            .ok_or_else(|| ShellError::translation("model returned an empty command"))?;
        Ok(TranslatedCommand { text })
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(&self, text: &str) -> Result<TranslatedCommand, ShellError> {
        if let Some(command) = passthrough(text) {
            return Ok(command);
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ShellError::translation(
                "No OpenAI API key found. Set OPENAI_API_KEY or run `aiterm --set-api-key <key>`",
            )
        })?;

        info!("Translating input with model {}", self.model);
        let body = self.request_body(text)?;
        let auth = format!("Bearer {}", api_key);
        let headers = [
            ("Authorization", auth.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .client
            .post_json(&self.endpoint, &headers, &body)
            .await
            .map_err(|e| {
                warn!("Translation request failed: {}", e);
                ShellError::translation(format!("request failed: {}", e))
            })?;

        debug!("Translation response status {}: {}", response.status, response.body);
        let translated = Self::parse_response(&response)?;
        info!("Translated to: {}", translated.text);
        Ok(translated)
    }
}

/// Strips Markdown code fences and keeps the first non-empty line.
fn first_command_line(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("```"))
        .find(|line| !line.is_empty())
        .map(|line| line.trim_matches('`').trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Offline translator that recognises a handful of common phrasings.
pub struct PatternTranslator;

impl PatternTranslator {
    pub fn new() -> Self {
        Self
    }

    fn lookup(text: &str) -> Option<&'static str> {
        let text = text.to_lowercase();
        let command = if text.contains("list") && text.contains("file") {
            "ls"
        } else if text.contains("where am i") || text.contains("current directory") {
            "pwd"
        } else if text.contains("who am i") {
            "whoami"
        } else if text.contains("date") || text.contains("time") {
            "date"
        } else if text.contains("disk") {
            "df -h"
        } else {
            return None;
        };
        Some(command)
    }
}

impl Default for PatternTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for PatternTranslator {
    async fn translate(&self, text: &str) -> Result<TranslatedCommand, ShellError> {
        if let Some(command) = passthrough(text) {
            return Ok(command);
        }

        info!("Using pattern translator (AITERM_USE_MOCK)");
        Self::lookup(text)
            .map(|command| TranslatedCommand { text: command.to_string() })
            .ok_or_else(|| {
                ShellError::translation(format!("no offline translation for '{}'", text))
            })
    }
}

/// Builds the translator selected by `config`.
pub fn from_config(config: &Config) -> Box<dyn Translator> {
    if config.is_mock_mode() {
        Box::new(PatternTranslator::new())
    } else {
        Box::new(OpenAiTranslator::new(config))
    }
}
