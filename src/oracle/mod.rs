//! External AI scoring oracle.
//!
//! When configured, the scan path blends the oracle's 0-100 rating into
//! the deterministic base score. Oracle failures are never fatal to a
//! scoring call; the caller falls back to the unblended score.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::config::SettingsDoc;
use crate::errors::OracleError;
use crate::models::TokenRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_TOKENS: u32 = 16;

#[async_trait]
pub trait ScoreOracle: Send + Sync {
    /// External 0-100 rating for a token observation.
    async fn score(&self, token: &TokenRecord) -> Result<u8, OracleError>;

    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Chat-completions client
// ---------------------------------------------------------------------------

/// Providers with an OpenAI-compatible chat-completions endpoint.
fn provider_endpoint(provider: &str) -> Option<(&'static str, &'static str)> {
    match provider {
        "openai" => Some(("https://api.openai.com/v1/chat/completions", "gpt-4o-mini")),
        "groq" => Some((
            "https://api.groq.com/openai/v1/chat/completions",
            "llama-3.1-8b-instant",
        )),
        "deepseek" => Some(("https://api.deepseek.com/chat/completions", "deepseek-chat")),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

pub struct HttpScoreOracle {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl HttpScoreOracle {
    /// Build from the persisted settings document. Returns None when no
    /// provider/key is configured, or the provider has no compatible
    /// endpoint.
    pub fn from_doc(doc: &SettingsDoc) -> Option<Self> {
        let provider = doc.ai_provider.as_deref()?;
        let api_key = doc.ai_api_key.as_deref().filter(|k| !k.is_empty())?;
        let Some((endpoint, default_model)) = provider_endpoint(provider) else {
            warn!(provider, "no compatible scoring endpoint for provider, oracle disabled");
            return None;
        };

        Some(Self {
            http: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: doc
                .ai_model
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| default_model.to_string()),
            max_tokens: doc.ai_max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }

    fn prompt(token: &TokenRecord) -> String {
        format!(
            "Rate this token from 0 to 100 for short-term momentum trading. \
             Reply with only the integer.\n\
             symbol={} chain={} price={} change24h={}% volume24h={} liquidity={}",
            token.symbol,
            token.chain,
            token.price,
            token.change_24h,
            token.volume_24h,
            token.liquidity
        )
    }
}

/// Extract the first integer in the reply and require it to be a valid
/// 0-100 score.
fn parse_score(text: &str) -> Result<u8, OracleError> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let value: u32 = digits
        .parse()
        .map_err(|_| OracleError::Malformed(format!("no score in reply: {text:?}")))?;

    if value > 100 {
        return Err(OracleError::Malformed(format!("score out of range: {value}")));
    }
    Ok(value as u8)
}

#[async_trait]
impl ScoreOracle for HttpScoreOracle {
    async fn score(&self, token: &TokenRecord) -> Result<u8, OracleError> {
        let request = ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::prompt(token),
            }],
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        let text = body
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        parse_score(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
