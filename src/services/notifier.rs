use serde_json::json;

use crate::config::SettingsDoc;
use crate::errors::ExecutionError;
use crate::models::{Position, Signal};

/// Telegram notification service. Failures are logged but never block the main flow.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            chat_id,
        }
    }

    /// Build from the settings document. Returns `None` until both the bot
    /// token and a chat target are configured. The channel takes priority
    /// over the group when both are set.
    pub fn from_doc(doc: &SettingsDoc) -> Option<Self> {
        let bot_token = doc.telegram_bot_token.as_deref().filter(|t| !t.is_empty())?;
        let chat_id = doc
            .telegram_channel_id
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| doc.telegram_group_id.as_deref().filter(|c| !c.is_empty()))?;
        Some(Self::new(bot_token.to_owned(), chat_id.to_owned()))
    }

    /// Send a Telegram message. Failures are logged as warnings.
    pub async fn send(&self, message: &str) {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                if !resp.status().is_success() {
                    tracing::warn!(
                        status = %resp.status(),
                        "Telegram sendMessage returned non-2xx"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send Telegram notification");
            }
        }
    }
}

/// Format an execution failure alert, sent only for high-confidence signals.
pub fn format_execution_alert(signal: &Signal, error: &ExecutionError) -> String {
    format!(
        "*Trade Failed*\nToken: {} ({})\nConfidence: {}%\nPrice: {}\nError: {}",
        signal.token, signal.chain, signal.confidence, signal.price, error,
    )
}

/// Format a position exit notice, whether manual or bound-triggered.
pub fn format_position_exit(position: &Position, reason: &str) -> String {
    format!(
        "*Position Closed*\nToken: {} ({})\nReason: {}\nEntry: {}\nPnL: {} ({}%)",
        position.token,
        position.chain,
        reason,
        position.entry_price,
        position.pnl.round_dp(2),
        position.pnl_percent.round_dp(1),
    )
}
