use serde::{Deserialize, Serialize};

/// Webhook リクエストボディ
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    /// 疎通確認では空配列が送られてくる
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// Webhook イベント
///
/// 処理しない種類のイベントも受け付けるため、フィールドは全て省略可能として扱う
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// イベントの送信元
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// メッセージ内容
#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// コマンド処理に渡すテキストメッセージ
#[derive(Debug, Clone, PartialEq)]
pub struct TextMessageEvent {
    pub user_id: String,
    pub text: String,
    pub reply_token: String,
}

impl WebhookEvent {
    /// 返信可能なテキストメッセージイベントであれば取り出す
    pub fn as_text_message(&self) -> Option<TextMessageEvent> {
        if self.event_type != "message" {
            return None;
        }

        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }

        Some(TextMessageEvent {
            user_id: self.source.as_ref()?.user_id.clone()?,
            text: message.text.clone()?,
            reply_token: self.reply_token.clone()?,
        })
    }
}

/// 返信APIのリクエストボディ
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<OutgoingTextMessage>,
}

/// 送信するテキストメッセージ
#[derive(Debug, Serialize)]
pub struct OutgoingTextMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub text: String,
}

impl OutgoingTextMessage {
    pub fn text(text: String) -> Self {
        Self {
            message_type: "text",
            text,
        }
    }
}
