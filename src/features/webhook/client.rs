use super::models::{OutgoingTextMessage, ReplyRequest};
use crate::shared::config::LineConfig;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// テキストメッセージの最大文字数
pub const MAX_TEXT_CHARS: usize = 5000;

const REPLY_ENDPOINT: &str = "/v2/bot/message/reply";

/// 返信の送信先
///
/// テストでは記録用の実装に差し替える
#[async_trait]
pub trait ReplySender: Send + Sync {
    /// reply_token に対してテキストを返信する
    async fn reply(&self, reply_token: &str, text: &str) -> AppResult<()>;
}

/// LINE Messaging API クライアント
pub struct LineMessagingClient {
    client: Client,
    reply_url: Url,
    channel_access_token: String,
}

impl LineMessagingClient {
    /// 設定からクライアントを作成する
    pub fn new(config: &LineConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        let reply_url = config
            .api_base_url
            .join(REPLY_ENDPOINT)
            .map_err(|e| AppError::configuration(format!("返信APIのURLが不正です: {e}")))?;

        Ok(Self {
            client,
            reply_url,
            channel_access_token: config.channel_access_token.clone(),
        })
    }

    pub fn reply_url(&self) -> &Url {
        &self.reply_url
    }
}

#[async_trait]
impl ReplySender for LineMessagingClient {
    async fn reply(&self, reply_token: &str, text: &str) -> AppResult<()> {
        let body = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages: vec![OutgoingTextMessage::text(truncate_text(text))],
        };

        debug!("返信APIリクエスト送信: {}", self.reply_url);

        let response = self
            .client
            .post(self.reply_url.clone())
            .bearer_auth(&self.channel_access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(
                "LINE Messaging API".to_string(),
                format!("ステータス {status}: {detail}"),
            ));
        }

        info!("返信APIリクエスト成功: status={status}");
        Ok(())
    }
}

/// テキストを最大文字数で切り詰める
pub fn truncate_text(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_CHARS) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::body::Incoming;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioIo;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    fn line_config(base_url: &str) -> LineConfig {
        LineConfig {
            channel_access_token: "access-token".to_string(),
            channel_secret: "secret".to_string(),
            api_base_url: Url::parse(base_url).unwrap(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_truncate_counts_characters() {
        let short = "💰".repeat(10);
        assert_eq!(truncate_text(&short), short);

        let long = "帳".repeat(MAX_TEXT_CHARS + 3);
        let truncated = truncate_text(&long);
        assert_eq!(truncated.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_reply_url() {
        let client = LineMessagingClient::new(&line_config("https://api.line.me")).unwrap();
        assert_eq!(
            client.reply_url().as_str(),
            "https://api.line.me/v2/bot/message/reply"
        );
    }

    /// 受信したリクエストを記録し、指定のステータスを返すHTTPサーバーを起動する
    async fn start_mock_api(status: u16) -> (String, Arc<Mutex<Vec<(String, String)>>>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&received);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorder = Arc::clone(&recorder);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let recorder = Arc::clone(&recorder);
                        async move {
                            use http_body_util::BodyExt;
                            let auth = req
                                .headers()
                                .get("authorization")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default()
                                .to_string();
                            let body = req.into_body().collect().await.unwrap().to_bytes();
                            recorder
                                .lock()
                                .unwrap()
                                .push((auth, String::from_utf8(body.to_vec()).unwrap()));

                            let mut response = Response::new("{}".to_string());
                            *response.status_mut() = hyper::StatusCode::from_u16(status).unwrap();
                            Ok::<_, Infallible>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        (format!("http://{addr}"), received)
    }

    #[tokio::test]
    async fn test_reply_posts_bearer_authorized_json() {
        let (base_url, received) = start_mock_api(200).await;
        let client = LineMessagingClient::new(&line_config(&base_url)).unwrap();

        client.reply("reply-token", "✅ 已記帳").await.unwrap();

        let requests = received.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "Bearer access-token");
        let body: serde_json::Value = serde_json::from_str(&requests[0].1).unwrap();
        assert_eq!(body["replyToken"], "reply-token");
        assert_eq!(body["messages"][0]["type"], "text");
        assert_eq!(body["messages"][0]["text"], "✅ 已記帳");
    }

    #[tokio::test]
    async fn test_reply_non_success_status_is_external_error() {
        let (base_url, _) = start_mock_api(400).await;
        let client = LineMessagingClient::new(&line_config(&base_url)).unwrap();

        let result = client.reply("expired-token", "hi").await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
