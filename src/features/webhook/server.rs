use super::client::ReplySender;
use super::models::{TextMessageEvent, WebhookPayload};
use super::signature::{verify_signature, SIGNATURE_HEADER};
use crate::features::commands::CommandDispatcher;
use crate::shared::errors::{AppError, AppResult};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes, Incoming};
use hyper::header::CONTENT_LENGTH;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use log::{debug, error, info};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use uuid::Uuid;

/// Webhook の受信パス
pub const CALLBACK_PATH: &str = "/callback";

/// 受け付けるリクエストボディの上限（バイト）
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Webhook 処理で共有する状態
///
/// 起動時に一度だけ構築し、全接続で読み取り専用として共有する
pub struct WebhookState {
    pub channel_secret: String,
    pub dispatcher: CommandDispatcher,
    pub sender: Arc<dyn ReplySender>,
}

/// Webhook サーバーを実行する
///
/// shutdown が完了すると新しい接続の受け付けを止めて戻る
///
/// # 引数
/// * `listener` - バインド済みのリスナー
/// * `state` - 共有状態
/// * `shutdown` - 停止シグナル
pub async fn serve<F>(listener: TcpListener, state: Arc<WebhookState>, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    info!("Webhookサーバーを開始しました: http://{addr}{CALLBACK_PATH}");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("停止シグナルを受信しました。Webhookサーバーを停止します");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("接続を受け付けました: {peer}");
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        handle_connection(stream, state).await;
                    });
                }
                Err(e) => {
                    error!("接続受け入れエラー: {e}");
                }
            }
        }
    }

    Ok(())
}

/// TCP接続を処理する
async fn handle_connection(stream: TcpStream, state: Arc<WebhookState>) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |req| handle_request(req, Arc::clone(&state)));

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        error!("HTTP接続処理エラー: {err}");
    }
}

/// HTTPリクエストを処理する
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<WebhookState>,
) -> Result<Response<String>, Infallible> {
    if req.method() == Method::POST && req.uri().path() == CALLBACK_PATH {
        return Ok(handle_callback(req, state).await);
    }

    debug!("未対応のリクエスト: {} {}", req.method(), req.uri().path());
    Ok(text_response(StatusCode::NOT_FOUND, "Not Found"))
}

/// Webhook 配信を処理する
///
/// 署名不正とボディ不正は 400、上限超過は 413 を返し、
/// それ以外は返信の成否に関係なく 200 を返す
async fn handle_callback(req: Request<Incoming>, state: Arc<WebhookState>) -> Response<String> {
    let request_id = Uuid::new_v4();

    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let declared_length = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    if declared_length.is_some_and(|length| length > MAX_BODY_BYTES as u64) {
        error!("[{request_id}] リクエストボディが上限を超えています: {declared_length:?} bytes");
        return text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
    }

    let body = match read_limited_body(req.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(BodyReadError::TooLarge) => {
            error!("[{request_id}] リクエストボディが上限 {MAX_BODY_BYTES} bytes を超えています");
            return text_response(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large");
        }
        Err(BodyReadError::Failed(e)) => {
            error!("[{request_id}] リクエストボディの読み取りに失敗しました: {e}");
            return text_response(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    debug!(
        "[{request_id}] Webhookを受信しました: {}",
        String::from_utf8_lossy(&body)
    );

    if let Err(e) = verify_signature(&state.channel_secret, &body, signature.as_deref()) {
        e.log(&format!("[{request_id}] 署名検証"));
        return text_response(StatusCode::BAD_REQUEST, "Bad Request");
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            AppError::from(e).log(&format!("[{request_id}] Webhookボディ解析"));
            return text_response(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    for event in &payload.events {
        let Some(TextMessageEvent {
            user_id,
            text,
            reply_token,
        }) = event.as_text_message()
        else {
            debug!("[{request_id}] 対象外のイベントを無視します: {}", event.event_type);
            continue;
        };

        info!("[{request_id}] メッセージを受信しました (user_id: {user_id}): {text}");

        // SQLite へのアクセスはブロッキングのため専用スレッドで実行する
        let worker = Arc::clone(&state);
        let worker_user_id = user_id.clone();
        let reply = match tokio::task::spawn_blocking(move || {
            worker.dispatcher.handle(&worker_user_id, &text)
        })
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!("[{request_id}] コマンド処理が異常終了しました (user_id: {user_id}): {e}");
                continue;
            }
        };

        info!("[{request_id}] 返信を送信します (user_id: {user_id}): {reply}");

        if let Err(e) = state.sender.reply(&reply_token, &reply).await {
            e.log(&format!("[{request_id}] 返信送信失敗 (user_id: {user_id})"));
        }
    }

    text_response(StatusCode::OK, "OK")
}

/// ボディ読み取りの失敗
#[derive(Debug)]
enum BodyReadError {
    /// 上限を超えた
    TooLarge,
    Failed(String),
}

/// 上限付きでリクエストボディを読み取る
///
/// 上限を超えた時点で読み取りを打ち切る
async fn read_limited_body<B>(body: B, limit: usize) -> Result<Bytes, BodyReadError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(BodyReadError::TooLarge),
        Err(e) => Err(BodyReadError::Failed(e.to_string())),
    }
}

fn text_response(status: StatusCode, body: &str) -> Response<String> {
    let mut response = Response::new(body.to_string());
    *response.status_mut() = status;
    response
}
