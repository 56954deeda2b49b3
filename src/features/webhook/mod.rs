/// LINE Webhook 機能モジュール
///
/// 署名検証、イベントの解析、返信APIの呼び出し、HTTPサーバーを提供します。
pub mod client;
pub mod models;
pub mod server;
pub mod signature;

pub use client::{LineMessagingClient, ReplySender};
pub use server::{serve, WebhookState, CALLBACK_PATH};
