pub mod features;
pub mod shared;

use features::commands::CommandDispatcher;
use features::webhook::{serve, LineMessagingClient, WebhookState};
use log::{error, info};
use shared::config::{initialize_logging_system, load_environment_variables, AppConfig};
use shared::database::SqliteStore;
use shared::errors::AppResult;
use std::sync::Arc;
use tokio::net::TcpListener;

/// 設定から共有状態を構築する
///
/// # 処理内容
/// 1. データベースを開いてテーブルを準備
/// 2. 返信APIクライアントを作成
/// 3. ディスパッチャーを作成
pub fn build_state(config: &AppConfig) -> AppResult<WebhookState> {
    info!("データベースを初期化しています: {:?}", config.database.path);
    let store = Arc::new(SqliteStore::open(&config.database.path)?);

    let sender = Arc::new(LineMessagingClient::new(&config.line)?);
    info!("返信APIの送信先: {}", sender.reply_url());

    Ok(WebhookState {
        channel_secret: config.line.channel_secret.clone(),
        dispatcher: CommandDispatcher::new(store, config.bot.clone()),
        sender,
    })
}

/// アプリケーションを起動する
///
/// Ctrl-C を受信するまで Webhook を処理し続ける
pub async fn run() -> AppResult<()> {
    load_environment_variables();
    initialize_logging_system();

    info!("アプリケーション初期化を開始します...");

    let config = AppConfig::from_env()?;
    info!("設定を読み込みました: environment={:?}", config.environment);
    log::debug!("LINE設定: {:?}", config.line);

    let state = Arc::new(build_state(&config)?);

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("アプリケーション初期化が完了しました");

    serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("停止シグナルの待機に失敗しました: {e}");
        }
    })
    .await
}
