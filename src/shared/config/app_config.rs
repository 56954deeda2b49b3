use super::environment::{get_database_filename, Environment};
use crate::features::reports::DEFAULT_ITEM_LIMIT;
use crate::shared::errors::{AppError, AppResult};
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// LINE Messaging API の既定エンドポイント
pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";

/// LINE チャネルの設定
#[derive(Clone)]
pub struct LineConfig {
    /// チャネルアクセストークン（返信APIの認証に使用）
    pub channel_access_token: String,
    /// チャネルシークレット（Webhook署名の検証に使用）
    pub channel_secret: String,
    /// Messaging API のベースURL
    pub api_base_url: Url,
    /// 返信API呼び出しのタイムアウト（秒）
    pub timeout_seconds: u64,
}

// 資格情報をログに出さないよう Debug は手動実装
impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_access_token", &mask(&self.channel_access_token))
            .field("channel_secret", &mask(&self.channel_secret))
            .field("api_base_url", &self.api_base_url.as_str())
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// HTTP サーバーの設定
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// データベースの設定
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite データベースファイルのパス
    pub path: PathBuf,
}

/// コマンド処理の設定
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// 記帳時にユーザーの登録済み類別で検証するか
    pub category_validation: bool,
    /// 月報で類別ごとに表示する明細の上限
    pub report_item_limit: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            category_validation: false,
            report_item_limit: DEFAULT_ITEM_LIMIT,
        }
    }
}

/// 起動時に一度だけ読み込まれ、以後変更されないアプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub line: LineConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub bot: BotConfig,
}

impl AppConfig {
    /// プロセスの環境変数から設定を読み込む
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// # 引数
    /// * `lookup` - 変数名から値を返す関数
    ///
    /// # 戻り値
    /// 設定、または必須項目の欠落・値の解析失敗時は設定エラー
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::resolve(lookup("ENVIRONMENT").as_deref());

        let api_base_url = match non_empty(&lookup, "LINE_API_BASE_URL") {
            Some(raw) => Url::parse(&raw)
                .map_err(|e| AppError::configuration(format!("LINE_API_BASE_URL: {e}")))?,
            None => Url::parse(DEFAULT_LINE_API_BASE_URL)
                .map_err(|e| AppError::configuration(format!("LINE_API_BASE_URL: {e}")))?,
        };

        let line = LineConfig {
            channel_access_token: required(&lookup, "LINE_CHANNEL_ACCESS_TOKEN")?,
            channel_secret: required(&lookup, "LINE_CHANNEL_SECRET")?,
            api_base_url,
            timeout_seconds: parsed_or(&lookup, "LINE_API_TIMEOUT_SECONDS", 30)?,
        };

        let server = ServerConfig {
            host: non_empty(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed_or(&lookup, "PORT", 5000)?,
        };

        let database = DatabaseConfig {
            path: non_empty(&lookup, "DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(get_database_filename(environment))),
        };

        let defaults = BotConfig::default();
        let report_item_limit: usize =
            parsed_or(&lookup, "REPORT_ITEM_LIMIT", defaults.report_item_limit)?;
        if report_item_limit == 0 {
            return Err(AppError::configuration(
                "REPORT_ITEM_LIMIT は1以上である必要があります",
            ));
        }
        let bot = BotConfig {
            category_validation: flag(&lookup, "CATEGORY_VALIDATION")?,
            report_item_limit,
        };

        Ok(Self {
            environment,
            line,
            server,
            database,
            bot,
        })
    }

    /// 待ち受けアドレス文字列を取得する
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// 必須の環境変数を取得する（未設定・空文字はエラー）
fn required<F>(lookup: &F, key: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .ok_or_else(|| AppError::configuration(format!("{key} が設定されていません")))
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 数値などの任意項目を解析する（未設定時は既定値）
fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| AppError::configuration(format!("{key} の値が不正です ({raw}): {e}"))),
        None => Ok(default),
    }
}

/// 真偽値フラグを解析する
fn flag<F>(lookup: &F, key: &str) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key).map(|v| v.to_lowercase()) {
        None => Ok(false),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::configuration(format!("{key} の値が不正です ({v})"))),
        },
    }
}

fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(4).collect();
    format!("{prefix}****")
}
