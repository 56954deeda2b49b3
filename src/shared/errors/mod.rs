use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// コマンド引数の形式エラー（トークン数・数値・年月の解析失敗）
    #[error("形式エラー: {0}")]
    Format(String),

    /// 形式は正しいが意味的に不正な入力
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベース関連のエラー
    #[error("データベースエラー: {0}")]
    Database(String),

    /// 外部サービス連携でのエラー（LINE Messaging API）
    #[error("外部サービスエラー: {0}")]
    ExternalService(String),

    /// セキュリティ関連のエラー（署名検証失敗など）
    #[error("セキュリティエラー: {0}")]
    Security(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（データベースエラーなど）
    High,
    /// 最重要（セキュリティエラーなど）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのメッセージを取得
    ///
    /// 形式・バリデーション・未発見エラーはメッセージをそのまま返す。
    /// それ以外は内部情報を含めない固定文言を返す。
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Format(msg) => msg,
            AppError::Validation(msg) => msg,
            AppError::NotFound(msg) => msg,
            AppError::Database(_) => "❌ 資料庫發生錯誤，請稍後再試",
            AppError::ExternalService(_) => "❌ 外部服務發生錯誤，請稍後再試",
            AppError::Security(_) => "❌ 簽名驗證失敗",
            AppError::Configuration(_) => "❌ 設定錯誤",
            AppError::Io(_) => "❌ 系統發生錯誤，請稍後再試",
            AppError::Json(_) => "❌ 資料格式錯誤",
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Format(_) => ErrorSeverity::Low,
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Database(_) => ErrorSeverity::High,
            AppError::ExternalService(_) => ErrorSeverity::Medium,
            AppError::Security(_) => ErrorSeverity::Critical,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
        }
    }

    /// ユーザー入力起因のエラーかどうか
    ///
    /// trueの場合はメッセージをそのまま返信に使ってよい
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Format(_) | AppError::Validation(_) | AppError::NotFound(_)
        )
    }

    /// 重要度に応じたログレベルでエラーを記録する
    ///
    /// # 引数
    /// * `context` - 発生箇所を示す文脈（ユーザーIDなど）
    pub fn log(&self, context: &str) {
        match self.severity() {
            ErrorSeverity::Low => log::warn!("{context}: {self}"),
            ErrorSeverity::Medium | ErrorSeverity::High => log::error!("{context}: {self}"),
            ErrorSeverity::Critical => log::error!("[CRITICAL] {context}: {self}"),
        }
    }

    /// 形式エラーを作成するヘルパー関数
    pub fn format<S: Into<String>>(message: S) -> Self {
        AppError::Format(message.into())
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// 記帳紀錄が見つからない場合のエラーを作成するヘルパー関数
    ///
    /// メッセージはそのまま返信に使われる
    ///
    /// # 引数
    /// * `description` - 見つからなかった項目名
    pub fn not_found<S: Into<String>>(description: S) -> Self {
        AppError::NotFound(format!("⚠️ 找不到「{}」的記帳紀錄", description.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `service` - サービス名
    /// * `message` - エラーメッセージ
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        AppError::ExternalService(format!("{}: {}", service.into(), message.into()))
    }

    /// セキュリティエラーを作成するヘルパー関数
    pub fn security<S: Into<String>>(message: S) -> Self {
        AppError::Security(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// rusqlite::ErrorからAppErrorへの変換
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::Database(error.to_string())
    }
}

/// reqwest::ErrorからAppErrorへの変換
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::ExternalService(format!("HTTP通信エラー: {error}"))
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
