/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

impl Environment {
    /// 環境名の文字列から実行環境を判定する
    ///
    /// "production" 以外はすべて開発環境として扱う
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// ENVIRONMENT の値から実行環境を決める
    ///
    /// 未設定・空文字の場合は開発環境
    pub fn resolve(value: Option<&str>) -> Self {
        value
            .filter(|name| !name.trim().is_empty())
            .map(Self::from_name)
            .unwrap_or(Environment::Development)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    /// LOG_LEVEL 未設定時のログレベル
    fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
        }
    }
}

/// ログ出力に関する環境設定
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: Environment,
    /// ログレベル
    pub log_level: String,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        Self::new(get_environment(), std::env::var("LOG_LEVEL").ok())
    }

    /// 実行環境と LOG_LEVEL の値から設定を作成する
    pub fn new(environment: Environment, log_level: Option<String>) -> Self {
        let log_level = log_level
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| environment.default_log_level().to_string());

        Self {
            environment,
            log_level,
        }
    }

    /// ログレベル文字列をフィルターに変換する
    ///
    /// 不明な値は Info として扱う
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level.trim().to_lowercase().as_str() {
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "info" => log::LevelFilter::Info,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}

/// プロセスの環境変数 ENVIRONMENT から実行環境を判定する
///
/// 設定読み込み（AppConfig）と同じ判定規則を使う
pub fn get_environment() -> Environment {
    Environment::resolve(std::env::var("ENVIRONMENT").ok().as_deref())
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_expenses.db"
/// - プロダクション環境: "expenses.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_expenses.db",
        Environment::Production => "expenses.db",
    }
}

/// 環境に応じた.envファイルを読み込む
///
/// .envファイルが存在しない場合は、プロセスの環境変数が
/// 直接設定されているものとして続行する
pub fn load_environment_variables() {
    let environment = get_environment();

    let env_file = match environment {
        Environment::Production => ".env.production",
        Environment::Development => ".env",
    };

    log::info!("環境: {}, 読み込み対象: {env_file}", environment.name());

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            // 環境固有のファイルがない場合は、デフォルトの.envを試行
            if env_file != ".env" && dotenv::dotenv().is_ok() {
                log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
            } else {
                log::warn!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// 二重初期化はエラーにせず無視する（テストからの呼び出しを考慮）
pub fn initialize_logging_system() {
    let env_config = EnvironmentConfig::from_env();

    let result = env_logger::Builder::from_default_env()
        .filter_level(env_config.level_filter())
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if result.is_ok() {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            env_config.log_level,
            env_config.environment.name()
        );
    }
}
