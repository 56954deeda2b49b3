/// 実行環境の判定とログ初期化
pub mod environment;

/// 起動時に読み込むアプリケーション設定
pub mod app_config;

pub use app_config::{AppConfig, BotConfig, DatabaseConfig, LineConfig, ServerConfig};
pub use environment::{
    get_database_filename, get_environment, initialize_logging_system,
    load_environment_variables, Environment, EnvironmentConfig,
};
