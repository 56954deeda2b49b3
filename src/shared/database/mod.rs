/// データベース接続とスキーマ管理
pub mod connection;

/// 経費ストアの抽象と SQLite 実装
pub mod store;

pub use connection::{create_tables, open_database, open_in_memory};
pub use store::{ExpenseStore, SqliteStore};
