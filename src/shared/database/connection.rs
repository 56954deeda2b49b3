use crate::shared::errors::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を開き、テーブルを準備する
///
/// # 引数
/// * `database_path` - SQLite データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. 親ディレクトリの確保
/// 2. データベース接続の開設
/// 3. テーブルとインデックスの作成
pub fn open_database(database_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::configuration(format!("データベースディレクトリの作成に失敗: {e}"))
            })?;
            log::info!("データベースディレクトリを作成: {parent:?}");
        }
    }

    let conn = Connection::open(database_path)?;
    create_tables(&conn)?;

    log::info!("データベースを初期化しました: {database_path:?}");

    Ok(conn)
}

/// メモリ上のデータベースを開く（テスト・検証用）
pub fn open_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

/// データベーステーブルを作成する
///
/// 既存のテーブルには手を加えない（CREATE ... IF NOT EXISTS のみ）
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_expenses_table(conn)?;
    create_user_categories_table(conn)?;
    create_indexes(conn)?;
    Ok(())
}

/// 経費テーブルを作成する
///
/// expense_date は RFC 3339（UTC, ミリ秒, "Z" 付き）の固定長文字列で保存し、
/// 文字列比較が時系列順と一致するようにする
fn create_expenses_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK(amount > 0),
            category TEXT NOT NULL,
            expense_date TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// ユーザー別の許可類別テーブルを作成する
fn create_user_categories_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, name)
        )",
        [],
    )?;

    Ok(())
}

/// インデックスを作成する
fn create_indexes(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_user_date ON expenses(user_id, expense_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(expense_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_expenses_user_description ON expenses(user_id, description)",
        [],
    )?;

    Ok(())
}
