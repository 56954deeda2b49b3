use crate::features::categories;
use crate::features::expenses::models::{ExpenseRecord, ExpenseTotal, NewExpense};
use crate::features::expenses::repository;
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// 経費データの永続化境界
///
/// コマンド処理はこのトレイトだけを通してデータベースにアクセスする。
/// 各操作は1つのSQL文に対応し、結果は常に `AppResult` で返す。
pub trait ExpenseStore: Send + Sync {
    /// 経費を記録し、採番されたIDを返す
    fn insert_expense(
        &self,
        user_id: &str,
        description: &str,
        amount: f64,
        category: &str,
        timestamp: DateTime<Utc>,
    ) -> AppResult<i64>;

    /// ユーザーの [start, end) の合計金額と件数
    fn sum_and_count(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<ExpenseTotal>;

    /// [start, end) の経費一覧（user_id が None の場合は全ユーザー）
    fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user_id: Option<&str>,
    ) -> AppResult<Vec<ExpenseRecord>>;

    /// ユーザーの指定項目のうち最新の経費
    fn find_latest_by_description(
        &self,
        user_id: &str,
        description: &str,
    ) -> AppResult<Option<ExpenseRecord>>;

    /// IDで経費を削除する（削除した場合は true）
    fn delete_by_id(&self, id: i64) -> AppResult<bool>;

    /// 許可類別を追加する（新規追加の場合は true）
    fn add_category(&self, user_id: &str, name: &str) -> AppResult<bool>;

    /// 許可類別を登録順で取得する
    fn list_categories(&self, user_id: &str) -> AppResult<Vec<String>>;

    /// 類別が許可類別に含まれるか
    fn category_exists(&self, user_id: &str, name: &str) -> AppResult<bool>;
}

/// SQLite を使った ExpenseStore 実装
///
/// 接続は Mutex で保護し、1操作ごとにロックを取得する
pub struct SqliteStore {
    db: Mutex<Connection>,
}

impl SqliteStore {
    /// 既存の接続から作成する（テーブルは作成済みであること）
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// データベースファイルを開いて作成する
    pub fn open(path: &Path) -> AppResult<Self> {
        let conn = super::connection::open_database(path)?;
        Ok(Self::new(conn))
    }

    /// メモリ上のデータベースで作成する
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = super::connection::open_in_memory()?;
        Ok(Self::new(conn))
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|e| AppError::Database(format!("データベースロック取得失敗: {e}")))
    }
}

impl ExpenseStore for SqliteStore {
    fn insert_expense(
        &self,
        user_id: &str,
        description: &str,
        amount: f64,
        category: &str,
        timestamp: DateTime<Utc>,
    ) -> AppResult<i64> {
        let expense = NewExpense {
            user_id: user_id.to_string(),
            description: description.to_string(),
            amount,
            category: category.to_string(),
            expense_date: timestamp,
        };
        let db = self.lock()?;
        repository::insert(&db, &expense)
    }

    fn sum_and_count(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<ExpenseTotal> {
        let db = self.lock()?;
        repository::sum_and_count(&db, user_id, &start, &end)
    }

    fn list_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        user_id: Option<&str>,
    ) -> AppResult<Vec<ExpenseRecord>> {
        let db = self.lock()?;
        repository::list_in_range(&db, &start, &end, user_id)
    }

    fn find_latest_by_description(
        &self,
        user_id: &str,
        description: &str,
    ) -> AppResult<Option<ExpenseRecord>> {
        let db = self.lock()?;
        repository::find_latest_by_description(&db, user_id, description)
    }

    fn delete_by_id(&self, id: i64) -> AppResult<bool> {
        let db = self.lock()?;
        repository::delete_by_id(&db, id)
    }

    fn add_category(&self, user_id: &str, name: &str) -> AppResult<bool> {
        let db = self.lock()?;
        categories::add(&db, user_id, name)
    }

    fn list_categories(&self, user_id: &str) -> AppResult<Vec<String>> {
        let db = self.lock()?;
        categories::find_all_for_user(&db, user_id)
    }

    fn category_exists(&self, user_id: &str, name: &str) -> AppResult<bool> {
        let db = self.lock()?;
        categories::exists(&db, user_id, name)
    }
}
