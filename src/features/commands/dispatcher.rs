use super::messages;
use super::parser::{parse_command, Command};
use crate::features::expenses::models::{MAX_CATEGORY_CHARS, MAX_DESCRIPTION_CHARS};
use crate::features::expenses::period::MonthPeriod;
use crate::features::reports::{build_report, render_report, ReportScope};
use crate::shared::config::BotConfig;
use crate::shared::database::ExpenseStore;
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

/// コマンドを処理して返信文を作るディスパッチャー
///
/// ストアと設定は起動時に構築したものを受け取り、以降は読み取り専用で使う
pub struct CommandDispatcher {
    store: Arc<dyn ExpenseStore>,
    config: BotConfig,
}

impl CommandDispatcher {
    pub fn new(store: Arc<dyn ExpenseStore>, config: BotConfig) -> Self {
        Self { store, config }
    }

    /// 受信メッセージを処理し、返信文を返す
    ///
    /// どのような失敗でも返信文は必ず返す
    pub fn handle(&self, user_id: &str, text: &str) -> String {
        self.handle_at(user_id, text, Utc::now())
    }

    /// 現在時刻を指定してメッセージを処理する
    ///
    /// # 引数
    /// * `user_id` - 送信者のユーザーID
    /// * `text` - メッセージ本文
    /// * `now` - 記帳時刻と当月の判定に使う時刻
    pub fn handle_at(&self, user_id: &str, text: &str, now: DateTime<Utc>) -> String {
        let command = match parse_command(text) {
            Ok(command) => command,
            Err(error) => {
                error.log(&format!("コマンド解析 (user_id: {user_id})"));
                return error.user_message().to_string();
            }
        };

        let context = format!("{command:?} (user_id: {user_id})");

        let (result, failure_message) = match command {
            Command::RecordUsage => (Ok(messages::RECORD_USAGE.to_string()), ""),
            Command::Record {
                description,
                amount,
                category,
            } => (
                self.record(user_id, &description, amount, &category, now),
                messages::RECORD_FAILED,
            ),
            Command::Total { period } => (
                self.total(user_id, period.unwrap_or_else(|| MonthPeriod::current(now))),
                messages::TOTAL_FAILED,
            ),
            Command::Report { period, scope } => (
                self.report(
                    user_id,
                    period.unwrap_or_else(|| MonthPeriod::current(now)),
                    scope,
                    now,
                ),
                messages::REPORT_FAILED,
            ),
            Command::DeleteUsage => (Ok(messages::DELETE_USAGE.to_string()), ""),
            Command::Delete { description } => {
                (self.delete(user_id, &description), messages::DELETE_FAILED)
            }
            Command::AddCategoryUsage => (Ok(messages::ADD_CATEGORY_USAGE.to_string()), ""),
            Command::AddCategory { name } => {
                (self.add_category(user_id, &name), messages::CATEGORY_FAILED)
            }
            Command::ListCategories => (self.list_categories(user_id), messages::CATEGORY_FAILED),
            Command::Help => (Ok(messages::HELP.to_string()), ""),
        };

        match result {
            Ok(reply) => reply,
            Err(error) => {
                error.log(&context);
                if error.is_user_facing() {
                    error.user_message().to_string()
                } else {
                    failure_message.to_string()
                }
            }
        }
    }

    fn record(
        &self,
        user_id: &str,
        description: &str,
        amount: f64,
        category: &str,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        if amount <= 0.0 {
            return Err(AppError::validation(messages::AMOUNT_NOT_POSITIVE));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(AppError::validation(messages::description_too_long()));
        }
        if category.chars().count() > MAX_CATEGORY_CHARS {
            return Err(AppError::validation(messages::category_too_long()));
        }
        if self.config.category_validation && !self.store.category_exists(user_id, category)? {
            return Err(AppError::validation(messages::category_not_allowed(category)));
        }

        let id = self
            .store
            .insert_expense(user_id, description, amount, category, now)?;
        info!("記帳成功 (user_id: {user_id}, id: {id}): {description} - {amount} - {category}");

        Ok(messages::recorded(description, amount, category))
    }

    fn total(&self, user_id: &str, period: MonthPeriod) -> AppResult<String> {
        let summary = self
            .store
            .sum_and_count(user_id, period.start(), period.end())?;
        Ok(messages::total(&period, summary.total, summary.count))
    }

    fn report(
        &self,
        user_id: &str,
        period: MonthPeriod,
        scope: ReportScope,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let filter = match scope {
            ReportScope::Personal => Some(user_id),
            ReportScope::AllUsers => None,
        };
        let records = self
            .store
            .list_in_range(period.start(), period.end(), filter)?;
        let report = build_report(&records, self.config.report_item_limit);

        Ok(render_report(&report, &period, scope, now))
    }

    fn delete(&self, user_id: &str, description: &str) -> AppResult<String> {
        let Some(latest) = self
            .store
            .find_latest_by_description(user_id, description)?
        else {
            return Err(AppError::not_found(description));
        };

        // 検索後に別リクエストで削除済みなら見つからなかった扱い
        if self.store.delete_by_id(latest.id)? {
            info!("削除成功 (user_id: {user_id}, id: {})", latest.id);
            Ok(messages::deleted(description))
        } else {
            Err(AppError::not_found(description))
        }
    }

    fn add_category(&self, user_id: &str, name: &str) -> AppResult<String> {
        if name.chars().count() > MAX_CATEGORY_CHARS {
            return Err(AppError::validation(messages::category_too_long()));
        }

        if self.store.add_category(user_id, name)? {
            Ok(messages::category_added(name))
        } else {
            Ok(messages::category_already_exists(name))
        }
    }

    fn list_categories(&self, user_id: &str) -> AppResult<String> {
        let names = self.store.list_categories(user_id)?;
        if names.is_empty() {
            Ok(messages::NO_CATEGORIES.to_string())
        } else {
            Ok(messages::category_list(&names))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expenses::models::{ExpenseRecord, ExpenseTotal};
    use crate::shared::database::SqliteStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 10, 30, 0).unwrap()
    }

    fn dispatcher_with(config: BotConfig) -> (CommandDispatcher, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let dispatcher = CommandDispatcher::new(store.clone(), config);
        (dispatcher, store)
    }

    fn dispatcher() -> (CommandDispatcher, Arc<SqliteStore>) {
        dispatcher_with(BotConfig::default())
    }

    fn month_records(store: &SqliteStore, user_id: Option<&str>) -> Vec<ExpenseRecord> {
        let period = MonthPeriod::current(now());
        store
            .list_in_range(period.start(), period.end(), user_id)
            .unwrap()
    }

    #[test]
    fn test_record_inserts_one_row_and_echoes_fields() {
        let (dispatcher, store) = dispatcher();

        let reply = dispatcher.handle_at("A", "記帳 午餐 120 飲食", now());

        assert_eq!(reply, "✅ 已記帳：午餐 - 120 元 - 飲食");
        let records = month_records(&store, Some("A"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "午餐");
        assert_eq!(records[0].amount, 120.0);
        assert_eq!(records[0].category, "飲食");
        assert_eq!(records[0].expense_date, now());
    }

    #[test]
    fn test_non_numeric_amount_is_rejected_without_insert() {
        let (dispatcher, store) = dispatcher();

        let reply = dispatcher.handle_at("A", "記帳 摩天輪 abc food", now());

        assert_eq!(reply, messages::AMOUNT_NOT_NUMBER);
        assert!(month_records(&store, None).is_empty());
    }

    #[test]
    fn test_non_positive_amount_is_rejected_without_insert() {
        let (dispatcher, store) = dispatcher();

        assert_eq!(
            dispatcher.handle_at("A", "記帳 午餐 0 飲食", now()),
            messages::AMOUNT_NOT_POSITIVE
        );
        assert_eq!(
            dispatcher.handle_at("A", "記帳 午餐 -3 飲食", now()),
            messages::AMOUNT_NOT_POSITIVE
        );
        assert!(month_records(&store, None).is_empty());
    }

    #[test]
    fn test_overlong_text_is_rejected() {
        let (dispatcher, store) = dispatcher();
        let long_description = "a".repeat(MAX_DESCRIPTION_CHARS + 1);
        let long_category = "類".repeat(MAX_CATEGORY_CHARS + 1);

        assert_eq!(
            dispatcher.handle_at("A", &format!("記帳 {long_description} 10 food"), now()),
            messages::description_too_long()
        );
        assert_eq!(
            dispatcher.handle_at("A", &format!("記帳 lunch 10 {long_category}"), now()),
            messages::category_too_long()
        );
        // 文字数はバイト数ではなく文字で数える
        let max_category = "類".repeat(MAX_CATEGORY_CHARS);
        assert!(dispatcher
            .handle_at("A", &format!("記帳 lunch 10 {max_category}"), now())
            .starts_with("✅"));
        assert_eq!(month_records(&store, None).len(), 1);
    }

    #[test]
    fn test_usage_and_help_replies() {
        let (dispatcher, _) = dispatcher();

        assert_eq!(dispatcher.handle_at("A", "記帳", now()), messages::RECORD_USAGE);
        assert_eq!(dispatcher.handle_at("A", "刪除", now()), messages::DELETE_USAGE);
        assert_eq!(
            dispatcher.handle_at("A", "新增類別", now()),
            messages::ADD_CATEGORY_USAGE
        );
        assert_eq!(dispatcher.handle_at("A", "你好", now()), messages::HELP);
        assert_eq!(
            dispatcher.handle_at("A", "記帳 午餐 120", now()),
            messages::RECORD_FORMAT_ERROR
        );
    }

    #[test]
    fn test_delete_most_recent_then_total() {
        let (dispatcher, store) = dispatcher();
        let earlier = now() - chrono::Duration::hours(2);

        dispatcher.handle_at("A", "記帳 lunch 120 food", earlier);
        dispatcher.handle_at("A", "記帳 lunch 80 food", now());

        assert_eq!(
            dispatcher.handle_at("A", "刪除 lunch", now()),
            "🗑️ 已刪除最近一筆「lunch」記錄"
        );

        let remaining = month_records(&store, Some("A"));
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].amount, 120.0);

        assert_eq!(
            dispatcher.handle_at("A", "總額", now()),
            "💰 2025-05 總支出：120 元，共 1 筆 (個人)"
        );
    }

    #[test]
    fn test_delete_not_found() {
        let (dispatcher, _) = dispatcher();
        dispatcher.handle_at("B", "記帳 lunch 50 food", now());

        assert_eq!(
            dispatcher.handle_at("A", "刪除 lunch", now()),
            "⚠️ 找不到「lunch」的記帳紀錄"
        );
    }

    #[test]
    fn test_total_for_requested_month() {
        let (dispatcher, _) = dispatcher();
        let december = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let january = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

        dispatcher.handle_at("A", "記帳 gift 500 fun", december);
        dispatcher.handle_at("A", "記帳 cake 99.6 food", january);

        assert_eq!(
            dispatcher.handle_at("A", "總額 2025-12", now()),
            "💰 2025-12 總支出：500 元，共 1 筆 (個人)"
        );
        assert_eq!(
            dispatcher.handle_at("A", "總額 2026-01", now()),
            "💰 2026-01 總支出：100 元，共 1 筆 (個人)"
        );
        assert_eq!(
            dispatcher.handle_at("A", "總額 2026-13", now()),
            crate::features::expenses::period::INVALID_MONTH_MESSAGE
        );
    }

    #[test]
    fn test_personal_and_all_users_reports() {
        let (dispatcher, _) = dispatcher();
        dispatcher.handle_at("A", "記帳 lunch 120 food", now());
        dispatcher.handle_at("B", "記帳 taxi 300 transport", now());

        let personal = dispatcher.handle_at("A", "月報", now());
        assert!(personal.starts_with("💰 2025-05 月度報表 💰"));
        assert!(personal.contains("- 總支出：120 元"));
        assert!(!personal.contains("transport"));
        assert!(personal.ends_with("⏰ 報表生成時間：2025-05-20 10:30 UTC"));

        let all = dispatcher.handle_at("A", "全體月報", now());
        assert!(all.starts_with("💰 2025-05 全體月度報表 💰"));
        assert!(all.contains("- 總支出：420 元"));
        assert!(all.contains("- transport: 300 元 (1 筆)"));

        let empty = dispatcher.handle_at("A", "月報 2024-01", now());
        assert!(empty.contains("(本月尚無支出記錄)"));
    }

    #[test]
    fn test_category_validation() {
        let (dispatcher, store) = dispatcher_with(BotConfig {
            category_validation: true,
            ..BotConfig::default()
        });

        assert_eq!(
            dispatcher.handle_at("A", "記帳 lunch 120 food", now()),
            messages::category_not_allowed("food")
        );
        assert!(month_records(&store, None).is_empty());

        assert_eq!(
            dispatcher.handle_at("A", "新增類別 food", now()),
            "✅ 已新增類別：food"
        );
        assert_eq!(
            dispatcher.handle_at("A", "新增類別 food", now()),
            "ℹ️ 類別「food」已存在"
        );
        assert!(dispatcher
            .handle_at("A", "記帳 lunch 120 food", now())
            .starts_with("✅"));
        assert_eq!(dispatcher.handle_at("A", "類別", now()), "📂 你的類別：food");
        assert_eq!(dispatcher.handle_at("B", "類別", now()), messages::NO_CATEGORIES);
    }

    /// 常に失敗するストア
    struct FailingStore;

    impl ExpenseStore for FailingStore {
        fn insert_expense(&self, _: &str, _: &str, _: f64, _: &str, _: DateTime<Utc>) -> AppResult<i64> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn sum_and_count(&self, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> AppResult<ExpenseTotal> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn list_in_range(
            &self,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
            _: Option<&str>,
        ) -> AppResult<Vec<ExpenseRecord>> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn find_latest_by_description(&self, _: &str, _: &str) -> AppResult<Option<ExpenseRecord>> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn delete_by_id(&self, _: i64) -> AppResult<bool> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn add_category(&self, _: &str, _: &str) -> AppResult<bool> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn list_categories(&self, _: &str) -> AppResult<Vec<String>> {
            Err(AppError::Database("disk I/O error".to_string()))
        }

        fn category_exists(&self, _: &str, _: &str) -> AppResult<bool> {
            Err(AppError::Database("disk I/O error".to_string()))
        }
    }

    #[test]
    fn test_store_failures_render_generic_messages() {
        let dispatcher = CommandDispatcher::new(Arc::new(FailingStore), BotConfig::default());

        assert_eq!(
            dispatcher.handle_at("A", "記帳 lunch 120 food", now()),
            messages::RECORD_FAILED
        );
        assert_eq!(dispatcher.handle_at("A", "總額", now()), messages::TOTAL_FAILED);
        assert_eq!(dispatcher.handle_at("A", "月報", now()), messages::REPORT_FAILED);
        assert_eq!(
            dispatcher.handle_at("A", "刪除 lunch", now()),
            messages::DELETE_FAILED
        );
        assert_eq!(
            dispatcher.handle_at("A", "新增類別 food", now()),
            messages::CATEGORY_FAILED
        );
        // 解析エラーはストアに触れずに返る
        assert_eq!(
            dispatcher.handle_at("A", "記帳 lunch abc food", now()),
            messages::AMOUNT_NOT_NUMBER
        );
    }

    /// 検索と削除の間に別リクエストが同じ行を削除した状況
    struct VanishingStore {
        inner: SqliteStore,
    }

    impl ExpenseStore for VanishingStore {
        fn insert_expense(&self, u: &str, d: &str, a: f64, c: &str, t: DateTime<Utc>) -> AppResult<i64> {
            self.inner.insert_expense(u, d, a, c, t)
        }

        fn sum_and_count(&self, u: &str, s: DateTime<Utc>, e: DateTime<Utc>) -> AppResult<ExpenseTotal> {
            self.inner.sum_and_count(u, s, e)
        }

        fn list_in_range(
            &self,
            s: DateTime<Utc>,
            e: DateTime<Utc>,
            u: Option<&str>,
        ) -> AppResult<Vec<ExpenseRecord>> {
            self.inner.list_in_range(s, e, u)
        }

        fn find_latest_by_description(&self, u: &str, d: &str) -> AppResult<Option<ExpenseRecord>> {
            let found = self.inner.find_latest_by_description(u, d)?;
            if let Some(record) = &found {
                self.inner.delete_by_id(record.id)?;
            }
            Ok(found)
        }

        fn delete_by_id(&self, id: i64) -> AppResult<bool> {
            self.inner.delete_by_id(id)
        }

        fn add_category(&self, u: &str, n: &str) -> AppResult<bool> {
            self.inner.add_category(u, n)
        }

        fn list_categories(&self, u: &str) -> AppResult<Vec<String>> {
            self.inner.list_categories(u)
        }

        fn category_exists(&self, u: &str, n: &str) -> AppResult<bool> {
            self.inner.category_exists(u, n)
        }
    }

    #[test]
    fn test_delete_race_reports_not_found() {
        let store = VanishingStore {
            inner: SqliteStore::open_in_memory().unwrap(),
        };
        store.insert_expense("A", "lunch", 120.0, "food", now()).unwrap();
        let dispatcher = CommandDispatcher::new(Arc::new(store), BotConfig::default());

        assert_eq!(
            dispatcher.handle_at("A", "刪除 lunch", now()),
            "⚠️ 找不到「lunch」的記帳紀錄"
        );
    }
}
