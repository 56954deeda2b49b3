//! 返信メッセージの文言
//!
//! ユーザー向けの返信はすべて繁体字中国語で返す

use crate::features::expenses::models::{MAX_CATEGORY_CHARS, MAX_DESCRIPTION_CHARS};
use crate::features::expenses::period::MonthPeriod;

pub const RECORD_USAGE: &str = "請輸入格式：記帳 項目 金額 類別";
pub const RECORD_FORMAT_ERROR: &str = "格式錯誤，請輸入：記帳 項目 金額 類別";
pub const AMOUNT_NOT_NUMBER: &str = "金額格式錯誤，請輸入數字，例如：記帳 午餐 120 飲食";
pub const AMOUNT_NOT_POSITIVE: &str = "金額必須大於 0";
pub const RECORD_FAILED: &str = "❌ 記帳失敗，請稍後再試";

pub const TOTAL_FORMAT_ERROR: &str = "格式錯誤，請輸入：總額 或 總額 YYYY-MM";
pub const TOTAL_FAILED: &str = "❌ 查詢總額失敗，請稍後再試";

pub const REPORT_FAILED: &str = "❌ 產生月報失敗，請稍後再試";

pub const DELETE_USAGE: &str = "請輸入格式：刪除 項目";
pub const DELETE_FAILED: &str = "❌ 刪除失敗，請稍後再試";

pub const ADD_CATEGORY_USAGE: &str = "請輸入格式：新增類別 類別名稱";
pub const CATEGORY_FAILED: &str = "❌ 類別操作失敗，請稍後再試";
pub const NO_CATEGORIES: &str = "📂 尚未設定任何類別，請輸入：新增類別 類別名稱";

pub const HELP: &str = "🤖 指令錯誤，請輸入：記帳、總額、月報、全體月報、刪除、新增類別 或 類別";

pub fn report_format_error(keyword: &str) -> String {
    format!("格式錯誤，請輸入：{keyword} 或 {keyword} YYYY-MM")
}

pub fn description_too_long() -> String {
    format!("項目名稱不可超過 {MAX_DESCRIPTION_CHARS} 個字")
}

pub fn category_too_long() -> String {
    format!("類別名稱不可超過 {MAX_CATEGORY_CHARS} 個字")
}

pub fn category_not_allowed(category: &str) -> String {
    format!("類別「{category}」尚未設定，請先輸入：新增類別 {category}")
}

pub fn recorded(description: &str, amount: f64, category: &str) -> String {
    format!("✅ 已記帳：{description} - {amount} 元 - {category}")
}

pub fn total(period: &MonthPeriod, total: f64, count: i64) -> String {
    format!("💰 {period} 總支出：{total:.0} 元，共 {count} 筆 (個人)")
}

pub fn deleted(description: &str) -> String {
    format!("🗑️ 已刪除最近一筆「{description}」記錄")
}

pub fn category_added(name: &str) -> String {
    format!("✅ 已新增類別：{name}")
}

pub fn category_already_exists(name: &str) -> String {
    format!("ℹ️ 類別「{name}」已存在")
}

pub fn category_list(names: &[String]) -> String {
    format!("📂 你的類別：{}", names.join("、"))
}
