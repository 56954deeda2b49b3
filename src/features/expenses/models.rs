use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// 項目名の最大文字数
pub const MAX_DESCRIPTION_CHARS: usize = 50;

/// 類別名の最大文字数
pub const MAX_CATEGORY_CHARS: usize = 20;

/// 経費データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub expense_date: DateTime<Utc>,
}

/// 経費作成用DTO
#[derive(Debug, Deserialize, Clone)]
pub struct NewExpense {
    pub user_id: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub expense_date: DateTime<Utc>,
}

/// 期間内の合計金額と件数
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Default)]
pub struct ExpenseTotal {
    pub total: f64,
    pub count: i64,
}

/// タイムスタンプを保存用の文字列に変換する
///
/// 常に UTC・ミリ秒・"Z" 付きの固定長になるため、文字列順が時系列順と一致する
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 保存用の文字列からタイムスタンプを復元する
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_format_is_fixed_width_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_timestamp(&ts), "2025-12-31T23:59:59.000Z");
    }

    #[test]
    fn test_parse_timestamp_normalizes_offset() {
        let parsed = parse_timestamp("2025-01-01T09:00:00+09:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_lexical_order_matches_chronological_order() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }
}
