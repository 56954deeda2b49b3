use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("月パターンの正規表現が不正です"));

/// 年月の指定が不正な場合のメッセージ
pub const INVALID_MONTH_MESSAGE: &str = "月份格式錯誤，請輸入 YYYY-MM，例如：2025-01";

/// 集計対象の月（UTC）
///
/// 範囲は [月初の瞬間, 翌月初の瞬間) の半開区間として扱う
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// 年と月から期間を作成する
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(AppError::format(INVALID_MONTH_MESSAGE));
        }
        Ok(Self { year, month })
    }

    /// 指定時刻を含む月を取得する
    pub fn current(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    /// "YYYY-MM" 形式の文字列を解析する
    ///
    /// # 戻り値
    /// 期間、または形式が不正な場合は形式エラー
    pub fn parse(value: &str) -> AppResult<Self> {
        let captures = MONTH_PATTERN
            .captures(value.trim())
            .ok_or_else(|| AppError::format(INVALID_MONTH_MESSAGE))?;

        let year: i32 = captures[1]
            .parse()
            .map_err(|_| AppError::format(INVALID_MONTH_MESSAGE))?;
        let month: u32 = captures[2]
            .parse()
            .map_err(|_| AppError::format(INVALID_MONTH_MESSAGE))?;

        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 月初の瞬間
    pub fn start(&self) -> DateTime<Utc> {
        first_instant(self.year, self.month)
    }

    /// 翌月初の瞬間（範囲には含まない）
    pub fn end(&self) -> DateTime<Utc> {
        let next = self.next();
        first_instant(next.year, next.month)
    }

    /// 翌月
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// "YYYY-MM" 形式のラベル
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn first_instant(year: i32, month: u32) -> DateTime<Utc> {
    // new() で検証済みの年月のみが渡される
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
