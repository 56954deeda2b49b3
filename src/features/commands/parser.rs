use super::messages;
use crate::features::expenses::period::MonthPeriod;
use crate::features::reports::ReportScope;
use crate::shared::errors::{AppError, AppResult};

pub const RECORD_KEYWORD: &str = "記帳";
pub const TOTAL_KEYWORD: &str = "總額";
pub const REPORT_KEYWORD: &str = "月報";
pub const ALL_USERS_REPORT_KEYWORD: &str = "全體月報";
pub const DELETE_KEYWORD: &str = "刪除";
pub const ADD_CATEGORY_KEYWORD: &str = "新增類別";
pub const LIST_CATEGORIES_KEYWORD: &str = "類別";

/// 解析済みのコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 引数なしの「記帳」
    RecordUsage,
    Record {
        description: String,
        amount: f64,
        category: String,
    },
    /// period が None の場合は当月
    Total { period: Option<MonthPeriod> },
    Report {
        period: Option<MonthPeriod>,
        scope: ReportScope,
    },
    /// 引数なしの「刪除」
    DeleteUsage,
    Delete { description: String },
    /// 引数なしの「新增類別」
    AddCategoryUsage,
    AddCategory { name: String },
    ListCategories,
    /// 認識できない入力
    Help,
}

/// メッセージ本文をコマンドに変換する
///
/// 先頭トークンをキーワードと完全一致で照合する（大文字小文字の変換や
/// 部分一致は行わない）。キーワードの直後に空白がない入力は Help になる。
///
/// # 戻り値
/// コマンド、または引数の形が不正な場合は形式エラー
pub fn parse_command(text: &str) -> AppResult<Command> {
    let text = text.trim();
    let (keyword, rest) = match text.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (text, ""),
    };

    match keyword {
        RECORD_KEYWORD if rest.is_empty() => Ok(Command::RecordUsage),
        RECORD_KEYWORD => parse_record(text),
        TOTAL_KEYWORD => Ok(Command::Total {
            period: parse_optional_month(rest, messages::TOTAL_FORMAT_ERROR)?,
        }),
        REPORT_KEYWORD => Ok(Command::Report {
            period: parse_optional_month(rest, &messages::report_format_error(REPORT_KEYWORD))?,
            scope: ReportScope::Personal,
        }),
        ALL_USERS_REPORT_KEYWORD => Ok(Command::Report {
            period: parse_optional_month(
                rest,
                &messages::report_format_error(ALL_USERS_REPORT_KEYWORD),
            )?,
            scope: ReportScope::AllUsers,
        }),
        DELETE_KEYWORD if rest.is_empty() => Ok(Command::DeleteUsage),
        DELETE_KEYWORD => Ok(Command::Delete {
            description: rest.to_string(),
        }),
        ADD_CATEGORY_KEYWORD if rest.is_empty() => Ok(Command::AddCategoryUsage),
        ADD_CATEGORY_KEYWORD => Ok(Command::AddCategory {
            name: rest.to_string(),
        }),
        LIST_CATEGORIES_KEYWORD if rest.is_empty() => Ok(Command::ListCategories),
        _ => Ok(Command::Help),
    }
}

/// 「記帳 項目 金額 類別」を解析する
fn parse_record(text: &str) -> AppResult<Command> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [_, description, amount, category] = tokens.as_slice() else {
        return Err(AppError::format(messages::RECORD_FORMAT_ERROR));
    };

    Ok(Command::Record {
        description: description.to_string(),
        amount: parse_amount(amount)?,
        category: category.to_string(),
    })
}

/// 金額を解析する（NaN・無限大は数値として扱わない）
fn parse_amount(value: &str) -> AppResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| AppError::format(messages::AMOUNT_NOT_NUMBER))
}

fn parse_optional_month(rest: &str, usage: &str) -> AppResult<Option<MonthPeriod>> {
    let mut args = rest.split_whitespace();
    match (args.next(), args.next()) {
        (None, _) => Ok(None),
        (Some(month), None) => MonthPeriod::parse(month).map(Some),
        (Some(_), Some(_)) => Err(AppError::format(usage)),
    }
}
