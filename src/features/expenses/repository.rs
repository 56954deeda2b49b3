use crate::features::expenses::models::{
    format_timestamp, parse_timestamp, ExpenseRecord, ExpenseTotal, NewExpense,
};
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

const SELECT_COLUMNS: &str = "SELECT id, user_id, description, amount, category, expense_date FROM expenses";

/// 行を経費モデルに変換する
fn map_row(row: &Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let raw_date: String = row.get(5)?;
    let expense_date = parse_timestamp(&raw_date).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(ExpenseRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        expense_date,
    })
}

/// 経費を作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `expense` - 経費作成用DTO
///
/// # 戻り値
/// 採番された経費ID、または失敗時はエラー
pub fn insert(conn: &Connection, expense: &NewExpense) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO expenses (user_id, description, amount, category, expense_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            expense.user_id,
            expense.description,
            expense.amount,
            expense.category,
            format_timestamp(&expense.expense_date)
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// ユーザーの期間内の合計金額と件数を取得する
///
/// # 引数
/// * `user_id` - ユーザーID
/// * `start` - 期間の開始（含む）
/// * `end` - 期間の終了（含まない）
pub fn sum_and_count(
    conn: &Connection,
    user_id: &str,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
) -> AppResult<ExpenseTotal> {
    let (total, count) = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0.0), COUNT(*)
         FROM expenses
         WHERE user_id = ?1 AND expense_date >= ?2 AND expense_date < ?3",
        params![user_id, format_timestamp(start), format_timestamp(end)],
        |row| Ok((row.get::<_, f64>(0)?, row.get::<_, i64>(1)?)),
    )?;

    Ok(ExpenseTotal { total, count })
}

/// 期間内の経費一覧を取得する（ユーザーで絞り込み可能）
///
/// # 引数
/// * `start` - 期間の開始（含む）
/// * `end` - 期間の終了（含まない）
/// * `user_id` - ユーザーIDフィルター（None の場合は全ユーザー）
///
/// # 戻り値
/// expense_date 昇順（同時刻は ID 昇順）の経費リスト
pub fn list_in_range(
    conn: &Connection,
    start: &DateTime<Utc>,
    end: &DateTime<Utc>,
    user_id: Option<&str>,
) -> AppResult<Vec<ExpenseRecord>> {
    let mut query = format!("{SELECT_COLUMNS} WHERE expense_date >= ?1 AND expense_date < ?2");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> =
        vec![Box::new(format_timestamp(start)), Box::new(format_timestamp(end))];

    if let Some(user) = user_id {
        query.push_str(" AND user_id = ?3");
        params.push(Box::new(user.to_string()));
    }

    query.push_str(" ORDER BY expense_date ASC, id ASC");

    let mut stmt = conn.prepare(&query)?;
    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let records = stmt.query_map(param_refs.as_slice(), map_row)?;

    records
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)
}

/// ユーザーの指定項目のうち最新の経費を取得する
///
/// 同時刻の場合は ID の大きい方を最新とみなす
pub fn find_latest_by_description(
    conn: &Connection,
    user_id: &str,
    description: &str,
) -> AppResult<Option<ExpenseRecord>> {
    match conn.query_row(
        &format!(
            "{SELECT_COLUMNS} WHERE user_id = ?1 AND description = ?2
             ORDER BY expense_date DESC, id DESC LIMIT 1"
        ),
        params![user_id, description],
        map_row,
    ) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::from(e)),
    }
}

/// IDで経費を削除する
///
/// # 戻り値
/// 削除した場合は true、該当行がなかった場合は false
pub fn delete_by_id(conn: &Connection, id: i64) -> AppResult<bool> {
    let affected_rows = conn.execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
    Ok(affected_rows > 0)
}
