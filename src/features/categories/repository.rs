use crate::features::expenses::models::format_timestamp;
use crate::shared::errors::{AppError, AppResult};
use chrono::Utc;
use rusqlite::{params, Connection};

/// ユーザーの許可類別を追加する
///
/// # 戻り値
/// 新規に追加した場合は true、既に登録済みの場合は false
pub fn add(conn: &Connection, user_id: &str, name: &str) -> AppResult<bool> {
    let now = format_timestamp(&Utc::now());

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO user_categories (user_id, name, created_at)
         VALUES (?1, ?2, ?3)",
        params![user_id, name, now],
    )?;

    Ok(inserted > 0)
}

/// ユーザーの許可類別を登録順で取得する
pub fn find_all_for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM user_categories WHERE user_id = ?1 ORDER BY id ASC",
    )?;
    let names = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;

    names.collect::<Result<Vec<_>, _>>().map_err(AppError::from)
}

/// 類別がユーザーの許可類別に含まれるか
pub fn exists(conn: &Connection, user_id: &str, name: &str) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_categories WHERE user_id = ?1 AND name = ?2",
        params![user_id, name],
        |row| row.get(0),
    )?;

    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::connection::open_in_memory;

    #[test]
    fn test_add_and_list_in_insertion_order() {
        let conn = open_in_memory().unwrap();

        assert!(add(&conn, "U1", "飲食").unwrap());
        assert!(add(&conn, "U1", "交通").unwrap());
        assert!(add(&conn, "U2", "娛樂").unwrap());

        assert_eq!(find_all_for_user(&conn, "U1").unwrap(), vec!["飲食", "交通"]);
        assert_eq!(find_all_for_user(&conn, "U2").unwrap(), vec!["娛樂"]);
        assert!(find_all_for_user(&conn, "U3").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_is_ignored() {
        let conn = open_in_memory().unwrap();

        assert!(add(&conn, "U1", "飲食").unwrap());
        assert!(!add(&conn, "U1", "飲食").unwrap());
        assert_eq!(find_all_for_user(&conn, "U1").unwrap().len(), 1);
    }

    #[test]
    fn test_exists_is_per_user() {
        let conn = open_in_memory().unwrap();
        add(&conn, "U1", "飲食").unwrap();

        assert!(exists(&conn, "U1", "飲食").unwrap());
        assert!(!exists(&conn, "U2", "飲食").unwrap());
        assert!(!exists(&conn, "U1", "交通").unwrap());
    }
}
