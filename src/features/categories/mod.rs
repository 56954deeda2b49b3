/// 類別機能モジュール
///
/// ユーザーごとの許可類別（追記のみ）を管理します。
/// 記帳時の類別検証が有効な場合に参照されます。
pub mod repository;

pub use repository::{add, exists, find_all_for_user};
