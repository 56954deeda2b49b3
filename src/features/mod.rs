/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するコード（モデル、データベース操作、処理）を
/// まとめた自己完結型のユニットです。
pub mod categories;
pub mod commands;
pub mod expenses;
pub mod reports;
pub mod webhook;
