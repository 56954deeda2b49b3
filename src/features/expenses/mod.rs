/// 経費機能モジュール
///
/// このモジュールは経費管理に関連するすべての機能を提供します：
/// - 経費の記録・削除
/// - 月別の合計金額と件数の取得
/// - 月別の経費一覧の取得（ユーザー単位・全ユーザー）
/// - 集計対象月の境界計算
pub mod models;
pub mod period;
pub mod repository;

// モデル
pub use models::{ExpenseRecord, ExpenseTotal, NewExpense, MAX_CATEGORY_CHARS, MAX_DESCRIPTION_CHARS};

// 集計期間
pub use period::MonthPeriod;
