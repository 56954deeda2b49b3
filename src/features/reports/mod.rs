/// 月報機能モジュール
///
/// 経費レコードの集計（builder）とテキストへの整形（render）を
/// 分けて提供します。どちらも副作用のない純粋関数です。
pub mod builder;
pub mod render;

pub use builder::{build_report, CategorySummary, MonthlyReport, ReportItem, DEFAULT_ITEM_LIMIT};
pub use render::{render_report, ReportScope};
