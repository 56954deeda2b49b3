use super::builder::MonthlyReport;
use crate::features::expenses::period::MonthPeriod;
use chrono::{DateTime, Utc};

/// 月報の対象範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// 依頼したユーザー本人の記録のみ
    Personal,
    /// 全ユーザーの記録
    AllUsers,
}

impl ReportScope {
    fn title(&self, period: &MonthPeriod) -> String {
        match self {
            ReportScope::Personal => format!("💰 {period} 月度報表 💰"),
            ReportScope::AllUsers => format!("💰 {period} 全體月度報表 💰"),
        }
    }
}

/// 月報をテキストに整形する
///
/// 金額は整数に丸めて表示し、生成時刻は UTC の分単位で末尾に付ける
pub fn render_report(
    report: &MonthlyReport,
    period: &MonthPeriod,
    scope: ReportScope,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        scope.title(period),
        "------------------------".to_string(),
        format!("- 總支出：{:.0} 元", report.total),
        format!("- 總筆數：{} 筆", report.count),
        String::new(),
        "📊 按類別統計：".to_string(),
    ];

    if report.categories.is_empty() {
        lines.push("  (本月尚無支出記錄)".to_string());
    }

    for category in &report.categories {
        lines.push(format!(
            "- {}: {:.0} 元 ({} 筆)",
            category.name, category.subtotal, category.count
        ));
        lines.extend(
            category
                .items
                .iter()
                .map(|item| format!("  - {}: {:.0} 元", item.description, item.amount)),
        );
        if category.omitted > 0 {
            lines.push(format!("  - …其餘 {} 筆", category.omitted));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "⏰ 報表生成時間：{} UTC",
        generated_at.format("%Y-%m-%d %H:%M")
    ));

    lines.join("\n")
}
