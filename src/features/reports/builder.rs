use crate::features::expenses::models::ExpenseRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// 類別ごとに表示する明細の既定件数
pub const DEFAULT_ITEM_LIMIT: usize = 5;

/// 月報の明細行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportItem {
    pub description: String,
    pub amount: f64,
}

/// 類別ごとの集計
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub subtotal: f64,
    pub count: usize,
    /// 先頭から item_limit 件までの明細
    pub items: Vec<ReportItem>,
    /// 件数制限で省略した明細の数
    pub omitted: usize,
}

/// 月報の集計結果
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MonthlyReport {
    pub total: f64,
    pub count: usize,
    /// 類別名の昇順
    pub categories: Vec<CategorySummary>,
}

impl MonthlyReport {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// 経費レコードから月報を集計する
///
/// レコードは (expense_date, id) 順に並べ替えてから加算するため、
/// 入力の順序に関係なく明細と合計値（浮動小数点の誤差を含む）が一致する。
///
/// # 引数
/// * `records` - 集計対象の経費
/// * `item_limit` - 類別ごとに保持する明細の上限
///
/// # 戻り値
/// 集計済みの月報
pub fn build_report(records: &[ExpenseRecord], item_limit: usize) -> MonthlyReport {
    let mut ordered: Vec<&ExpenseRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        a.expense_date
            .cmp(&b.expense_date)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut total = 0.0;
    let mut by_category: BTreeMap<&str, CategorySummary> = BTreeMap::new();

    for record in &ordered {
        total += record.amount;

        let summary = by_category
            .entry(record.category.as_str())
            .or_insert_with(|| CategorySummary {
                name: record.category.clone(),
                subtotal: 0.0,
                count: 0,
                items: Vec::new(),
                omitted: 0,
            });

        summary.subtotal += record.amount;
        summary.count += 1;

        if summary.items.len() < item_limit {
            summary.items.push(ReportItem {
                description: record.description.clone(),
                amount: record.amount,
            });
        } else {
            summary.omitted += 1;
        }
    }

    MonthlyReport {
        total,
        count: ordered.len(),
        categories: by_category.into_values().collect(),
    }
}
