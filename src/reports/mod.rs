//! Derived reports over a full log set.
//!
//! Both functions are pure and deterministic: same input, same output, no
//! hidden state. They operate on the guaranteed-fresh dataset from the
//! server, never on cached data.

use serde::Serialize;
use std::cmp::Ordering;

use crate::models::LogRecord;

/// Total calories for one category, kind ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Signed calorie balance for one month: intake adds, everything else
/// subtracts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyNet {
    pub month: String,
    pub net: f64,
}

/// Top three categories by summed amount, descending. Ties keep the order in
/// which the categories first appear in the input.
pub fn top_categories(logs: &[LogRecord]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for log in logs {
        match totals.iter_mut().find(|t| t.category == log.category) {
            Some(entry) => entry.total += log.amount,
            None => totals.push(CategoryTotal {
                category: log.category.clone(),
                total: log.amount,
            }),
        }
    }

    // sort_by is stable, so equal sums keep first-seen order.
    totals.sort_by(|a, b| descending(a.total, b.total));
    totals.truncate(3);
    totals
}

/// Net calories per month, all months, sorted descending by net. The month
/// key is the "YYYY-MM" prefix of the date.
pub fn monthly_net(logs: &[LogRecord]) -> Vec<MonthlyNet> {
    let mut totals: Vec<MonthlyNet> = Vec::new();

    for log in logs {
        let month = log.date.get(..7).unwrap_or(&log.date);
        let signed = if log.kind == "intake" {
            log.amount
        } else {
            -log.amount
        };
        match totals.iter_mut().find(|t| t.month == month) {
            Some(entry) => entry.net += signed,
            None => totals.push(MonthlyNet {
                month: month.to_string(),
                net: signed,
            }),
        }
    }

    totals.sort_by(|a, b| descending(a.net, b.net));
    totals
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
