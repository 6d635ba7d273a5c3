//! Multi-employee and multi-month aggregation.
//!
//! In a single-month view each employee should appear once, so
//! duplicate rows are dropped (first one wins).  In a multi-month view
//! every row is a separate pay period and all of them are summed.
//!
//! Two kinds of count are kept apart on purpose.  Headcounts
//! (`unique_users_count`, `bonus_eligible_count`) are always distinct
//! people.  The divisors for the averages are pay-period instances in
//! multi-month mode, so a monthly average divides by the number of rows
//! that were actually summed.

use crate::bonus::resolve_record_bonus;
use crate::models::{AggregationResult, PayrollRecord};
use crate::money::Money;
use std::collections::{BTreeSet, HashSet};

/// Summarises a set of payroll records.
pub fn aggregate(records: &[PayrollRecord]) -> AggregationResult {
    let month_labels: HashSet<&str> = records
        .iter()
        .filter_map(|record| record.month_label.as_deref())
        .collect();
    let is_multi_month = month_labels.len() > 1;

    // A single-month view keeps the first row per employee
    let selected: Vec<&PayrollRecord> = if is_multi_month {
        records.iter().collect()
    } else {
        let mut seen = HashSet::new();
        records
            .iter()
            .filter(|record| seen.insert(record.user_id.as_str()))
            .collect()
    };

    let mut total_remuneration = Money::ZERO;
    let mut total_bonus = Money::ZERO;
    let mut bonus_rows = 0usize;
    let mut bonus_users = HashSet::new();
    for record in &selected {
        total_remuneration += record.resolved_base_remuneration();
        let bonus = resolve_record_bonus(record);
        if bonus.eligible {
            total_bonus += bonus.amount;
        }
        if bonus.eligible && bonus.amount.is_positive() {
            bonus_rows += 1;
            bonus_users.insert(record.user_id.as_str());
        }
    }
    let total_earnings = total_remuneration + total_bonus;

    // Headcount covers every input row, not just the summed ones
    let headcount_unique = records
        .iter()
        .map(|record| record.user_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let bonus_headcount_unique = bonus_users.len();

    let (rows_for_average, bonus_rows_for_average) = if is_multi_month {
        (selected.len(), bonus_rows)
    } else {
        (headcount_unique, bonus_headcount_unique)
    };

    AggregationResult {
        total_bonus,
        total_remuneration,
        total_earnings,
        average_bonus: total_bonus.div_count(bonus_rows_for_average),
        average_per_user: total_earnings.div_count(rows_for_average),
        bonus_eligible_count: bonus_headcount_unique,
        unique_users_count: headcount_unique,
        is_multi_month,
        month_count: month_labels.len().max(1),
    }
}

/// Labels each record with its `MM/YYYY` pay period when the set spans
/// more than one period.  Single-period sets are returned untouched.
pub fn label_months(mut records: Vec<PayrollRecord>) -> Vec<PayrollRecord> {
    let periods: BTreeSet<(i32, u32)> = records.iter().map(|r| (r.year, r.month)).collect();
    if periods.len() > 1 {
        for record in &mut records {
            record.month_label = Some(record.period_label());
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bonus, Position};

    fn row(user: &str, label: Option<&str>, base: i64, bonifiable: bool, level: u32, bonus: i64) -> PayrollRecord {
        PayrollRecord {
            user_id: user.into(),
            month_label: label.map(str::to_string),
            base_remuneration: Some(Money::from(base)),
            performance_level: Some(level),
            position: Some(Position {
                bonifiable,
                ..Default::default()
            }),
            bonus: Some(Bonus {
                base_bonus: Money::from(bonus),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn single_month_deduplicates_by_user() {
        let records = vec![
            row("u1", None, 1000, true, 1, 100),
            row("u1", None, 5000, true, 1, 900),
            row("u2", None, 2000, false, 2, 300),
        ];
        let result = aggregate(&records);
        assert!(!result.is_multi_month);
        assert_eq!(result.unique_users_count, 2);
        assert_eq!(result.total_remuneration, Money::from(3000));
        assert_eq!(result.total_bonus, Money::from(100));
        assert_eq!(result.total_earnings, Money::from(3100));
        assert_eq!(result.bonus_eligible_count, 1);
        assert_eq!(result.average_bonus, Money::from(100));
        assert_eq!(result.average_per_user, Money::from(1550));
        assert_eq!(result.month_count, 1);
    }

    #[test]
    fn duplicate_rows_count_once() {
        let records = vec![row("u1", None, 1000, false, 0, 0), row("u1", None, 1000, false, 0, 0)];
        let result = aggregate(&records);
        assert_eq!(result.unique_users_count, 1);
        assert_eq!(result.total_remuneration, Money::from(1000));
    }

    #[test]
    fn multi_month_sums_every_row() {
        let records = vec![
            row("u1", Some("01/2024"), 1000, true, 1, 100),
            row("u1", Some("02/2024"), 1100, true, 1, 0),
            row("u1", Some("03/2024"), 1200, true, 2, 200),
        ];
        let result = aggregate(&records);
        assert!(result.is_multi_month);
        assert_eq!(result.month_count, 3);
        assert_eq!(result.unique_users_count, 1);
        assert_eq!(result.total_remuneration, Money::from(3300));
        assert_eq!(result.total_bonus, Money::from(300));
        // one person, but two bonus-bearing months and three summed rows
        assert_eq!(result.bonus_eligible_count, 1);
        assert_eq!(result.average_bonus, Money::from(150));
        assert_eq!(result.average_per_user, Money::from(1200));
    }

    #[test]
    fn ineligible_stored_bonus_is_ignored() {
        let records = vec![
            row("u1", None, 1000, false, 3, 500),
            row("u2", None, 1000, true, 0, 500),
        ];
        let result = aggregate(&records);
        assert_eq!(result.total_bonus, Money::ZERO);
        assert_eq!(result.bonus_eligible_count, 0);
        assert_eq!(result.average_bonus, Money::ZERO);
    }

    #[test]
    fn huge_amounts_do_not_panic() {
        let records: Vec<PayrollRecord> = serde_json::from_value(serde_json::json!([
            {"userId": "u1", "baseRemuneration": 5e28},
            {"userId": "u2", "baseRemuneration": 5e28}
        ]))
        .unwrap();
        assert_eq!(aggregate(&records).total_remuneration, Money::ZERO);

        let max = Money::from_decimal(rust_decimal::Decimal::MAX);
        let mut first = row("u1", None, 0, true, 1, 0);
        first.base_remuneration = Some(max);
        let mut second = row("u2", None, 0, true, 1, 0);
        second.base_remuneration = Some(max);
        if let Some(bonus) = second.bonus.as_mut() {
            bonus.base_bonus = max;
        }
        let result = aggregate(&[first, second]);
        assert_eq!(result.total_remuneration, max);
        assert_eq!(result.total_earnings, max);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let result = aggregate(&[]);
        assert_eq!(result.average_bonus, Money::ZERO);
        assert_eq!(result.average_per_user, Money::ZERO);
        assert_eq!(result.unique_users_count, 0);
        assert_eq!(result.bonus_eligible_count, 0);
        assert!(!result.is_multi_month);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            row("u1", Some("01/2024"), 1000, true, 1, 333),
            row("u2", Some("02/2024"), 1234, true, 2, 111),
            row("u3", Some("02/2024"), 999, false, 1, 50),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn labels_only_multi_period_sets() {
        let single = label_months(vec![
            PayrollRecord { user_id: "a".into(), month: 1, year: 2024, ..Default::default() },
            PayrollRecord { user_id: "b".into(), month: 1, year: 2024, ..Default::default() },
        ]);
        assert!(single.iter().all(|r| r.month_label.is_none()));

        let multi = label_months(vec![
            PayrollRecord { user_id: "a".into(), month: 12, year: 2023, ..Default::default() },
            PayrollRecord { user_id: "a".into(), month: 1, year: 2024, ..Default::default() },
        ]);
        assert_eq!(multi[0].month_label.as_deref(), Some("12/2023"));
        assert_eq!(multi[1].month_label.as_deref(), Some("01/2024"));
        assert!(aggregate(&multi).is_multi_month);
    }
}
