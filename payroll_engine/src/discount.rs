//! Discount cascade evaluation.
//!
//! Discounts are applied one after another in ascending
//! `calculation_order`.  A percentage discount is taken from the amount
//! left over by the previous steps rather than from the original base,
//! so two successive 10% discounts on 100 leave 81, not 80.  Each
//! deduction is rounded to cents before it is applied.  The running
//! amount is not clamped: a fixed discount larger than what remains
//! drives it negative and later percentages are taken from that
//! negative amount.

use crate::models::{DiscountKind, DiscountLine, DiscountRule};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Outcome of applying a list of discount rules to a base amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeOutcome {
    /// Sum of every deduction made.
    pub total_deducted: Money,
    /// `base_amount - total_deducted`.
    pub remaining_amount: Money,
    /// The individual deductions in the order they were applied.
    pub lines: Vec<DiscountLine>,
}

/// Applies `rules` to `base_amount` in cascade order.
///
/// Rules are sorted by `calculation_order` with a stable sort, so rules
/// sharing an order keep their relative input order.
pub fn apply_cascade(base_amount: Money, rules: &[DiscountRule]) -> CascadeOutcome {
    let mut ordered: Vec<&DiscountRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.calculation_order);

    let mut current = base_amount;
    let mut total_deducted = Money::ZERO;
    let mut lines = Vec::with_capacity(ordered.len());

    for rule in ordered {
        let deduction = match rule.kind() {
            DiscountKind::Fixed(value) => value.round_cents(),
            DiscountKind::Percentage(percentage) => current.percent_of(percentage),
        };
        current -= deduction;
        total_deducted += deduction;
        lines.push(DiscountLine {
            reference: rule.reference.clone(),
            calculation_order: rule.calculation_order,
            amount: deduction,
        });
    }

    CascadeOutcome {
        total_deducted,
        remaining_amount: current,
        lines,
    }
}
