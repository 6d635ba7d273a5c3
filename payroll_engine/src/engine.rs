//! Payroll computation engine.
//!
//! The `engine` module turns a [`PayrollRecord`] into a
//! [`PayrollBreakdown`]: gross pay is base remuneration plus the gated
//! bonus; ordinary discounts cascade against the gross, bonus discounts
//! cascade against the bonus alone, and net pay is gross minus both.
//! [`compute_many`] uses the [`rayon`] crate to spread the
//! per-employee work across CPU cores.

use crate::bonus::resolve_record_bonus;
use crate::discount::apply_cascade;
use crate::models::{DiscountRule, PayrollBreakdown, PayrollRecord};
use rayon::prelude::*;

/// Computes one employee's payroll for one period.
///
/// Bonus discounts only apply when the bonus is payable: an ineligible
/// bonus is zero and carries no deductions, even fixed ones.  Net pay
/// is not clamped; a negative value is reported as-is.
pub fn compute_payroll(record: &PayrollRecord) -> PayrollBreakdown {
    // Gross pay is the resolved base plus the eligibility-gated bonus
    let base_remuneration = record.resolved_base_remuneration();
    let bonus = resolve_record_bonus(record);
    let total_gross = base_remuneration + bonus.amount;

    // Ordinary discounts cascade against the whole gross
    let ordinary = apply_cascade(total_gross, &record.discounts);

    // Bonus discounts cascade against the bonus alone
    let bonus_rules: &[DiscountRule] = match &record.bonus {
        Some(b) if bonus.eligible => b.bonus_discounts.as_slice(),
        _ => &[],
    };
    let bonus_cascade = apply_cascade(bonus.amount, bonus_rules);

    let total_discounts = ordinary.total_deducted + bonus_cascade.total_deducted;

    PayrollBreakdown {
        user_id: record.user_id.clone(),
        month: record.month,
        year: record.year,
        base_remuneration,
        bonus_eligible: bonus.eligible,
        bonus_amount: bonus.amount,
        total_gross,
        discount_lines: ordinary.lines,
        bonus_discount_lines: bonus_cascade.lines,
        total_discounts,
        total_net: total_gross - total_discounts,
    }
}

/// Computes every record in parallel.  Results keep the input order.
pub fn compute_many(records: &[PayrollRecord]) -> Vec<PayrollBreakdown> {
    records.par_iter().map(compute_payroll).collect()
}
