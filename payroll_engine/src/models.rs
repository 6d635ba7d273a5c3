//! Data models for the Payroll Engine.
//!
//! The `models` module defines the serialisable structs consumed and
//! produced by the engine: payroll records as delivered by the upstream
//! payroll service, the discount rules and bonus sub-records they
//! contain, and the per-employee and aggregate results.  Field names
//! follow the upstream JSON (camelCase).  Currency fields use the
//! lenient [`Money`] type so that loosely-typed upstream values are
//! normalised once, at deserialisation time.

use crate::money::{
    deserialize_lenient_bool, deserialize_lenient_i32, deserialize_lenient_string,
    deserialize_lenient_u32, deserialize_null_default, deserialize_optional_decimal,
    deserialize_optional_u32, Money,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A position (job role) as referenced by a payroll record or a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub id: Option<String>,
    /// Whether employees in this position can earn a performance bonus.
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub bonifiable: bool,
    /// The position's base remuneration, if known.
    #[serde(default, alias = "remuneration")]
    pub base_remuneration: Option<Money>,
}

/// The employee a payroll belongs to, with their current position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
}

/// A single deduction applied to a base amount.
///
/// Exactly one of `value` and `percentage` is normally set.  See
/// [`DiscountRule::kind`] for how a rule carrying both is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRule {
    /// Fixed amount to deduct.
    #[serde(default)]
    pub value: Option<Money>,
    /// Percentage (0–100) of the running amount to deduct.
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub percentage: Option<Decimal>,
    /// Position of the rule in the cascade; lower values apply first.
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub calculation_order: i32,
    /// Display label, e.g. `"INSS"` or `"Vale transporte"`.
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub reference: String,
}

/// How a [`DiscountRule`] deducts from the running amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// Deduct a literal amount.
    Fixed(Money),
    /// Deduct this percentage of the amount remaining at this step.
    Percentage(Decimal),
}

impl DiscountRule {
    /// A rule deducting the literal amount `value`.
    pub fn fixed(reference: &str, value: Money, calculation_order: i32) -> Self {
        DiscountRule {
            value: Some(value),
            percentage: None,
            calculation_order,
            reference: reference.to_string(),
        }
    }

    /// A rule deducting `percentage` percent of the running amount.
    pub fn percentage(reference: &str, percentage: Decimal, calculation_order: i32) -> Self {
        DiscountRule {
            value: None,
            percentage: Some(percentage),
            calculation_order,
            reference: reference.to_string(),
        }
    }

    /// Resolves the rule into its effective deduction.
    ///
    /// A present, non-zero fixed `value` takes precedence over a
    /// percentage.  A rule with neither deducts nothing.
    pub fn kind(&self) -> DiscountKind {
        match (self.value, self.percentage) {
            (Some(value), _) if !value.is_zero() => DiscountKind::Fixed(value),
            (_, Some(percentage)) => DiscountKind::Percentage(percentage),
            (value, None) => DiscountKind::Fixed(value.unwrap_or_default()),
        }
    }
}

/// The bonus sub-record of a payroll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bonus {
    /// Bonus amount as computed upstream, before bonus discounts.
    #[serde(default)]
    pub base_bonus: Money,
    #[serde(default, deserialize_with = "deserialize_optional_u32")]
    pub performance_level: Option<u32>,
    /// Deductions that cascade against the bonus amount only.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub bonus_discounts: Vec<DiscountRule>,
}

/// One employee's payroll for one month, as delivered upstream.
///
/// Records are either a live payroll computed for the open period or a
/// saved snapshot of a closed period.  The engine only ever reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub user_id: String,
    /// Month of the pay period, 1–12.
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub month: u32,
    #[serde(default, deserialize_with = "deserialize_lenient_i32")]
    pub year: i32,
    /// Remuneration stored on the payroll itself.  When absent the
    /// position's remuneration is used instead.
    #[serde(default)]
    pub base_remuneration: Option<Money>,
    /// Flat bonus amount, used when no nested `bonus` record exists.
    #[serde(default)]
    pub bonus_amount: Option<Money>,
    #[serde(default)]
    pub bonus: Option<Bonus>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub discounts: Vec<DiscountRule>,
    #[serde(default, deserialize_with = "deserialize_optional_u32")]
    pub performance_level: Option<u32>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub user: Option<UserRef>,
    /// Label of the pay period in multi-month views (`MM/YYYY`).
    #[serde(default)]
    pub month_label: Option<String>,
    /// Net salary as stored upstream.  Informational only; the engine
    /// always recomputes it.
    #[serde(default)]
    pub net_salary: Option<Money>,
}

impl PayrollRecord {
    /// The record's own position, falling back to the user's position.
    pub fn effective_position(&self) -> Option<&Position> {
        self.position
            .as_ref()
            .or_else(|| self.user.as_ref().and_then(|user| user.position.as_ref()))
    }

    /// Performance level on the record, falling back to the bonus record.
    pub fn effective_performance_level(&self) -> u32 {
        self.performance_level
            .or_else(|| self.bonus.as_ref().and_then(|bonus| bonus.performance_level))
            .unwrap_or(0)
    }

    /// The bonus amount as stored upstream, before eligibility gating.
    pub fn stored_bonus(&self) -> Money {
        match &self.bonus {
            Some(bonus) => bonus.base_bonus,
            None => self.bonus_amount.unwrap_or_default(),
        }
    }

    /// Resolves the base remuneration: the payroll's own value, then its
    /// position's, then the user's position's, then zero.
    pub fn resolved_base_remuneration(&self) -> Money {
        self.base_remuneration
            .or_else(|| self.position.as_ref().and_then(|p| p.base_remuneration))
            .or_else(|| {
                self.user
                    .as_ref()
                    .and_then(|user| user.position.as_ref())
                    .and_then(|p| p.base_remuneration)
            })
            .unwrap_or_default()
    }

    /// The `MM/YYYY` label of this record's pay period.
    pub fn period_label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

/// A deduction that was applied during a cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountLine {
    pub reference: String,
    pub calculation_order: i32,
    pub amount: Money,
}

/// The result of computing one employee's payroll for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollBreakdown {
    pub user_id: String,
    pub month: u32,
    pub year: i32,
    pub base_remuneration: Money,
    pub bonus_eligible: bool,
    /// Bonus after eligibility gating.
    pub bonus_amount: Money,
    /// Base remuneration plus bonus.
    pub total_gross: Money,
    /// Ordinary discounts as applied, in cascade order.
    pub discount_lines: Vec<DiscountLine>,
    /// Bonus discounts as applied, in cascade order.
    pub bonus_discount_lines: Vec<DiscountLine>,
    pub total_discounts: Money,
    /// Gross minus discounts.  May be negative.
    pub total_net: Money,
}

/// Summary figures over a set of payroll records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub total_bonus: Money,
    pub total_remuneration: Money,
    /// Remuneration plus bonus.
    pub total_earnings: Money,
    pub average_bonus: Money,
    pub average_per_user: Money,
    /// Distinct employees with an eligible, non-zero bonus.
    pub bonus_eligible_count: usize,
    /// Distinct employees across every input row.
    pub unique_users_count: usize,
    pub is_multi_month: bool,
    pub month_count: usize,
}

/// Selection criteria for fetching many payrolls.  Empty lists mean no
/// restriction on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollFilter {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub months: Vec<u32>,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

impl PayrollFilter {
    pub fn matches(&self, record: &PayrollRecord) -> bool {
        self.year.map_or(true, |year| record.year == year)
            && (self.months.is_empty() || self.months.contains(&record.month))
            && (self.user_ids.is_empty() || self.user_ids.contains(&record.user_id))
    }
}

/// A payroll row in a summary listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRow {
    pub month_label: Option<String>,
    pub breakdown: PayrollBreakdown,
}

/// Rows plus totals for a filtered set of payrolls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollSummary {
    pub rows: Vec<PayrollRow>,
    pub totals: AggregationResult,
}
