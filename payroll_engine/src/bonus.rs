//! Bonus eligibility.
//!
//! A stored bonus amount is never trusted on its own: the position may
//! have stopped being bonifiable, or the performance level may have
//! dropped to zero, since the amount was computed.  Every place that
//! reads a bonus goes through [`resolve_bonus`] so the per-employee
//! computation and the aggregator apply the same rule.

use crate::models::{PayrollRecord, Position};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Eligibility and gated amount of a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusResolution {
    pub eligible: bool,
    pub amount: Money,
}

/// A bonus is payable only for a bonifiable position and a performance
/// level above zero.  A missing position is not bonifiable.
pub fn is_bonus_eligible(position: Option<&Position>, performance_level: u32) -> bool {
    position.map_or(false, |p| p.bonifiable) && performance_level > 0
}

/// Gates a pre-computed bonus amount by eligibility.  Never invents an
/// amount; an ineligible bonus becomes zero.
pub fn resolve_bonus(
    position: Option<&Position>,
    performance_level: u32,
    stored_amount: Money,
) -> BonusResolution {
    let eligible = is_bonus_eligible(position, performance_level);
    BonusResolution {
        eligible,
        amount: if eligible { stored_amount } else { Money::ZERO },
    }
}

/// [`resolve_bonus`] applied to a record's effective position,
/// performance level and stored bonus.
pub fn resolve_record_bonus(record: &PayrollRecord) -> BonusResolution {
    resolve_bonus(
        record.effective_position(),
        record.effective_performance_level(),
        record.stored_bonus(),
    )
}
