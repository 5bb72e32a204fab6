//! Term resolution: how many months a deal runs, bills, and earns revenue.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::deal::{ContractLength, Deal};
use crate::numeric::whole_months;

/// Longest term the engine will resolve (100 years).
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Month counts derived from the deal's term configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSchedule {
    /// Nominal contract length, always at least 1
    pub term_months: u32,
    /// Term minus free months
    pub billable_months: u32,
    /// Billable months minus fully-discounted ramp months
    pub revenue_generating_months: u32,
}

/// Nominal contract length in months.
///
/// Month-to-month deals resolve to a single month; fixed lengths are floored
/// to whole units with a minimum of one and capped at [`MAX_TERM_MONTHS`].
pub fn term_months(contract: &ContractLength) -> u32 {
    match contract {
        ContractLength::MonthToMonth => 1,
        ContractLength::FixedMonths { months } => whole_months(*months).clamp(1, MAX_TERM_MONTHS),
        ContractLength::FixedYears { years } => whole_months(*years)
            .max(1)
            .saturating_mul(12)
            .min(MAX_TERM_MONTHS),
    }
}

/// Months that are invoiced once free months are taken off the front.
pub fn billable_months(deal: &Deal) -> u32 {
    let term = term_months(&deal.contract);
    if deal.toggles.free_months {
        term.saturating_sub(whole_months(deal.free_months_up_front))
    } else {
        term
    }
}

/// Billable months that produce revenue.
///
/// Only a ramp discounted at 100% or more removes months; a partial ramp
/// discount still earns (reduced) revenue in every billable month.
pub fn revenue_generating_months(deal: &Deal) -> u32 {
    let billable = billable_months(deal);
    if deal.toggles.ramp && deal.ramp_discount_pct >= dec!(100) {
        billable.saturating_sub(whole_months(deal.ramp_months))
    } else {
        billable
    }
}

/// Resolve all three month counts at once.
pub fn resolve_term(deal: &Deal) -> TermSchedule {
    TermSchedule {
        term_months: term_months(&deal.contract),
        billable_months: billable_months(deal),
        revenue_generating_months: revenue_generating_months(deal),
    }
}
