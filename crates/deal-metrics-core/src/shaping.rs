//! Term-revenue shaping for recurring items: annual escalation and the
//! onboarding ramp.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::deal::Deal;
use crate::numeric::{non_negative, safe_ratio, whole_months};
use crate::term::TermSchedule;
use crate::types::{Money, Percent};

const ESCALATION_PERIOD_MONTHS: u32 = 12;

/// Term revenue of one recurring item after shaping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapedRevenue {
    pub term_revenue: Money,
    pub escalated: bool,
    pub ramped: bool,
}

/// Term revenue with an annual step-up.
///
/// Terms of a year or less are never escalated. Otherwise the monthly rate
/// is raised by `escalator_pct` after every twelfth billed month; the step is
/// applied to the running rate, not compounded continuously. Negative
/// escalators lower the rate, never below zero.
pub fn escalated_term_revenue(
    monthly_revenue: Money,
    billable_months: u32,
    term_months: u32,
    escalator_pct: Percent,
) -> Money {
    if term_months <= ESCALATION_PERIOD_MONTHS {
        return monthly_revenue.saturating_mul(Decimal::from(billable_months));
    }

    // A cut of more than 100% bottoms out at zero revenue.
    let step = non_negative(Decimal::ONE.saturating_add(escalator_pct / dec!(100)));
    let mut rate = monthly_revenue;
    let mut total = Decimal::ZERO;
    for month in 1..=billable_months {
        total = total.saturating_add(rate);
        if month % ESCALATION_PERIOD_MONTHS == 0 {
            rate = rate.saturating_mul(step);
            trace!(month, %rate, "escalated monthly rate");
        }
    }
    total
}

/// Term revenue with the first `ramp_months` billed at a discount.
///
/// The ramp cannot outlast the billable period. A ramp discount outside
/// 0-100% is clamped so ramp revenue is never negative.
pub fn ramped_term_revenue(
    base_monthly: Money,
    billable_months: u32,
    ramp_months: Decimal,
    ramp_discount_pct: Percent,
) -> Money {
    let ramp = whole_months(ramp_months).min(billable_months);
    let discount = non_negative(ramp_discount_pct).min(dec!(100));

    let ramp_revenue = base_monthly
        .saturating_mul(Decimal::from(ramp))
        .saturating_mul(Decimal::ONE - discount / dec!(100));
    let standard_revenue = base_monthly.saturating_mul(Decimal::from(billable_months - ramp));
    ramp_revenue.saturating_add(standard_revenue)
}

/// Apply the deal's enabled shaping to one recurring item's monthly revenue.
///
/// Escalation runs first; when the ramp is also enabled its result replaces
/// the escalated figure rather than compounding with it.
pub fn shape_term_revenue(deal: &Deal, monthly_revenue: Money, term: &TermSchedule) -> ShapedRevenue {
    let mut shaped = ShapedRevenue {
        term_revenue: monthly_revenue.saturating_mul(Decimal::from(term.billable_months)),
        escalated: false,
        ramped: false,
    };

    if deal.toggles.escalation && term.term_months > ESCALATION_PERIOD_MONTHS {
        shaped.term_revenue = escalated_term_revenue(
            monthly_revenue,
            term.billable_months,
            term.term_months,
            deal.escalator_pct,
        );
        shaped.escalated = true;
    }

    if deal.toggles.ramp {
        shaped.term_revenue = ramped_term_revenue(
            monthly_revenue,
            term.billable_months,
            deal.ramp_months,
            deal.ramp_discount_pct,
        );
        shaped.ramped = true;
    }

    shaped
}

/// Term profit at the item's monthly profit-to-revenue ratio.
pub fn term_profit(shaped_revenue: Money, monthly_profit: Money, monthly_revenue: Money) -> Money {
    shaped_revenue.saturating_mul(safe_ratio(monthly_profit, monthly_revenue).unwrap_or(Decimal::ZERO))
}
