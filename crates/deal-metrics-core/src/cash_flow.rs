//! Month-by-month cumulative profit, net of acquisition cost.
//!
//! Every month carries the term-average revenue and profit. Ramp and
//! escalation change the totals but not the shape of this series.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::DealTotals;
use crate::deal::BillingCadence;
use crate::numeric::safe_ratio;
use crate::types::Money;

const PREPAY_PERIOD_MONTHS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    /// 1-based
    pub month: u32,
    pub revenue: Money,
    pub profit: Money,
    /// Starts from -CAC
    pub cumulative_profit: Money,
    /// Amount invoiced this month under the deal's billing cadence
    pub billed: Money,
    pub break_even: bool,
}

/// Project cumulative profit for each month of the term.
pub fn project_cash_flow(totals: &DealTotals, billing: BillingCadence) -> Vec<CashFlowPoint> {
    let months = totals.term_months;
    let term = Decimal::from(months);
    let revenue = safe_ratio(totals.tcv, term).unwrap_or(Decimal::ZERO);
    let profit = safe_ratio(totals.term_profit, term).unwrap_or(Decimal::ZERO);

    let mut cumulative = -totals.cac;
    (1..=months)
        .map(|month| {
            cumulative = cumulative.saturating_add(profit);
            CashFlowPoint {
                month,
                revenue,
                profit,
                cumulative_profit: cumulative,
                billed: billed_in_month(month, months, revenue, billing),
                break_even: cumulative >= Decimal::ZERO,
            }
        })
        .collect()
}

/// First month at which cumulative profit reaches zero.
pub fn break_even_month(points: &[CashFlowPoint]) -> Option<u32> {
    points.iter().find(|p| p.break_even).map(|p| p.month)
}

fn billed_in_month(month: u32, term_months: u32, revenue: Money, billing: BillingCadence) -> Money {
    match billing {
        BillingCadence::Monthly => revenue,
        BillingCadence::AnnualPrepay => {
            if (month - 1) % PREPAY_PERIOD_MONTHS == 0 {
                let covered = PREPAY_PERIOD_MONTHS.min(term_months - month + 1);
                revenue.saturating_mul(Decimal::from(covered))
            } else {
                Decimal::ZERO
            }
        }
    }
}
