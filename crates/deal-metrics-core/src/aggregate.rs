use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::deal::{Deal, LineItem};
use crate::line_item::{value_line_item, LineItemValuation};
use crate::numeric::{non_negative, safe_ratio};
use crate::shaping::{shape_term_revenue, term_profit};
use crate::term::{resolve_term, TermSchedule};
use crate::types::{Money, Percent};

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Deal-level metrics, recomputed from the deal on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealTotals {
    pub term_months: u32,
    pub billable_months: u32,
    pub revenue_generating_months: u32,
    /// Sum of recurring items' discounted monthly revenue (MRR)
    pub monthly_revenue: Money,
    pub monthly_profit: Money,
    /// monthly_revenue * 12
    pub arr: Money,
    /// Total contract value: shaped recurring revenue plus one-time revenue
    pub tcv: Money,
    pub term_profit: Money,
    pub recurring_revenue: Money,
    pub one_time_revenue: Money,
    pub software_revenue: Money,
    pub services_revenue: Money,
    /// Undiscounted revenue over the billable months
    pub list_revenue: Money,
    /// term_profit / tcv * 100; None when tcv is zero
    pub blended_margin_pct: Option<Percent>,
    /// tcv / term_months
    pub effective_mrr: Money,
    /// Acquisition cost, zero unless the CAC toggle is on
    pub cac: Money,
    /// Lifetime value over the contracted term (= term_profit)
    pub contracted_ltv: Money,
    /// None when cac is zero
    pub ltv_to_cac: Option<Decimal>,
    /// None when cac is zero or monthly profit is not positive
    pub payback_months: Option<Decimal>,
    pub avg_discount_depth_pct: Percent,
    pub exceeds_discount_floor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Recurring,
    OneTime,
}

/// Contribution of a single included line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemBreakdown {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub is_service: bool,
    /// Unit list price per month (recurring) or one-time list price
    pub list_price: Money,
    pub discount_amount: Money,
    pub effective_price: Money,
    pub monthly_revenue: Option<Money>,
    pub monthly_profit: Option<Money>,
    pub term_revenue: Money,
    pub term_profit: Money,
    pub escalated: bool,
    pub ramped: bool,
}

/// Totals together with the per-item detail they were built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealAggregation {
    pub totals: DealTotals,
    pub line_items: Vec<LineItemBreakdown>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the deal-level totals.
pub fn calculate_deal_totals(deal: &Deal) -> DealTotals {
    aggregate_deal(deal).totals
}

/// Value every included line item and roll the results up to deal level.
pub fn aggregate_deal(deal: &Deal) -> DealAggregation {
    let term = resolve_term(deal);
    let billable = Decimal::from(term.billable_months);

    let mut acc = Accumulator::default();
    let mut line_items = Vec::new();

    for item in deal.included_items() {
        let breakdown = match value_line_item(item) {
            LineItemValuation::Recurring(v) => {
                let shaped = shape_term_revenue(deal, v.monthly_revenue, &term);
                if shaped.escalated && shaped.ramped {
                    warn!(
                        deal_id = %deal.id,
                        item_id = %item.id,
                        "ramp overrides escalated revenue"
                    );
                }
                let profit = term_profit(shaped.term_revenue, v.monthly_profit, v.monthly_revenue);

                acc.monthly_revenue = acc.monthly_revenue.saturating_add(v.monthly_revenue);
                acc.monthly_profit = acc.monthly_profit.saturating_add(v.monthly_profit);
                acc.recurring_revenue = acc.recurring_revenue.saturating_add(shaped.term_revenue);
                acc.list_revenue = acc.list_revenue.saturating_add(v.monthly_list_revenue.saturating_mul(billable));
                acc.discounted_revenue = acc.discounted_revenue.saturating_add(v.monthly_revenue.saturating_mul(billable));

                LineItemBreakdown::for_item(item, ItemKind::Recurring)
                    .priced(v.list_unit_price, v.discount_per_unit, v.effective_unit_price)
                    .monthly(v.monthly_revenue, v.monthly_profit)
                    .term(shaped.term_revenue, profit)
                    .shaped(shaped.escalated, shaped.ramped)
            }
            LineItemValuation::OneTime(v) => {
                acc.one_time_revenue = acc.one_time_revenue.saturating_add(v.effective_price);
                acc.list_revenue = acc.list_revenue.saturating_add(v.list_price);
                acc.discounted_revenue = acc.discounted_revenue.saturating_add(v.effective_price);

                LineItemBreakdown::for_item(item, ItemKind::OneTime)
                    .priced(v.list_price, v.discount_amount, v.effective_price)
                    .term(v.effective_price, v.profit)
            }
        };

        acc.tcv = acc.tcv.saturating_add(breakdown.term_revenue);
        acc.term_profit = acc.term_profit.saturating_add(breakdown.term_profit);
        if item.is_service {
            acc.services_revenue = acc.services_revenue.saturating_add(breakdown.term_revenue);
        } else {
            acc.software_revenue = acc.software_revenue.saturating_add(breakdown.term_revenue);
        }
        line_items.push(breakdown);
    }

    let totals = acc.finish(deal, &term);

    debug!(
        deal_id = %deal.id,
        items = line_items.len(),
        tcv = %totals.tcv,
        term_profit = %totals.term_profit,
        "aggregated deal"
    );
    if totals.exceeds_discount_floor {
        warn!(
            deal_id = %deal.id,
            depth = %totals.avg_discount_depth_pct,
            floor = %deal.discount_floor_pct,
            "average discount exceeds the discount floor"
        );
    }

    DealAggregation { totals, line_items }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Accumulator {
    monthly_revenue: Money,
    monthly_profit: Money,
    tcv: Money,
    term_profit: Money,
    recurring_revenue: Money,
    one_time_revenue: Money,
    software_revenue: Money,
    services_revenue: Money,
    list_revenue: Money,
    discounted_revenue: Money,
}

impl Accumulator {
    fn finish(self, deal: &Deal, term: &TermSchedule) -> DealTotals {
        let blended_margin_pct = safe_ratio(self.term_profit, self.tcv).map(|r| r.saturating_mul(dec!(100)));
        let effective_mrr =
            safe_ratio(self.tcv, Decimal::from(term.term_months)).unwrap_or(Decimal::ZERO);

        let cac = if deal.toggles.cac {
            non_negative(deal.cac)
        } else {
            Decimal::ZERO
        };
        let contracted_ltv = self.term_profit;
        let ltv_to_cac = safe_ratio(contracted_ltv, cac);
        let payback_months = if cac.is_zero() || self.monthly_profit <= Decimal::ZERO {
            None
        } else {
            safe_ratio(cac, self.monthly_profit)
        };

        let avg_discount_depth_pct = safe_ratio(
            self.list_revenue - self.discounted_revenue,
            self.list_revenue,
        )
        .map(|r| r.saturating_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO);

        DealTotals {
            term_months: term.term_months,
            billable_months: term.billable_months,
            revenue_generating_months: term.revenue_generating_months,
            monthly_revenue: self.monthly_revenue,
            monthly_profit: self.monthly_profit,
            arr: self.monthly_revenue.saturating_mul(MONTHS_PER_YEAR),
            tcv: self.tcv,
            term_profit: self.term_profit,
            recurring_revenue: self.recurring_revenue,
            one_time_revenue: self.one_time_revenue,
            software_revenue: self.software_revenue,
            services_revenue: self.services_revenue,
            list_revenue: self.list_revenue,
            blended_margin_pct,
            effective_mrr,
            cac,
            contracted_ltv,
            ltv_to_cac,
            payback_months,
            avg_discount_depth_pct,
            exceeds_discount_floor: avg_discount_depth_pct > deal.discount_floor_pct,
        }
    }
}

impl LineItemBreakdown {
    fn for_item(item: &LineItem, kind: ItemKind) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            kind,
            is_service: item.is_service,
            list_price: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            effective_price: Decimal::ZERO,
            monthly_revenue: None,
            monthly_profit: None,
            term_revenue: Decimal::ZERO,
            term_profit: Decimal::ZERO,
            escalated: false,
            ramped: false,
        }
    }

    fn priced(mut self, list: Money, discount: Money, effective: Money) -> Self {
        self.list_price = list;
        self.discount_amount = discount;
        self.effective_price = effective;
        self
    }

    fn monthly(mut self, revenue: Money, profit: Money) -> Self {
        self.monthly_revenue = Some(revenue);
        self.monthly_profit = Some(profit);
        self
    }

    fn term(mut self, revenue: Money, profit: Money) -> Self {
        self.term_revenue = revenue;
        self.term_profit = profit;
        self
    }

    fn shaped(mut self, escalated: bool, ramped: bool) -> Self {
        self.escalated = escalated;
        self.ramped = ramped;
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{ContractLength, Discount, ProfitModel};
    use rust_decimal_macros::dec;

    fn licenses() -> LineItem {
        LineItem::recurring("lic", "Licenses", dec!(100), dec!(10))
            .with_profit(ProfitModel::Margin { rate: dec!(0.8) })
    }

    fn annual_deal(items: Vec<LineItem>) -> Deal {
        let mut deal = Deal::new("d1", "Acme", ContractLength::FixedMonths { months: dec!(12) });
        deal.line_items = items;
        deal
    }

    #[test]
    fn test_single_recurring_item() {
        let totals = calculate_deal_totals(&annual_deal(vec![licenses()]));
        assert_eq!(totals.monthly_revenue, dec!(1000));
        assert_eq!(totals.monthly_profit, dec!(800));
        assert_eq!(totals.tcv, dec!(12000));
        assert_eq!(totals.term_profit, dec!(9600));
        assert_eq!(totals.arr, dec!(12000));
        assert_eq!(totals.effective_mrr, dec!(1000));
        assert_eq!(totals.blended_margin_pct, Some(dec!(80)));
        assert_eq!(totals.contracted_ltv, dec!(9600));
        assert_eq!(totals.software_revenue, dec!(12000));
        assert_eq!(totals.services_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_discounted_recurring_item() {
        let item = licenses().with_discount(Discount::percentage(dec!(20)));
        let mut deal = annual_deal(vec![item]);
        deal.discount_floor_pct = dec!(25);

        let totals = calculate_deal_totals(&deal);
        assert_eq!(totals.monthly_revenue, dec!(800));
        assert_eq!(totals.monthly_profit, dec!(640));
        assert_eq!(totals.list_revenue, dec!(12000));
        assert_eq!(totals.avg_discount_depth_pct, dec!(20));
        assert!(!totals.exceeds_discount_floor);

        deal.discount_floor_pct = dec!(15);
        assert!(calculate_deal_totals(&deal).exceeds_discount_floor);
    }

    #[test]
    fn test_free_months_reduce_term_revenue() {
        let mut deal = annual_deal(vec![licenses()]);
        deal.toggles.free_months = true;
        deal.free_months_up_front = dec!(3);

        let totals = calculate_deal_totals(&deal);
        assert_eq!(totals.billable_months, 9);
        assert_eq!(totals.tcv, dec!(9000));
        assert_eq!(totals.term_profit, dec!(7200));
        assert_eq!(totals.effective_mrr, dec!(750));
    }

    #[test]
    fn test_cac_metrics() {
        let mut deal = annual_deal(vec![licenses()]);
        deal.cac = dec!(1200);
        assert_eq!(calculate_deal_totals(&deal).cac, Decimal::ZERO);

        deal.toggles.cac = true;
        let totals = calculate_deal_totals(&deal);
        assert_eq!(totals.cac, dec!(1200));
        assert_eq!(totals.payback_months, Some(dec!(1.5)));
        assert_eq!(totals.ltv_to_cac, Some(dec!(8)));
    }

    #[test]
    fn test_payback_none_without_profit() {
        let mut deal = annual_deal(vec![LineItem::recurring("x", "X", dec!(100), dec!(1))]);
        deal.toggles.cac = true;
        deal.cac = dec!(500);

        let totals = calculate_deal_totals(&deal);
        assert_eq!(totals.monthly_profit, Decimal::ZERO);
        assert_eq!(totals.payback_months, None);
        assert_eq!(totals.ltv_to_cac, Some(Decimal::ZERO));
    }

    #[test]
    fn test_one_time_item_not_shaped() {
        let setup = LineItem::one_time("setup", "Setup", dec!(5000))
            .with_discount(Discount::absolute(dec!(500)))
            .with_profit(ProfitModel::Fixed { amount: dec!(2000) })
            .as_service();
        let totals = calculate_deal_totals(&annual_deal(vec![setup]));
        assert_eq!(totals.tcv, dec!(4500));
        assert_eq!(totals.term_profit, dec!(2000));
        assert_eq!(totals.one_time_revenue, dec!(4500));
        assert_eq!(totals.services_revenue, dec!(4500));
        assert_eq!(totals.monthly_revenue, Decimal::ZERO);
        assert_eq!(totals.avg_discount_depth_pct, dec!(10));
    }

    #[test]
    fn test_excluded_items_ignored() {
        let mut excluded = licenses();
        excluded.included = false;
        let aggregation = aggregate_deal(&annual_deal(vec![excluded]));
        assert!(aggregation.line_items.is_empty());
        assert_eq!(aggregation.totals.tcv, Decimal::ZERO);
    }

    #[test]
    fn test_empty_deal() {
        let totals = calculate_deal_totals(&annual_deal(vec![]));
        assert_eq!(totals.tcv, Decimal::ZERO);
        assert_eq!(totals.blended_margin_pct, None);
        assert_eq!(totals.effective_mrr, Decimal::ZERO);
        assert_eq!(totals.avg_discount_depth_pct, Decimal::ZERO);
        assert!(!totals.exceeds_discount_floor);
        assert_eq!(totals.ltv_to_cac, None);
        assert_eq!(totals.payback_months, None);
    }

    #[test]
    fn test_ramp_shapes_term_profit_by_ratio() {
        let mut deal = annual_deal(vec![licenses()]);
        deal.toggles.ramp = true;
        deal.ramp_months = dec!(3);
        deal.ramp_discount_pct = dec!(50);

        let aggregation = aggregate_deal(&deal);
        let item = &aggregation.line_items[0];
        assert!(item.ramped);
        assert_eq!(item.term_revenue, dec!(10500));
        assert_eq!(item.term_profit, dec!(8400));
        // Monthly figures are unshaped
        assert_eq!(aggregation.totals.monthly_revenue, dec!(1000));
        // Ramp is not a line-item discount
        assert_eq!(aggregation.totals.avg_discount_depth_pct, Decimal::ZERO);
    }

    #[test]
    fn test_mixed_deal_breakdown() {
        let setup = LineItem::one_time("setup", "Setup", dec!(3000))
            .with_profit(ProfitModel::Margin { rate: dec!(0.5) })
            .as_service();
        let aggregation = aggregate_deal(&annual_deal(vec![licenses(), setup]));

        let totals = &aggregation.totals;
        assert_eq!(totals.tcv, dec!(15000));
        assert_eq!(totals.term_profit, dec!(11100));
        assert_eq!(totals.recurring_revenue, dec!(12000));
        assert_eq!(totals.one_time_revenue, dec!(3000));
        assert_eq!(totals.software_revenue, dec!(12000));
        assert_eq!(totals.services_revenue, dec!(3000));
        assert_eq!(totals.blended_margin_pct, Some(dec!(74)));

        assert_eq!(aggregation.line_items.len(), 2);
        assert_eq!(aggregation.line_items[1].kind, ItemKind::OneTime);
        assert_eq!(aggregation.line_items[1].monthly_revenue, None);
    }
}
