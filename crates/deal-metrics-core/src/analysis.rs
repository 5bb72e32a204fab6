//! Envelope-producing entry points combining the individual calculators.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::aggregate::{aggregate_deal, DealTotals, LineItemBreakdown};
use crate::cash_flow::{break_even_month, project_cash_flow, CashFlowPoint};
use crate::comparison::{compare_scenarios, ScenarioComparison};
use crate::deal::Deal;
use crate::health::{score_deal_health, HealthResult};
use crate::types::{with_metadata, ComputationOutput};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub totals: DealTotals,
    pub line_items: Vec<LineItemBreakdown>,
    pub health: HealthResult,
    pub cash_flow: Vec<CashFlowPoint>,
    pub break_even_month: Option<u32>,
}

/// Full valuation of a single deal.
pub fn analyze_deal(deal: &Deal) -> ComputationOutput<DealAnalysis> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let aggregation = aggregate_deal(deal);
    let totals = aggregation.totals;
    let health = score_deal_health(deal, &totals);
    let cash_flow = project_cash_flow(&totals, deal.billing);

    if aggregation.line_items.is_empty() {
        warnings.push("Deal has no included line items".into());
    }
    if totals.exceeds_discount_floor {
        warnings.push(format!(
            "Average discount depth {}% exceeds the {}% discount floor",
            totals.avg_discount_depth_pct.round_dp(2),
            deal.discount_floor_pct
        ));
    }
    for item in aggregation.line_items.iter().filter(|i| i.escalated && i.ramped) {
        warnings.push(format!(
            "Ramp pricing replaces escalated revenue for '{}'; the two are not compounded",
            item.name
        ));
    }
    if aggregation.line_items.iter().any(|i| i.escalated || i.ramped) {
        warnings.push(
            "Cash flow uses term-average monthly profit; ramp and escalation timing is not reflected"
                .into(),
        );
    }

    let output = DealAnalysis {
        break_even_month: break_even_month(&cash_flow),
        totals,
        line_items: aggregation.line_items,
        health,
        cash_flow,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Deal valuation: term resolution, line-item pricing, revenue shaping, health rubric",
        &serde_json::json!({
            "deal_id": deal.id,
            "billing": deal.billing,
            "contract": deal.contract,
            "toggles": deal.toggles,
        }),
        warnings,
        elapsed,
        output,
    )
}

/// Compare two deals as scenario A and scenario B.
pub fn compare_deals(a: &Deal, b: &Deal) -> ComputationOutput<ScenarioComparison> {
    let start = Instant::now();

    let totals_a = aggregate_deal(a).totals;
    let totals_b = aggregate_deal(b).totals;
    let comparison = compare_scenarios(&totals_a, &totals_b);

    let warnings: Vec<String> = comparison
        .metrics
        .iter()
        .filter(|m| m.delta.is_none())
        .map(|m| format!("{} is not applicable to both scenarios", m.label))
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Two-scenario deal comparison (delta = B - A)",
        &serde_json::json!({
            "scenario_a": a.id,
            "scenario_b": b.id,
            "tie_tolerance": "0.01",
        }),
        warnings,
        elapsed,
        comparison,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::Winner;
    use crate::deal::{ContractLength, LineItem, ProfitModel};
    use crate::health::HealthStatus;
    use rust_decimal_macros::dec;

    fn deal() -> Deal {
        let mut deal = Deal::new("d1", "Acme", ContractLength::FixedYears { years: dec!(2) });
        deal.line_items = vec![LineItem::recurring("seats", "Seats", dec!(100), dec!(10))
            .with_profit(ProfitModel::Margin { rate: dec!(0.8) })];
        deal
    }

    #[test]
    fn test_analyze_clean_deal() {
        let out = analyze_deal(&deal());
        assert!(out.warnings.is_empty());
        assert_eq!(out.result.cash_flow.len(), 24);
        assert_eq!(out.result.break_even_month, Some(1));
        assert_eq!(out.result.health.status, HealthStatus::Strong);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_analyze_warns_on_shaping() {
        let mut d = deal();
        d.toggles.escalation = true;
        d.escalator_pct = dec!(5);
        d.toggles.ramp = true;
        d.ramp_months = dec!(2);
        d.ramp_discount_pct = dec!(50);

        let out = analyze_deal(&d);
        assert_eq!(out.warnings.len(), 2);
        assert!(out.warnings[0].contains("Seats"));
    }

    #[test]
    fn test_analyze_empty_deal_warns() {
        let mut d = deal();
        d.line_items.clear();
        let out = analyze_deal(&d);
        assert_eq!(out.warnings, vec!["Deal has no included line items".to_string()]);
    }

    #[test]
    fn test_compare_deals_warns_on_missing_ratios() {
        let out = compare_deals(&deal(), &deal());
        // No CAC: LTV:CAC and payback are not applicable
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.result.overall, Winner::Tie);
    }
}
