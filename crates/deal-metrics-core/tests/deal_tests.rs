use deal_metrics_core::aggregate::calculate_deal_totals;
use deal_metrics_core::analysis::{analyze_deal, compare_deals};
use deal_metrics_core::comparison::{MetricKey, Winner};
use deal_metrics_core::deal::{ContractLength, Deal, LineItem, ProfitModel};
use deal_metrics_core::term::MAX_TERM_MONTHS;
use deal_metrics_core::health::HealthStatus;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn licenses_deal(extra: &str) -> Deal {
    let json = format!(
        r#"{{
            "id": "acme-2024",
            "name": "Acme renewal",
            {extra}
            "line_items": [
                {{
                    "id": "lic",
                    "name": "Licenses",
                    "kind": "recurring",
                    "monthly_list_price": 100,
                    "unit_count": 10,
                    "profit": {{"mode": "margin", "rate": "0.8"}}
                }}
            ]
        }}"#
    );
    Deal::from_json(&json).unwrap()
}

// ===========================================================================
// Worked examples
// ===========================================================================

#[test]
fn test_twelve_month_license_deal() {
    let totals = calculate_deal_totals(&licenses_deal(""));
    assert_eq!(totals.monthly_revenue, dec!(1000));
    assert_eq!(totals.monthly_profit, dec!(800));
    assert_eq!(totals.tcv, dec!(12000));
    assert_eq!(totals.term_profit, dec!(9600));
}

#[test]
fn test_twenty_percent_discount() {
    let mut deal = licenses_deal("");
    deal.line_items[0].discount = deal_metrics_core::deal::Discount::percentage(dec!(20));
    let totals = calculate_deal_totals(&deal);
    assert_eq!(totals.monthly_revenue, dec!(800));
    assert_eq!(totals.monthly_profit, dec!(640));
}

#[test]
fn test_three_free_months() {
    let deal = licenses_deal(
        r#""free_months_up_front": 3, "toggles": {"free_months": true},"#,
    );
    let totals = calculate_deal_totals(&deal);
    assert_eq!(totals.billable_months, 9);
    assert_eq!(totals.tcv, dec!(9000));
    assert_eq!(totals.term_profit, dec!(7200));
}

#[test]
fn test_payback_on_cac() {
    let deal = licenses_deal(r#""cac": 1200, "toggles": {"cac": true},"#);
    let totals = calculate_deal_totals(&deal);
    assert_eq!(totals.payback_months, Some(dec!(1.5)));
}

#[test]
fn test_one_time_fixed_profit_item() {
    let deal = Deal::from_json(
        r#"{
            "id": "impl",
            "name": "Implementation",
            "line_items": [
                {
                    "id": "svc",
                    "name": "Implementation services",
                    "kind": "one_time",
                    "list_price": 5000,
                    "is_service": true,
                    "discount": {"mode": "absolute", "value": 500},
                    "profit": {"mode": "fixed", "amount": 2000}
                }
            ]
        }"#,
    )
    .unwrap();
    let out = analyze_deal(&deal);
    assert_eq!(out.result.line_items[0].effective_price, dec!(4500));
    assert_eq!(out.result.totals.term_profit, dec!(2000));
    assert_eq!(out.result.totals.services_revenue, dec!(4500));
}

#[test]
fn test_zero_value_deal() {
    let deal = Deal::from_json(r#"{"id": "empty", "name": "Empty"}"#).unwrap();
    let totals = calculate_deal_totals(&deal);
    assert_eq!(totals.tcv, Decimal::ZERO);
    assert_eq!(totals.blended_margin_pct, None);
    assert_eq!(totals.effective_mrr, Decimal::ZERO);
    assert_eq!(totals.avg_discount_depth_pct, Decimal::ZERO);
    assert!(!totals.exceeds_discount_floor);
}

// ===========================================================================
// End-to-end
// ===========================================================================

#[test]
fn test_multi_year_escalated_deal() {
    let deal = licenses_deal(
        r#""contract": {"mode": "fixed_years", "years": 3},
           "escalator_pct": 10,
           "cac": 4000,
           "toggles": {"escalation": true, "cac": true},"#,
    );
    let out = analyze_deal(&deal);
    let totals = &out.result.totals;

    assert_eq!(totals.term_months, 36);
    assert_eq!(totals.tcv, dec!(39720));
    assert_eq!(totals.term_profit, dec!(31776));
    assert_eq!(totals.payback_months, Some(dec!(5)));
    assert_eq!(out.result.cash_flow.len(), 36);
    // 31776 / 36 = 882.67 per month against 4000 CAC
    assert_eq!(out.result.break_even_month, Some(5));
    assert_eq!(out.result.health.status, HealthStatus::Strong);
    assert_eq!(
        out.warnings,
        vec![
            "Cash flow uses term-average monthly profit; ramp and escalation timing is not reflected"
                .to_string()
        ]
    );
}

#[test]
fn test_month_to_month_deal_is_short_term() {
    let deal = licenses_deal(r#""contract": {"mode": "month_to_month"},"#);
    let out = analyze_deal(&deal);
    assert_eq!(out.result.totals.term_months, 1);
    assert_eq!(out.result.totals.tcv, dec!(1000));
    assert!(out
        .result
        .health
        .concerns
        .contains(&"Short 1-month term".to_string()));
}

#[test]
fn test_compare_discounted_renewal() {
    let list = licenses_deal("");
    let mut discounted = licenses_deal("");
    discounted.id = "acme-discounted".into();
    discounted.line_items[0].discount = deal_metrics_core::deal::Discount::percentage(dec!(10));

    let out = compare_deals(&list, &discounted);
    assert_eq!(out.result.overall, Winner::A);
    assert_eq!(out.result.metrics.len(), 8);
}

#[test]
fn test_analysis_serializes_nulls() {
    let deal = Deal::from_json(r#"{"id": "empty", "name": "Empty"}"#).unwrap();
    let value = serde_json::to_value(analyze_deal(&deal)).unwrap();
    assert!(value["result"]["totals"]["blended_margin_pct"].is_null());
    assert!(value["result"]["totals"]["payback_months"].is_null());
    assert_eq!(value["result"]["health"]["status"], "ok");
}

// ===========================================================================
// Extreme inputs
// ===========================================================================

fn seats_deal(contract: ContractLength, monthly_list_price: Decimal) -> Deal {
    let mut deal = Deal::new("extreme", "Extreme", contract);
    deal.line_items.push(
        LineItem::recurring("seats", "Seats", monthly_list_price, dec!(1000))
            .with_profit(ProfitModel::Margin { rate: dec!(0.5) }),
    );
    deal
}

#[test]
fn test_century_doubling_escalator_saturates() {
    let mut deal = seats_deal(ContractLength::FixedYears { years: dec!(100) }, dec!(1));
    deal.escalator_pct = dec!(100);
    deal.toggles.escalation = true;

    let out = analyze_deal(&deal);
    let totals = &out.result.totals;
    assert_eq!(totals.term_months, 1200);
    assert_eq!(totals.tcv, Decimal::MAX);
    assert!(totals.term_profit > Decimal::ZERO);
    assert_eq!(out.result.cash_flow.len(), 1200);
    assert_eq!(out.result.break_even_month, Some(1));
}

#[test]
fn test_oversized_list_price_saturates() {
    let deal = seats_deal(ContractLength::default(), dec!(10000000000000000000000000000));

    let out = analyze_deal(&deal);
    let totals = &out.result.totals;
    assert_eq!(totals.monthly_revenue, Decimal::MAX);
    assert_eq!(totals.arr, Decimal::MAX);
    assert_eq!(totals.tcv, Decimal::MAX);
    assert_eq!(out.result.cash_flow.len(), 12);

    let cmp = compare_deals(&licenses_deal(""), &deal);
    let tcv = cmp
        .result
        .metrics
        .iter()
        .find(|m| m.metric == MetricKey::Tcv)
        .unwrap();
    assert_eq!(tcv.winner, Winner::B);
}

#[test]
fn test_billion_year_contract_is_capped() {
    let deal = seats_deal(ContractLength::FixedYears { years: dec!(1000000000) }, dec!(1));

    let out = analyze_deal(&deal);
    assert_eq!(out.result.totals.term_months, MAX_TERM_MONTHS);
    assert_eq!(out.result.totals.tcv, dec!(1200000));
    assert_eq!(out.result.cash_flow.len(), 1200);
}

#[test]
fn test_negative_escalator_never_goes_below_zero() {
    let mut deal = seats_deal(ContractLength::FixedYears { years: dec!(3) }, dec!(1));
    deal.escalator_pct = dec!(-200);
    deal.toggles.escalation = true;

    let totals = calculate_deal_totals(&deal);
    assert_eq!(totals.tcv, dec!(12000));
    assert_eq!(totals.term_profit, dec!(6000));
}
