use napi::Result as NapiResult;
use napi_derive::napi;

use deal_metrics_core::aggregate::calculate_deal_totals as deal_totals;
use deal_metrics_core::deal::Deal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_deal(json: &str) -> NapiResult<Deal> {
    Deal::from_json(json).map_err(to_napi_error)
}

fn to_json(value: &impl serde::Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Single deal
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_deal_totals(deal_json: String) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    to_json(&deal_totals(&deal))
}

#[napi]
pub fn score_deal_health(deal_json: String) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    let totals = deal_totals(&deal);
    to_json(&deal_metrics_core::health::score_deal_health(&deal, &totals))
}

#[napi]
pub fn project_cash_flow(deal_json: String) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    let totals = deal_totals(&deal);
    to_json(&deal_metrics_core::cash_flow::project_cash_flow(
        &totals,
        deal.billing,
    ))
}

#[napi]
pub fn analyze_deal(deal_json: String) -> NapiResult<String> {
    let deal = parse_deal(&deal_json)?;
    to_json(&deal_metrics_core::analysis::analyze_deal(&deal))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_deals(deal_a_json: String, deal_b_json: String) -> NapiResult<String> {
    let a = parse_deal(&deal_a_json)?;
    let b = parse_deal(&deal_b_json)?;
    to_json(&deal_metrics_core::analysis::compare_deals(&a, &b))
}
