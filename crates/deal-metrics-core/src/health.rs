use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregate::DealTotals;
use crate::deal::{Deal, LineItemKind};
use crate::line_item::effective_price;
use crate::numeric::{safe_ratio, saturating_sum};
use crate::types::Percent;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Strong,
    Ok,
    Risky,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "Strong"),
            Self::Ok => write!(f, "OK"),
            Self::Risky => write!(f, "Risky"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResult {
    pub status: HealthStatus,
    /// 0-100
    pub score: u32,
    pub positives: Vec<String>,
    pub concerns: Vec<String>,
    /// Every reason in the order the checks ran
    pub reasons: Vec<String>,
}

// ---------------------------------------------------------------------------
// Rubric
// ---------------------------------------------------------------------------

const BASE_SCORE: i32 = 50;

const STRONG_MARGIN_PCT: Decimal = dec!(55);
const ACCEPTABLE_MARGIN_PCT: Decimal = dec!(40);
const STRONG_MARGIN_POINTS: i32 = 40;
const ACCEPTABLE_MARGIN_POINTS: i32 = 20;
const LOW_MARGIN_POINTS: i32 = -20;

const DISCOUNT_BREACH_POINTS: i32 = -20;

const STRONG_TERM_MONTHS: u32 = 12;
const MODERATE_TERM_MONTHS: u32 = 6;
const STRONG_TERM_POINTS: i32 = 20;
const MODERATE_TERM_POINTS: i32 = 10;
const SHORT_TERM_POINTS: i32 = -10;

const MAX_ONE_TIME_SHARE_PCT: Decimal = dec!(30);
const ONE_TIME_HEAVY_POINTS: i32 = -20;
const ALL_RECURRING_POINTS: i32 = 10;

const STRONG_STATUS_SCORE: u32 = 70;
const OK_STATUS_SCORE: u32 = 40;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a deal on a fixed 0-100 rubric.
///
/// Starts from a neutral 50 and runs four independent checks: blended
/// margin, discount-floor compliance, term length and revenue mix. Each check
/// contributes one reason, filed as a positive or a concern.
pub fn score_deal_health(deal: &Deal, totals: &DealTotals) -> HealthResult {
    let mut card = Scorecard::new();

    let margin = totals.blended_margin_pct.unwrap_or(Decimal::ZERO);
    if margin >= STRONG_MARGIN_PCT {
        card.positive(STRONG_MARGIN_POINTS, format!("Strong margin of {}%", pct(margin)));
    } else if margin >= ACCEPTABLE_MARGIN_PCT {
        card.positive(
            ACCEPTABLE_MARGIN_POINTS,
            format!("Acceptable margin of {}%", pct(margin)),
        );
    } else {
        card.concern(LOW_MARGIN_POINTS, format!("Low margin of {}%", pct(margin)));
    }

    if totals.exceeds_discount_floor {
        card.concern(
            DISCOUNT_BREACH_POINTS,
            format!(
                "Average discount of {}% exceeds the {}% discount floor",
                pct(totals.avg_discount_depth_pct),
                pct(deal.discount_floor_pct)
            ),
        );
    } else if totals.avg_discount_depth_pct > Decimal::ZERO {
        card.positive(
            0,
            format!(
                "Discounts within limits ({}% average)",
                pct(totals.avg_discount_depth_pct)
            ),
        );
    }

    let months = totals.term_months;
    if months >= STRONG_TERM_MONTHS {
        card.positive(
            STRONG_TERM_POINTS,
            format!("Strong commitment with a {months}-month term"),
        );
    } else if months >= MODERATE_TERM_MONTHS {
        card.positive(
            MODERATE_TERM_POINTS,
            format!("Moderate commitment with a {months}-month term"),
        );
    } else {
        card.concern(SHORT_TERM_POINTS, format!("Short {months}-month term"));
    }

    let one_time_share = one_time_share_pct(deal, totals);
    if one_time_share > MAX_ONE_TIME_SHARE_PCT {
        card.concern(
            ONE_TIME_HEAVY_POINTS,
            format!(
                "One-time revenue is {}% of contract value",
                pct(one_time_share)
            ),
        );
    } else if one_time_share > Decimal::ZERO {
        card.positive(
            0,
            format!(
                "Balanced revenue mix ({}% one-time)",
                pct(one_time_share)
            ),
        );
    } else {
        card.positive(ALL_RECURRING_POINTS, "100% recurring revenue".to_string());
    }

    card.finish()
}

/// Status band for a clamped score.
pub fn status_for_score(score: u32) -> HealthStatus {
    if score >= STRONG_STATUS_SCORE {
        HealthStatus::Strong
    } else if score >= OK_STATUS_SCORE {
        HealthStatus::Ok
    } else {
        HealthStatus::Risky
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// One-time revenue as a share of TCV, summed directly from the deal's
/// included one-time items.
fn one_time_share_pct(deal: &Deal, totals: &DealTotals) -> Percent {
    let one_time = saturating_sum(deal.included_items().filter_map(|item| match &item.kind {
        LineItemKind::OneTime { list_price } => Some(effective_price(*list_price, &item.discount)),
        LineItemKind::Recurring { .. } => None,
    }));

    safe_ratio(one_time, totals.tcv)
        .map(|r| r.saturating_mul(dec!(100)))
        .unwrap_or(Decimal::ZERO)
}

fn pct(value: Decimal) -> Decimal {
    value.round_dp(1).normalize()
}

struct Scorecard {
    score: i32,
    positives: Vec<String>,
    concerns: Vec<String>,
    reasons: Vec<String>,
}

impl Scorecard {
    fn new() -> Self {
        Self {
            score: BASE_SCORE,
            positives: Vec::new(),
            concerns: Vec::new(),
            reasons: Vec::new(),
        }
    }

    fn positive(&mut self, points: i32, reason: String) {
        self.score += points;
        self.reasons.push(reason.clone());
        self.positives.push(reason);
    }

    fn concern(&mut self, points: i32, reason: String) {
        self.score += points;
        self.reasons.push(reason.clone());
        self.concerns.push(reason);
    }

    fn finish(self) -> HealthResult {
        let score = self.score.clamp(0, 100) as u32;
        HealthResult {
            status: status_for_score(score),
            score,
            positives: self.positives,
            concerns: self.concerns,
            reasons: self.reasons,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
