use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::aggregate::DealTotals;
use crate::numeric::safe_ratio;

/// Differences at or below this are a tie.
const TIE_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Arr,
    Tcv,
    EffectiveMrr,
    NetMarginDollars,
    NetMarginPct,
    LtvToCac,
    PaybackMonths,
    TotalProfit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetterDirection {
    Higher,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
    Tie,
}

impl Winner {
    pub fn swapped(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
            Self::Tie => Self::Tie,
        }
    }
}

impl MetricKey {
    pub const ALL: [MetricKey; 8] = [
        MetricKey::Arr,
        MetricKey::Tcv,
        MetricKey::EffectiveMrr,
        MetricKey::NetMarginDollars,
        MetricKey::NetMarginPct,
        MetricKey::LtvToCac,
        MetricKey::PaybackMonths,
        MetricKey::TotalProfit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Arr => "ARR",
            Self::Tcv => "TCV",
            Self::EffectiveMrr => "Effective MRR",
            Self::NetMarginDollars => "Net margin ($)",
            Self::NetMarginPct => "Net margin (%)",
            Self::LtvToCac => "LTV:CAC",
            Self::PaybackMonths => "Payback (months)",
            Self::TotalProfit => "Total profit",
        }
    }

    pub fn better(self) -> BetterDirection {
        match self {
            Self::PaybackMonths => BetterDirection::Lower,
            _ => BetterDirection::Higher,
        }
    }

    /// Read this metric from a set of totals. Ratios that do not apply
    /// to the deal are `None`.
    pub fn value(self, totals: &DealTotals) -> Option<Decimal> {
        match self {
            Self::Arr => Some(totals.arr),
            Self::Tcv => Some(totals.tcv),
            Self::EffectiveMrr => Some(totals.effective_mrr),
            Self::NetMarginDollars => Some(totals.term_profit.saturating_sub(totals.cac)),
            Self::NetMarginPct => totals.blended_margin_pct,
            Self::LtvToCac => totals.ltv_to_cac,
            Self::PaybackMonths => totals.payback_months,
            Self::TotalProfit => Some(totals.term_profit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetric {
    pub metric: MetricKey,
    pub label: String,
    pub better: BetterDirection,
    pub value_a: Option<Decimal>,
    pub value_b: Option<Decimal>,
    /// value_b - value_a
    pub delta: Option<Decimal>,
    /// delta relative to |value_a|, in percent; zero when value_a is zero
    pub delta_pct: Option<Decimal>,
    pub winner: Winner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub metrics: Vec<ComparisonMetric>,
    pub a_wins: u32,
    pub b_wins: u32,
    pub ties: u32,
    /// Side winning more metrics
    pub overall: Winner,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare scenario B against scenario A across the standard metric set.
pub fn compare_scenarios(a: &DealTotals, b: &DealTotals) -> ScenarioComparison {
    let metrics: Vec<ComparisonMetric> = MetricKey::ALL
        .iter()
        .map(|key| compare_metric(*key, key.value(a), key.value(b)))
        .collect();

    let count = |w: Winner| metrics.iter().filter(|m| m.winner == w).count() as u32;
    let a_wins = count(Winner::A);
    let b_wins = count(Winner::B);
    let ties = count(Winner::Tie);

    let overall = match a_wins.cmp(&b_wins) {
        std::cmp::Ordering::Greater => Winner::A,
        std::cmp::Ordering::Less => Winner::B,
        std::cmp::Ordering::Equal => Winner::Tie,
    };

    ScenarioComparison {
        metrics,
        a_wins,
        b_wins,
        ties,
        overall,
    }
}

/// Compare a single metric. A metric missing on either side cannot be
/// compared and is reported as a tie with no delta.
pub fn compare_metric(
    metric: MetricKey,
    value_a: Option<Decimal>,
    value_b: Option<Decimal>,
) -> ComparisonMetric {
    let better = metric.better();
    let (delta, delta_pct, winner) = match (value_a, value_b) {
        (Some(a), Some(b)) => {
            let delta = b.saturating_sub(a);
            let delta_pct = safe_ratio(delta, a.abs())
                .map(|r| r.saturating_mul(dec!(100)))
                .unwrap_or(Decimal::ZERO);
            (Some(delta), Some(delta_pct), pick_winner(delta, better))
        }
        _ => (None, None, Winner::Tie),
    };

    ComparisonMetric {
        metric,
        label: metric.label().to_string(),
        better,
        value_a,
        value_b,
        delta,
        delta_pct,
        winner,
    }
}

fn pick_winner(delta: Decimal, better: BetterDirection) -> Winner {
    if delta.abs() <= TIE_TOLERANCE {
        return Winner::Tie;
    }
    let b_higher = delta > Decimal::ZERO;
    match (better, b_higher) {
        (BetterDirection::Higher, true) | (BetterDirection::Lower, false) => Winner::B,
        _ => Winner::A,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
