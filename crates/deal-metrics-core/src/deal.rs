use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};
use crate::DealMetricsResult;

// ---------------------------------------------------------------------------
// Deal
// ---------------------------------------------------------------------------

/// How the customer is invoiced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCadence {
    #[default]
    Monthly,
    AnnualPrepay,
}

/// Contract length as configured on the deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ContractLength {
    MonthToMonth,
    FixedMonths { months: Decimal },
    FixedYears { years: Decimal },
}

impl Default for ContractLength {
    fn default() -> Self {
        Self::FixedMonths {
            months: Decimal::from(12),
        }
    }
}

/// Switches gating the optional deal-level adjustments.
///
/// A setting whose toggle is off is ignored even when its value is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealToggles {
    pub free_months: bool,
    pub cac: bool,
    pub ramp: bool,
    pub escalation: bool,
}

/// A sales contract made of priced line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub billing: BillingCadence,
    #[serde(default)]
    pub contract: ContractLength,
    /// Months at the start of the term that are not billed
    #[serde(default)]
    pub free_months_up_front: Decimal,
    /// Customer acquisition cost
    #[serde(default)]
    pub cac: Money,
    /// Maximum average discount depth allowed by policy, e.g. 25 = 25%
    #[serde(default)]
    pub discount_floor_pct: Percent,
    /// Length of the discounted onboarding ramp
    #[serde(default)]
    pub ramp_months: Decimal,
    /// Discount applied to recurring revenue during the ramp, e.g. 50 = half price
    #[serde(default)]
    pub ramp_discount_pct: Percent,
    /// Annual price increase on recurring items, e.g. 5 = 5% per year
    #[serde(default)]
    pub escalator_pct: Percent,
    #[serde(default)]
    pub toggles: DealToggles,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Deal {
    pub fn new(id: impl Into<String>, name: impl Into<String>, contract: ContractLength) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            billing: BillingCadence::default(),
            contract,
            free_months_up_front: Decimal::ZERO,
            cac: Decimal::ZERO,
            discount_floor_pct: Decimal::ZERO,
            ramp_months: Decimal::ZERO,
            ramp_discount_pct: Decimal::ZERO,
            escalator_pct: Decimal::ZERO,
            toggles: DealToggles::default(),
            line_items: Vec::new(),
        }
    }

    /// Parse a deal from its JSON representation.
    pub fn from_json(json: &str) -> DealMetricsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Line items that take part in the valuation.
    pub fn included_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|item| item.included)
    }
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMode {
    #[default]
    Percentage,
    Absolute,
}

/// Discount off list price. Percentage values are on the 0-100 scale,
/// absolute values are in currency per unit (or per one-time item).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Discount {
    pub mode: DiscountMode,
    pub value: Decimal,
}

impl Discount {
    pub fn percentage(value: Percent) -> Self {
        Self {
            mode: DiscountMode::Percentage,
            value,
        }
    }

    pub fn absolute(value: Money) -> Self {
        Self {
            mode: DiscountMode::Absolute,
            value,
        }
    }
}

/// How a line item's profit is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProfitModel {
    /// Profit is a fraction of discounted revenue.
    Margin { rate: Rate },
    /// Fixed profit: per unit per month for recurring items, per item for one-time items.
    Fixed { amount: Money },
}

impl Default for ProfitModel {
    fn default() -> Self {
        Self::Margin {
            rate: Decimal::ZERO,
        }
    }
}

/// Kind-specific pricing for a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItemKind {
    Recurring {
        monthly_list_price: Money,
        unit_count: Decimal,
    },
    OneTime {
        list_price: Money,
    },
}

/// One priced component of a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    #[serde(default = "default_included")]
    pub included: bool,
    /// Services revenue rather than software
    #[serde(default)]
    pub is_service: bool,
    #[serde(default)]
    pub discount: Discount,
    #[serde(default)]
    pub profit: ProfitModel,
    #[serde(flatten)]
    pub kind: LineItemKind,
}

fn default_included() -> bool {
    true
}

impl LineItem {
    pub fn recurring(
        id: impl Into<String>,
        name: impl Into<String>,
        monthly_list_price: Money,
        unit_count: Decimal,
    ) -> Self {
        Self::with_kind(
            id,
            name,
            LineItemKind::Recurring {
                monthly_list_price,
                unit_count,
            },
        )
    }

    pub fn one_time(id: impl Into<String>, name: impl Into<String>, list_price: Money) -> Self {
        Self::with_kind(id, name, LineItemKind::OneTime { list_price })
    }

    fn with_kind(id: impl Into<String>, name: impl Into<String>, kind: LineItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            included: true,
            is_service: false,
            discount: Discount::default(),
            profit: ProfitModel::default(),
            kind,
        }
    }

    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_profit(mut self, profit: ProfitModel) -> Self {
        self.profit = profit;
        self
    }

    pub fn as_service(mut self) -> Self {
        self.is_service = true;
        self
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.kind, LineItemKind::Recurring { .. })
    }
}
