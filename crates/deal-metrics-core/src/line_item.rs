use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::deal::{Discount, DiscountMode, LineItem, LineItemKind, ProfitModel};
use crate::numeric::{clamp_unit, non_negative};
use crate::types::Money;

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Monthly economics of a recurring line item, before any term shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringValuation {
    pub list_unit_price: Money,
    pub discount_per_unit: Money,
    pub effective_unit_price: Money,
    pub unit_count: Decimal,
    /// list_unit_price * unit_count
    pub monthly_list_revenue: Money,
    /// effective_unit_price * unit_count
    pub monthly_revenue: Money,
    pub monthly_profit: Money,
    /// monthly_revenue * 12
    pub annualized_revenue: Money,
}

/// Economics of a one-time line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimeValuation {
    pub list_price: Money,
    pub discount_amount: Money,
    pub effective_price: Money,
    pub profit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItemValuation {
    Recurring(RecurringValuation),
    OneTime(OneTimeValuation),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Discount taken off `list_price`, never more than the price itself.
pub fn discount_amount(list_price: Money, discount: &Discount) -> Money {
    let list_price = non_negative(list_price);
    let value = non_negative(discount.value);
    let amount = match discount.mode {
        DiscountMode::Absolute => value,
        DiscountMode::Percentage => list_price.saturating_mul(value / dec!(100)),
    };
    amount.min(list_price)
}

/// Price after discount; never negative.
pub fn effective_price(list_price: Money, discount: &Discount) -> Money {
    non_negative(list_price) - discount_amount(list_price, discount)
}

/// Value a recurring item per month.
pub fn value_recurring(
    monthly_list_price: Money,
    unit_count: Decimal,
    discount: &Discount,
    profit: &ProfitModel,
) -> RecurringValuation {
    let list_unit_price = non_negative(monthly_list_price);
    let unit_count = non_negative(unit_count);
    let discount_per_unit = discount_amount(list_unit_price, discount);
    let effective_unit_price = list_unit_price - discount_per_unit;
    let monthly_revenue = effective_unit_price.saturating_mul(unit_count);

    let monthly_profit = match profit {
        ProfitModel::Margin { rate } => monthly_revenue * clamp_unit(*rate),
        ProfitModel::Fixed { amount } => amount.saturating_mul(unit_count),
    };

    RecurringValuation {
        list_unit_price,
        discount_per_unit,
        effective_unit_price,
        unit_count,
        monthly_list_revenue: list_unit_price.saturating_mul(unit_count),
        monthly_revenue,
        monthly_profit,
        annualized_revenue: monthly_revenue.saturating_mul(MONTHS_PER_YEAR),
    }
}

/// Value a one-time item.
pub fn value_one_time(
    list_price: Money,
    discount: &Discount,
    profit: &ProfitModel,
) -> OneTimeValuation {
    let list_price = non_negative(list_price);
    let discount_amount = discount_amount(list_price, discount);
    let effective_price = list_price - discount_amount;

    let profit = match profit {
        ProfitModel::Margin { rate } => effective_price * clamp_unit(*rate),
        ProfitModel::Fixed { amount } => *amount,
    };

    OneTimeValuation {
        list_price,
        discount_amount,
        effective_price,
        profit,
    }
}

/// Dispatch on the item's kind.
pub fn value_line_item(item: &LineItem) -> LineItemValuation {
    match &item.kind {
        LineItemKind::Recurring {
            monthly_list_price,
            unit_count,
        } => LineItemValuation::Recurring(value_recurring(
            *monthly_list_price,
            *unit_count,
            &item.discount,
            &item.profit,
        )),
        LineItemKind::OneTime { list_price } => {
            LineItemValuation::OneTime(value_one_time(*list_price, &item.discount, &item.profit))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
