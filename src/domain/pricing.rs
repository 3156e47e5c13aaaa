//! Unit and line price computation.
//!
//! `unit = (sale price or base price) + Σ selected adjustments`, floored at
//! zero; `line = round_half_up(unit × quantity, 2)`.

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::catalog::{Product, ProductVariation};

/// Most integer digits a stored amount may carry (`NUMERIC(12,2)`).
const AMOUNT_INTEGER_DIGITS: i64 = 10;

/// Largest quantity accepted on a single order line.
pub const MAX_QUANTITY: i32 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub line_total: BigDecimal,
}

/// Round to two decimal places, half away from zero.
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Whether `value` fits a money column: at most two decimal places and at
/// most ten integer digits, so up to 9999999999.99. Only the representation
/// is inspected; exponent forms like `1e70000000` are never expanded.
pub fn is_storable_amount(value: &BigDecimal) -> bool {
    if value.is_zero() {
        return true;
    }
    let normalized = value.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    let integer_digits = normalized.digits() as i64 - scale;
    scale <= 2 && integer_digits <= AMOUNT_INTEGER_DIGITS
}

pub fn unit_price<'a>(
    base_price: &BigDecimal,
    sale_price: Option<&BigDecimal>,
    adjustments: impl IntoIterator<Item = &'a BigDecimal>,
) -> BigDecimal {
    let start = sale_price.unwrap_or(base_price).clone();
    let price = adjustments.into_iter().fold(start, |acc, adj| acc + adj);
    if price < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        price
    }
}

pub fn line_total(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    round_money(&(unit_price * BigDecimal::from(quantity)))
}

/// Price `quantity` units of `product` with the chosen variations applied.
pub fn quote(product: &Product, selected: &[&ProductVariation], quantity: i32) -> PriceQuote {
    let unit = unit_price(
        &product.price,
        product.sale_price.as_ref(),
        selected.iter().map(|v| &v.price_adjustment),
    );
    PriceQuote {
        line_total: line_total(&unit, quantity),
        unit_price: round_money(&unit),
        quantity,
    }
}

/// Sum of already-rounded line totals.
pub fn order_total<'a>(line_totals: impl IntoIterator<Item = &'a BigDecimal>) -> BigDecimal {
    let sum = line_totals
        .into_iter()
        .fold(BigDecimal::zero(), |acc, t| acc + t);
    round_money(&sum)
}
