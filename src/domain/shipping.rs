use bigdecimal::BigDecimal;

const BASE_FEE: i64 = 200;
const TIER_STEP_FEE: i64 = 50;
const TIER_SIZE: i64 = 5;
const LAST_TIER_CEILING: i64 = 25;
const LAST_TIER_FEE: i64 = 400;

/// Flat shipping fee for a cart holding `total_quantity` items.
///
/// Fees step up by 50 for every started block of five items: 1–5 → 200,
/// 6–10 → 250, ..., 21–25 → 400, and the same progression continues past 25.
/// Quantities of zero or below are charged the first tier.
pub fn shipping_cost(total_quantity: i64) -> BigDecimal {
    BigDecimal::from(shipping_fee_units(total_quantity))
}

fn shipping_fee_units(total_quantity: i64) -> i64 {
    if total_quantity <= TIER_SIZE {
        return BASE_FEE;
    }
    if total_quantity <= LAST_TIER_CEILING {
        let tier = (total_quantity - 1) / TIER_SIZE;
        return BASE_FEE + TIER_STEP_FEE * tier;
    }
    let extra_blocks = (total_quantity - LAST_TIER_CEILING + TIER_SIZE - 1) / TIER_SIZE;
    LAST_TIER_FEE + TIER_STEP_FEE * extra_blocks
}
