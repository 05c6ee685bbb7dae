//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access, no I/O.
//! Rules are passed in fully materialized by the caller.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use super::models::{
    day_number, AppliedDiscount, BookingRequest, DiscountRule, MatchPolicy, PricingPolicy,
    PricingResult, RuleCondition, RuleKind,
};
use super::validation::{validate_inputs, ValidationError};

/// Total discount never exceeds this many percent, however many rules stack.
pub const MAX_TOTAL_DISCOUNT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Round to specified decimal places, halves away from zero.
///
/// Prices are never negative, so this is plain round-half-up.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use groundbook_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(2970.49), 0), dec!(2970));
/// assert_eq!(round_money(dec!(1.235), 2), dec!(1.24));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute a booking price using the default first-match policy.
pub fn compute_price(
    base_price: Decimal,
    request: &BookingRequest,
    rules: &[DiscountRule],
) -> Result<PricingResult, ValidationError> {
    compute_price_with_policy(base_price, request, rules, PricingPolicy::default())
}

/// Compute a booking price.
///
/// Discounts are gathered in a fixed order (weekday, bulk, off-peak), summed,
/// and capped at [`MAX_TOTAL_DISCOUNT`]. The order only affects the order of
/// the explanation lines.
pub fn compute_price_with_policy(
    base_price: Decimal,
    request: &BookingRequest,
    rules: &[DiscountRule],
    policy: PricingPolicy,
) -> Result<PricingResult, ValidationError> {
    validate_inputs(base_price, request, rules)?;

    let mut applied = weekday_discounts(rules, request, policy.weekday);
    applied.extend(bulk_discount(rules, request.duration_hours));
    applied.extend(off_peak_discounts(rules, request.start_hour, policy.off_peak));

    for discount in &applied {
        debug!(
            rule_id = %discount.rule_id,
            kind = %discount.kind,
            percent = %discount.percent,
            "discount applied"
        );
    }

    let raw_discount_percent: Decimal = applied.iter().map(|d| d.percent.value()).sum();
    let total_discount_percent = raw_discount_percent.min(MAX_TOTAL_DISCOUNT);

    let subtotal = base_price
        .checked_mul(Decimal::from(request.duration_hours))
        .ok_or(ValidationError::AmountOverflow)?;
    let final_price = apply_discount(subtotal, total_discount_percent)?;

    Ok(PricingResult {
        subtotal,
        raw_discount_percent,
        total_discount_percent,
        discount_amount: subtotal - final_price,
        final_price,
        applied,
    })
}

/// Reduce `amount` by `percent` and round to a whole currency unit.
pub fn apply_discount(amount: Decimal, percent: Decimal) -> Result<Decimal, ValidationError> {
    let discounted = amount
        .checked_mul(Decimal::ONE_HUNDRED - percent)
        .ok_or(ValidationError::AmountOverflow)?
        / Decimal::ONE_HUNDRED;
    Ok(round_money(discounted, 0).max(Decimal::ZERO))
}

fn active(rules: &[DiscountRule]) -> impl Iterator<Item = &DiscountRule> {
    rules.iter().filter(|rule| rule.active)
}

fn weekday_discounts(
    rules: &[DiscountRule],
    request: &BookingRequest,
    policy: MatchPolicy,
) -> Vec<AppliedDiscount> {
    let today = request.weekday();
    let matching = active(rules).filter(|rule| {
        matches!(&rule.condition, RuleCondition::Weekday { days } if days.contains(&today))
    });

    let describe = |rule: &DiscountRule| AppliedDiscount {
        rule_id: rule.id.clone(),
        kind: RuleKind::Weekday,
        percent: rule.discount,
        description: format!("Weekday discount: {}%", rule.discount),
    };

    let applied: Vec<_> = match policy {
        MatchPolicy::FirstMatch => matching.take(1).map(describe).collect(),
        MatchPolicy::Cumulative => matching.map(describe).collect(),
    };
    if applied.is_empty() {
        debug!(day = day_number(today), "no weekday rule matched");
    }
    applied
}

/// Highest qualifying tier wins; tiers never stack.
fn bulk_discount(rules: &[DiscountRule], duration_hours: u32) -> Option<AppliedDiscount> {
    let mut tiers: Vec<(u32, &DiscountRule)> = active(rules)
        .filter_map(|rule| match rule.condition {
            RuleCondition::Bulk { min_hours } => Some((min_hours, rule)),
            _ => None,
        })
        .collect();
    // Stable: equal thresholds keep input order.
    tiers.sort_by(|a, b| b.0.cmp(&a.0));

    tiers
        .into_iter()
        .find(|(min_hours, _)| *min_hours <= duration_hours)
        .map(|(min_hours, rule)| AppliedDiscount {
            rule_id: rule.id.clone(),
            kind: RuleKind::Bulk,
            percent: rule.discount,
            description: format!("{}+ hours discount: {}%", min_hours, rule.discount),
        })
}

fn off_peak_discounts(
    rules: &[DiscountRule],
    start_hour: u8,
    policy: MatchPolicy,
) -> Vec<AppliedDiscount> {
    let windows = active(rules).filter_map(|rule| match rule.condition {
        RuleCondition::OffPeak(range) => Some((range, rule)),
        _ => None,
    });

    let describe = |rule: &DiscountRule| AppliedDiscount {
        rule_id: rule.id.clone(),
        kind: RuleKind::OffPeak,
        percent: rule.discount,
        description: format!("Off-peak discount: {}%", rule.discount),
    };

    match policy {
        // Only the first off-peak window is considered, matching or not.
        MatchPolicy::FirstMatch => windows
            .take(1)
            .filter(|(range, _)| range.contains(start_hour))
            .map(|(_, rule)| describe(rule))
            .collect(),
        MatchPolicy::Cumulative => windows
            .filter(|(range, _)| range.contains(start_hour))
            .map(|(_, rule)| describe(rule))
            .collect(),
    }
}

/// Render an amount for display, e.g. `PKR 2,970`.
///
/// Presentation only: callers must charge the unformatted amount.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let normalized = amount.normalize();
    let text = normalized.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if normalized.is_sign_negative() && !normalized.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{} {}{}.{}", currency, sign, grouped, frac),
        None => format!("{} {}{}", currency, sign, grouped),
    }
}
