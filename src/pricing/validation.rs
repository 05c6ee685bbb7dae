//! Input validation for pricing computations.

use rust_decimal::Decimal;

use super::models::{BookingRequest, DiscountRule, RuleCondition, MAX_START_HOUR};

/// Malformed pricing input. Always reported to the caller, never corrected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("base price must not be negative (got {0})")]
    NegativeBasePrice(Decimal),

    #[error("duration must be at least one hour")]
    NonPositiveDuration,

    #[error("price is too large to compute")]
    AmountOverflow,

    #[error("start hour {0} is out of range (0-47)")]
    HourOutOfRange(u8),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("rule {rule_id}: discount {value} is outside 0-100")]
    DiscountOutOfRange { rule_id: String, value: Decimal },

    #[error("invalid time range {start}-{end}")]
    InvalidTimeRange { start: u8, end: u8 },

    #[error("day of week {0} is out of range (0=Sunday..6=Saturday)")]
    InvalidDayOfWeek(u8),

    #[error("rule {0}: weekday rule has no days")]
    EmptyDaySet(String),

    #[error("rule {0}: bulk threshold must be at least one hour")]
    ZeroBulkThreshold(String),

    #[error("unknown rule type '{0}'")]
    UnknownRuleKind(String),

    #[error("rule {rule_id}: {kind} rule is missing '{field}' in its condition")]
    ConditionMismatch {
        rule_id: String,
        kind: String,
        field: &'static str,
    },
}

/// Check the booking parameters and every active rule.
///
/// Inactive rules are skipped: they never take part in a computation.
pub fn validate_inputs(
    base_price: Decimal,
    request: &BookingRequest,
    rules: &[DiscountRule],
) -> Result<(), ValidationError> {
    if base_price < Decimal::ZERO {
        return Err(ValidationError::NegativeBasePrice(base_price));
    }
    if request.duration_hours == 0 {
        return Err(ValidationError::NonPositiveDuration);
    }
    if request.start_hour > MAX_START_HOUR {
        return Err(ValidationError::HourOutOfRange(request.start_hour));
    }

    rules
        .iter()
        .filter(|rule| rule.active)
        .try_for_each(validate_rule)
}

/// Check a single rule's condition for internal consistency.
pub fn validate_rule(rule: &DiscountRule) -> Result<(), ValidationError> {
    match &rule.condition {
        RuleCondition::Weekday { days } if days.is_empty() => {
            Err(ValidationError::EmptyDaySet(rule.id.clone()))
        }
        RuleCondition::Bulk { min_hours: 0 } => {
            Err(ValidationError::ZeroBulkThreshold(rule.id.clone()))
        }
        RuleCondition::OffPeak(range) | RuleCondition::Peak(range) => range.validate(),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{HourRange, Percent};
    use chrono::{NaiveDate, Weekday};
    use rust_decimal_macros::dec;

    fn request(start_hour: u8, duration_hours: u32) -> BookingRequest {
        BookingRequest {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            start_hour,
            duration_hours,
        }
    }

    fn rule(condition: RuleCondition, active: bool) -> DiscountRule {
        DiscountRule {
            id: "r1".to_string(),
            discount: Percent::new(dec!(10)).unwrap(),
            condition,
            active,
        }
    }

    #[test]
    fn test_rejects_negative_base_price() {
        let err = validate_inputs(dec!(-1), &request(10, 1), &[]).unwrap_err();
        assert_eq!(err, ValidationError::NegativeBasePrice(dec!(-1)));
    }

    #[test]
    fn test_rejects_zero_duration() {
        let err = validate_inputs(dec!(100), &request(10, 0), &[]).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveDuration);
    }

    #[test]
    fn test_rejects_out_of_range_hour() {
        assert!(validate_inputs(dec!(100), &request(47, 1), &[]).is_ok());
        let err = validate_inputs(dec!(100), &request(48, 1), &[]).unwrap_err();
        assert_eq!(err, ValidationError::HourOutOfRange(48));
    }

    #[test]
    fn test_zero_price_is_allowed() {
        assert!(validate_inputs(dec!(0), &request(10, 2), &[]).is_ok());
    }

    #[test]
    fn test_rejects_empty_weekday_set() {
        let rules = [rule(RuleCondition::Weekday { days: vec![] }, true)];
        let err = validate_inputs(dec!(100), &request(10, 1), &rules).unwrap_err();
        assert_eq!(err, ValidationError::EmptyDaySet("r1".to_string()));
    }

    #[test]
    fn test_rejects_zero_bulk_threshold() {
        let rules = [rule(RuleCondition::Bulk { min_hours: 0 }, true)];
        let err = validate_inputs(dec!(100), &request(10, 1), &rules).unwrap_err();
        assert_eq!(err, ValidationError::ZeroBulkThreshold("r1".to_string()));
    }

    #[test]
    fn test_rejects_inverted_range_built_directly() {
        let rules = [rule(RuleCondition::OffPeak(HourRange { start: 15, end: 12 }), true)];
        let err = validate_inputs(dec!(100), &request(10, 1), &rules).unwrap_err();
        assert_eq!(err, ValidationError::InvalidTimeRange { start: 15, end: 12 });
    }

    #[test]
    fn test_inactive_rules_are_not_validated() {
        let rules = [
            rule(RuleCondition::Weekday { days: vec![] }, false),
            rule(RuleCondition::Bulk { min_hours: 0 }, false),
        ];
        assert!(validate_inputs(dec!(100), &request(10, 1), &rules).is_ok());
    }

    #[test]
    fn test_valid_rule_set_passes() {
        let rules = [
            rule(RuleCondition::Weekday { days: vec![Weekday::Mon] }, true),
            rule(RuleCondition::Bulk { min_hours: 3 }, true),
            rule(RuleCondition::Peak(HourRange::new(18, 22).unwrap()), true),
        ];
        assert!(validate_inputs(dec!(100), &request(10, 1), &rules).is_ok());
    }

    #[test]
    fn test_error_messages_name_the_rule() {
        let err = ValidationError::DiscountOutOfRange {
            rule_id: "abc".to_string(),
            value: dec!(120),
        };
        assert!(err.to_string().contains("abc"));
        assert!(err.to_string().contains("120"));
    }
}
