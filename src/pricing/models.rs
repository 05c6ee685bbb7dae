//! Domain types for the pricing engine.
//!
//! Rules arrive fully typed: each [`RuleCondition`] variant carries only the
//! fields its kind needs. Loose wire/database payloads are converted in
//! [`super::requests`] before they reach the engine.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::ValidationError;

/// Highest start hour accepted (23:00 on the following day).
pub const MAX_START_HOUR: u8 = 47;

/// Upper bound for an hour range end (exclusive).
pub const MAX_RANGE_END: u8 = 48;

/// Percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a [`Percent`], rejecting values outside `[0, 100]`.
    pub fn new(value: Decimal) -> Option<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // NUMERIC(5,2) columns come back as e.g. 15.00
        write!(f, "{}", self.0.normalize())
    }
}

/// Rule taxonomy. `Peak` is reserved and never contributes a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Weekday,
    Bulk,
    OffPeak,
    Peak,
}

impl RuleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Weekday => "weekday",
            RuleKind::Bulk => "bulk",
            RuleKind::OffPeak => "off-peak",
            RuleKind::Peak => "peak",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekday" => Ok(RuleKind::Weekday),
            "bulk" => Ok(RuleKind::Bulk),
            "off-peak" => Ok(RuleKind::OffPeak),
            "peak" => Ok(RuleKind::Peak),
            other => Err(ValidationError::UnknownRuleKind(other.to_string())),
        }
    }
}

/// Half-open `[start, end)` range of hour-of-day integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    /// Creates a range, rejecting `start >= end` and ends past the second day.
    pub fn new(start: u8, end: u8) -> Result<Self, ValidationError> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn contains(&self, hour: u8) -> bool {
        hour >= self.start && hour < self.end
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.start >= self.end || self.end > MAX_RANGE_END {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

/// Kind-specific rule condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCondition {
    /// Days of week the rule applies to.
    Weekday { days: Vec<Weekday> },
    /// Minimum consecutive hours that unlock the tier.
    Bulk { min_hours: u32 },
    OffPeak(HourRange),
    Peak(HourRange),
}

impl RuleCondition {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleCondition::Weekday { .. } => RuleKind::Weekday,
            RuleCondition::Bulk { .. } => RuleKind::Bulk,
            RuleCondition::OffPeak(_) => RuleKind::OffPeak,
            RuleCondition::Peak(_) => RuleKind::Peak,
        }
    }
}

/// A discount rule as supplied by the rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountRule {
    pub id: String,
    pub discount: Percent,
    pub condition: RuleCondition,
    pub active: bool,
}

impl DiscountRule {
    pub fn kind(&self) -> RuleKind {
        self.condition.kind()
    }
}

/// Day-of-week number with Sunday as 0.
pub fn day_number(day: Weekday) -> u8 {
    day.num_days_from_sunday() as u8
}

/// Inverse of [`day_number`].
pub fn weekday_from_number(n: u8) -> Result<Weekday, ValidationError> {
    match n {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(ValidationError::InvalidDayOfWeek(other)),
    }
}

/// Inputs for a single pricing computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingRequest {
    pub date: NaiveDate,
    /// Hour of day; 24 and above are past-midnight slots on the same booking.
    pub start_hour: u8,
    pub duration_hours: u32,
}

impl BookingRequest {
    /// Day of week of the booking date. Extended hours keep the booking's date.
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// Which rules of a first-match kind contribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Only the first applicable rule in input order.
    #[default]
    FirstMatch,
    /// Every matching rule, each contributing independently.
    Cumulative,
}

/// Unrecognized [`MatchPolicy`] name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match policy '{0}', expected 'first' or 'cumulative'")]
pub struct UnknownMatchPolicy(pub String);

impl FromStr for MatchPolicy {
    type Err = UnknownMatchPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "first_match" => Ok(MatchPolicy::FirstMatch),
            "cumulative" | "sum" => Ok(MatchPolicy::Cumulative),
            other => Err(UnknownMatchPolicy(other.to_string())),
        }
    }
}

/// Selection policy for weekday and off-peak rules. Bulk is always single-winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingPolicy {
    pub weekday: MatchPolicy,
    pub off_peak: MatchPolicy,
}

/// A discount that contributed to a computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedDiscount {
    pub rule_id: String,
    pub kind: RuleKind,
    pub percent: Percent,
    pub description: String,
}

/// Outcome of a pricing computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingResult {
    pub subtotal: Decimal,
    pub raw_discount_percent: Decimal,
    pub total_discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub final_price: Decimal,
    pub applied: Vec<AppliedDiscount>,
}

impl PricingResult {
    /// Human-readable explanation, one line per contributing rule.
    pub fn discount_details(&self) -> Vec<String> {
        self.applied.iter().map(|d| d.description.clone()).collect()
    }
}

/// Row from `pricing_rules`
#[derive(Debug, Clone, FromRow)]
pub struct PricingRuleRow {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    pub rule_type: String,
    pub discount: Decimal,
    pub condition: serde_json::Value,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percent_bounds() {
        assert!(Percent::new(dec!(0)).is_some());
        assert!(Percent::new(dec!(100)).is_some());
        assert!(Percent::new(dec!(-0.01)).is_none());
        assert!(Percent::new(dec!(100.5)).is_none());
    }

    #[test]
    fn test_percent_display_normalized() {
        let p = Percent::new(dec!(15.00)).unwrap();
        assert_eq!(p.to_string(), "15");
        let p = Percent::new(dec!(12.5)).unwrap();
        assert_eq!(p.to_string(), "12.5");
    }

    #[test]
    fn test_rule_kind_parse() {
        assert_eq!("off-peak".parse::<RuleKind>().unwrap(), RuleKind::OffPeak);
        assert_eq!("peak".parse::<RuleKind>().unwrap(), RuleKind::Peak);
        assert!(matches!(
            "happy-hour".parse::<RuleKind>(),
            Err(ValidationError::UnknownRuleKind(k)) if k == "happy-hour"
        ));
    }

    #[test]
    fn test_hour_range_half_open() {
        let range = HourRange::new(12, 15).unwrap();
        assert!(!range.contains(11));
        assert!(range.contains(12));
        assert!(range.contains(14));
        assert!(!range.contains(15));
    }

    #[test]
    fn test_hour_range_rejects_inverted_and_oversized() {
        assert!(HourRange::new(15, 12).is_err());
        assert!(HourRange::new(12, 12).is_err());
        assert!(HourRange::new(22, 49).is_err());
        assert!(HourRange::new(22, 26).is_ok());
    }

    #[test]
    fn test_day_numbers_start_on_sunday() {
        assert_eq!(day_number(Weekday::Sun), 0);
        assert_eq!(day_number(Weekday::Sat), 6);
        for n in 0..7 {
            assert_eq!(day_number(weekday_from_number(n).unwrap()), n);
        }
        assert!(weekday_from_number(7).is_err());
    }

    #[test]
    fn test_booking_weekday() {
        let request = BookingRequest {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            start_hour: 13,
            duration_hours: 1,
        };
        assert_eq!(request.weekday(), Weekday::Tue);
    }

    #[test]
    fn test_match_policy_parse() {
        assert_eq!("first".parse::<MatchPolicy>().unwrap(), MatchPolicy::FirstMatch);
        assert_eq!("Cumulative".parse::<MatchPolicy>().unwrap(), MatchPolicy::Cumulative);
        assert_eq!(
            "best".parse::<MatchPolicy>(),
            Err(UnknownMatchPolicy("best".to_string()))
        );
    }
}
