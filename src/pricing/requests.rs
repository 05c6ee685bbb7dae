//! Request DTOs for pricing API endpoints.
//!
//! Rules on the wire use the booking app's loose shape: a `type` string and a
//! `condition` object whose fields depend on the type. They are converted into
//! typed [`DiscountRule`]s here, once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::models::{
    weekday_from_number, BookingRequest, DiscountRule, HourRange, Percent, PricingRuleRow,
    RuleCondition, RuleKind, MAX_START_HOUR,
};
use super::validation::ValidationError;

/// Request to quote a booking
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    pub date: NaiveDate,
    /// Start time as `HH:MM`; hours past 23 denote the next morning.
    pub time: String,
    pub duration: u32,
    /// Explicit rule set; when absent the configured rule source is used.
    #[serde(default)]
    pub rules: Option<Vec<DiscountRuleRequest>>,
}

impl QuoteRequest {
    pub fn booking(&self) -> Result<BookingRequest, ValidationError> {
        Ok(BookingRequest {
            date: self.date,
            start_hour: parse_hour(&self.time)?,
            duration_hours: self.duration,
        })
    }
}

/// A discount rule in wire form
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRuleRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub discount: Decimal,
    #[serde(default)]
    pub condition: ConditionRequest,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Loose condition payload; only the field matching the rule type is read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRequest {
    #[serde(default)]
    pub min_hours: Option<u32>,
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default)]
    pub time_range: Option<TimeRangeRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeRangeRequest {
    pub start: String,
    pub end: String,
}

impl TryFrom<DiscountRuleRequest> for DiscountRule {
    type Error = ValidationError;

    fn try_from(req: DiscountRuleRequest) -> Result<Self, Self::Error> {
        build_rule(req.id, &req.rule_type, req.discount, req.condition, req.is_active)
    }
}

impl TryFrom<PricingRuleRow> for DiscountRule {
    type Error = ValidationError;

    fn try_from(row: PricingRuleRow) -> Result<Self, Self::Error> {
        let id = row.id.to_string();
        let condition: ConditionRequest =
            serde_json::from_value(row.condition).map_err(|_| ValidationError::ConditionMismatch {
                rule_id: id.clone(),
                kind: row.rule_type.clone(),
                field: "condition",
            })?;
        build_rule(id, &row.rule_type, row.discount, condition, row.is_active)
    }
}

fn build_rule(
    id: String,
    rule_type: &str,
    discount: Decimal,
    condition: ConditionRequest,
    active: bool,
) -> Result<DiscountRule, ValidationError> {
    let kind: RuleKind = rule_type.parse()?;
    let discount = Percent::new(discount).ok_or_else(|| ValidationError::DiscountOutOfRange {
        rule_id: id.clone(),
        value: discount,
    })?;

    let missing = |field: &'static str| ValidationError::ConditionMismatch {
        rule_id: id.clone(),
        kind: kind.to_string(),
        field,
    };

    let condition = match kind {
        RuleKind::Weekday => {
            let numbers = condition.days_of_week.ok_or_else(|| missing("daysOfWeek"))?;
            if numbers.is_empty() {
                return Err(ValidationError::EmptyDaySet(id));
            }
            let days = numbers
                .into_iter()
                .map(weekday_from_number)
                .collect::<Result<Vec<_>, _>>()?;
            RuleCondition::Weekday { days }
        }
        RuleKind::Bulk => {
            let min_hours = condition.min_hours.ok_or_else(|| missing("minHours"))?;
            if min_hours == 0 {
                return Err(ValidationError::ZeroBulkThreshold(id));
            }
            RuleCondition::Bulk { min_hours }
        }
        RuleKind::OffPeak | RuleKind::Peak => {
            let range = condition.time_range.ok_or_else(|| missing("timeRange"))?;
            let range = HourRange::new(parse_hour(&range.start)?, parse_hour(&range.end)?)?;
            if kind == RuleKind::OffPeak {
                RuleCondition::OffPeak(range)
            } else {
                RuleCondition::Peak(range)
            }
        }
    };

    Ok(DiscountRule {
        id,
        discount,
        condition,
        active,
    })
}

/// Extract the hour from `HH` or `HH:MM`. Minutes are ignored.
///
/// Accepts hours up to 48 so that range ends can reach the end of the next day;
/// start hours are checked separately against the booking limit.
pub fn parse_hour(time: &str) -> Result<u8, ValidationError> {
    let invalid = || ValidationError::InvalidTime(time.to_string());
    let hour_text = match time.trim().split_once(':') {
        Some((hour, minutes)) => {
            if minutes.len() != 2 || minutes.parse::<u8>().map_or(true, |m| m > 59) {
                return Err(invalid());
            }
            hour
        }
        None => time.trim(),
    };
    let hour: u8 = hour_text.parse().map_err(|_| invalid())?;
    if hour > MAX_START_HOUR + 1 {
        return Err(invalid());
    }
    Ok(hour)
}
