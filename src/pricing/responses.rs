//! Response DTOs for pricing API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::format_currency;
use super::models::{
    day_number, AppliedDiscount, DiscountRule, PricingResult, RuleCondition, RuleKind,
};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

impl MoneyResponse {
    pub fn new(amount: Decimal, currency: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
        }
    }
}

/// A discount that contributed to a quote
#[derive(Debug, Serialize)]
pub struct AppliedDiscountResponse {
    pub rule_id: String,
    pub kind: RuleKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub percent: Decimal,
    pub description: String,
}

impl From<AppliedDiscount> for AppliedDiscountResponse {
    fn from(d: AppliedDiscount) -> Self {
        Self {
            rule_id: d.rule_id,
            kind: d.kind,
            percent: d.percent.value().normalize(),
            description: d.description,
        }
    }
}

/// Response for a booking quote
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub subtotal: MoneyResponse,
    pub discount_amount: MoneyResponse,
    pub final_price: MoneyResponse,
    /// Capped total, what was actually applied.
    #[serde(with = "rust_decimal::serde::str")]
    pub discount_applied: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub raw_discount_percent: Decimal,
    pub discount_details: Vec<String>,
    pub discounts: Vec<AppliedDiscountResponse>,
    pub formatted_price: String,
}

impl QuoteResponse {
    pub fn from_result(result: PricingResult, currency: &str) -> Self {
        Self {
            subtotal: MoneyResponse::new(result.subtotal, currency),
            discount_amount: MoneyResponse::new(result.discount_amount, currency),
            final_price: MoneyResponse::new(result.final_price, currency),
            discount_applied: result.total_discount_percent.normalize(),
            raw_discount_percent: result.raw_discount_percent.normalize(),
            discount_details: result.discount_details(),
            formatted_price: format_currency(result.final_price, currency),
            discounts: result.applied.into_iter().map(Into::into).collect(),
        }
    }
}

/// A rule as currently loaded from the rule source
#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount: Decimal,
    pub condition: ConditionResponse,
    pub is_active: bool,
}

/// Condition in the same shape the rule source accepts
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRangeResponse>,
}

#[derive(Debug, Serialize)]
pub struct TimeRangeResponse {
    pub start: String,
    pub end: String,
}

impl From<&DiscountRule> for RuleResponse {
    fn from(rule: &DiscountRule) -> Self {
        let condition = match &rule.condition {
            RuleCondition::Weekday { days } => ConditionResponse {
                days_of_week: Some(days.iter().copied().map(day_number).collect()),
                ..Default::default()
            },
            RuleCondition::Bulk { min_hours } => ConditionResponse {
                min_hours: Some(*min_hours),
                ..Default::default()
            },
            RuleCondition::OffPeak(range) | RuleCondition::Peak(range) => ConditionResponse {
                time_range: Some(TimeRangeResponse {
                    start: format!("{:02}:00", range.start),
                    end: format!("{:02}:00", range.end),
                }),
                ..Default::default()
            },
        };

        Self {
            id: rule.id.clone(),
            kind: rule.kind(),
            discount: rule.discount.value().normalize(),
            condition,
            is_active: rule.active,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
}
