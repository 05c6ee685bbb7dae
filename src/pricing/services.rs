//! Pricing service functions with rule-source access.
//!
//! These functions materialize the rule set (cache first, then the source)
//! and hand plain data to the pure calculators.

use std::path::Path;
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::cache::{AppCache, RULES_KEY};
use crate::error::AppError;
use crate::AppState;

use super::calculators::compute_price_with_policy;
use super::models::DiscountRule;
use super::queries;
use super::requests::{DiscountRuleRequest, QuoteRequest};
use super::responses::QuoteResponse;

/// Where discount rules come from.
#[derive(Clone)]
pub enum RuleSource {
    /// `pricing_rules` table of the booking database.
    Postgres(PgPool),
    /// Rules fixed at startup, e.g. from a JSON file.
    Static(Arc<Vec<DiscountRule>>),
}

impl RuleSource {
    /// Load the full rule set in evaluation order.
    ///
    /// Database rows that don't form a valid rule are skipped and logged.
    pub async fn load(&self) -> Result<Vec<DiscountRule>, AppError> {
        match self {
            RuleSource::Postgres(pool) => {
                let rows = queries::fetch_pricing_rules(pool).await?;
                let total = rows.len();
                let rules: Vec<DiscountRule> = rows
                    .into_iter()
                    .filter_map(|row| {
                        let id = row.id;
                        DiscountRule::try_from(row)
                            .map_err(|e| warn!(rule_id = %id, "Skipping pricing rule: {}", e))
                            .ok()
                    })
                    .collect();
                info!("Loaded {} of {} pricing rules from database", rules.len(), total);
                Ok(rules)
            }
            RuleSource::Static(rules) => Ok(rules.as_ref().clone()),
        }
    }

    /// Read a rule file in the wire format (a JSON array of rules).
    ///
    /// Unlike database rows, a bad entry fails the whole file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::RulesFile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, AppError> {
        let entries: Vec<DiscountRuleRequest> =
            serde_json::from_str(text).map_err(|e| AppError::RulesFile(e.to_string()))?;
        let rules = entries
            .into_iter()
            .map(DiscountRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSource::Static(Arc::new(rules)))
    }
}

/// Current rule set, from cache when fresh.
pub async fn current_rules(
    cache: &AppCache,
    source: &RuleSource,
) -> Result<Arc<Vec<DiscountRule>>, AppError> {
    if let Some(cached) = cache.rules.get(RULES_KEY).await {
        tracing::debug!("Cache HIT for pricing rules");
        return Ok(cached);
    }

    tracing::debug!("Cache MISS for pricing rules");
    let rules = Arc::new(source.load().await?);
    cache
        .rules
        .insert(RULES_KEY.to_string(), Arc::clone(&rules))
        .await;
    Ok(rules)
}

/// Drop cached rules and load them again.
pub async fn refresh_rules(
    cache: &AppCache,
    source: &RuleSource,
) -> Result<Arc<Vec<DiscountRule>>, AppError> {
    cache.invalidate_rules().await;
    current_rules(cache, source).await
}

/// Price a booking.
///
/// Uses the rules in the request when present, otherwise the rule source.
pub async fn quote(state: &AppState, request: QuoteRequest) -> Result<QuoteResponse, AppError> {
    let booking = request.booking()?;

    let rules = match request.rules {
        Some(entries) => Arc::new(
            entries
                .into_iter()
                .map(DiscountRule::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => current_rules(&state.cache, &state.rules).await?,
    };

    let result =
        compute_price_with_policy(request.base_price, &booking, &rules, state.config.policy)?;

    info!(
        date = %booking.date,
        start_hour = booking.start_hour,
        duration = booking.duration_hours,
        discount = %result.total_discount_percent,
        final_price = %result.final_price,
        "Quoted booking"
    );

    Ok(QuoteResponse::from_result(result, &state.config.currency))
}
