//! Database queries for the pricing rule source.
//!
//! Read-only: rules are maintained by the admin dashboard.

use sqlx::PgPool;

use crate::error::AppError;

use super::models::PricingRuleRow;

/// All pricing rules in creation order, active or not.
///
/// Creation order is the evaluation order for first-match rule kinds.
pub async fn fetch_pricing_rules(pool: &PgPool) -> Result<Vec<PricingRuleRow>, AppError> {
    let rows = sqlx::query_as::<_, PricingRuleRow>(
        r#"
        SELECT id, type, discount, condition, is_active
        FROM pricing_rules
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
