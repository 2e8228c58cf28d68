//! Built-in pricing catalog
//!
//! Served until an upstream catalog endpoint is configured and the refresh
//! task replaces it.

use rust_decimal::Decimal;

use crate::models::PricingPlan;

/// The default plan tree: one root with Basic, Standard and Premium tiers.
pub fn default_pricing_plans() -> Vec<PricingPlan> {
    vec![category(
        10,
        "All plans",
        vec![
            category(
                20,
                "Basic",
                vec![
                    plan(30, "Student", 110, true),
                    plan(40, "Individual", 105, false),
                ],
            ),
            category(
                60,
                "Standard",
                vec![
                    plan(70, "Family", 180, false),
                    plan(80, "Family Plus", 130, true),
                ],
            ),
            category(
                100,
                "Premium",
                vec![
                    plan(110, "Business", 250, true),
                    plan(120, "Individual", 170, true),
                ],
            ),
        ],
    )]
}

fn category(id: i64, name: &str, children: Vec<PricingPlan>) -> PricingPlan {
    PricingPlan {
        id,
        name: name.to_string(),
        price: None,
        is_recommended: None,
        children: Some(children),
    }
}

fn plan(id: i64, name: &str, price: i64, recommended: bool) -> PricingPlan {
    PricingPlan {
        id,
        name: name.to_string(),
        price: Some(Decimal::from(price)),
        is_recommended: Some(recommended),
        children: None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::services::pricing_service;

    #[test]
    fn default_catalog_flattens_to_priced_rows_with_unique_ids() {
        let plans = default_pricing_plans();
        let rows = pricing_service::flatten_pricing_plans(&plans);

        assert_eq!(rows.len(), 6);

        let ids: HashSet<i64> = rows.iter().map(|row| row.id).collect();
        assert_eq!(ids.len(), rows.len());
    }
}
