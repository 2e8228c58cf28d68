//! Pricing-plan transformations
//!
//! Pure functions that project the hierarchical plan catalog into flat
//! display rows: flattening with computed paths, recommendation and
//! price-range filtering, and descending price sort. None of them mutate
//! their input, so they are safe to run concurrently.
//!
//! Also hosts the background task that refreshes the catalog from an
//! upstream endpoint when one is configured.

use std::time::Duration;

use rust_decimal::Decimal;
use tokio::time;

use crate::infrastructure::http_client;
use crate::models::{DisplayPricingPlan, PricingPlan, PricingPlanFilter};
use crate::state::AppState;

const CATALOG_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Flattens a plan tree into display rows by pre-order depth-first
/// traversal. A row is emitted for every node with a price; category nodes
/// contribute only to their descendants' paths.
pub fn flatten_pricing_plans(plans: &[PricingPlan]) -> Vec<DisplayPricingPlan> {
    let mut rows = Vec::new();
    flatten_into(plans, "", &mut rows);
    rows
}

fn join_path(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() {
        name.to_string()
    } else {
        format!("{parent_path} / {name}")
    }
}

fn flatten_into(plans: &[PricingPlan], parent_path: &str, rows: &mut Vec<DisplayPricingPlan>) {
    for plan in plans {
        let current_path = join_path(parent_path, &plan.name);

        if let Some(price) = plan.price {
            rows.push(DisplayPricingPlan {
                id: plan.id,
                name: plan.name.clone(),
                full_path: current_path.clone(),
                price,
            });
        }

        if let Some(children) = &plan.children {
            flatten_into(children, &current_path, rows);
        }
    }
}

/// Same traversal as [`flatten_pricing_plans`], but a node is emitted only
/// when it is priced, explicitly recommended, and within the inclusive
/// `min_price..=max_price` window. The tests apply per node; a parent's
/// recommendation does not propagate to its children.
pub fn filter_recommended_pricing_plans(
    plans: &[PricingPlan],
    min_price: Decimal,
    max_price: Decimal,
) -> Vec<DisplayPricingPlan> {
    let mut rows = Vec::new();
    filter_recommended_into(plans, min_price, max_price, "", &mut rows);
    rows
}

fn filter_recommended_into(
    plans: &[PricingPlan],
    min_price: Decimal,
    max_price: Decimal,
    parent_path: &str,
    rows: &mut Vec<DisplayPricingPlan>,
) {
    for plan in plans {
        let current_path = join_path(parent_path, &plan.name);

        if let Some(price) = plan.price {
            if plan.is_recommended == Some(true) && price >= min_price && price <= max_price {
                rows.push(DisplayPricingPlan {
                    id: plan.id,
                    name: plan.name.clone(),
                    full_path: current_path.clone(),
                    price,
                });
            }
        }

        if let Some(children) = &plan.children {
            filter_recommended_into(children, min_price, max_price, &current_path, rows);
        }
    }
}

/// Filters already-flattened rows by the inclusive price range, and when
/// `recommended_only` is set, by the recommendation flag of the matching
/// node in `original_plans`.
///
/// Without a source tree every row counts as recommended. That fallback is
/// preserved for compatibility but logged, since the caller almost certainly
/// meant to pass the tree.
pub fn filter_pricing_plans(
    rows: &[DisplayPricingPlan],
    filter: &PricingPlanFilter,
    original_plans: Option<&[PricingPlan]>,
) -> Vec<DisplayPricingPlan> {
    if filter.recommended_only && original_plans.is_none() {
        tracing::warn!(
            "recommended-only filter applied without a source tree; treating every plan as recommended"
        );
    }

    rows.iter()
        .filter(|row| {
            let within_price_range = row.price >= filter.min_price && row.price <= filter.max_price;

            if !filter.recommended_only {
                return within_price_range;
            }

            within_price_range && is_recommended(row.id, original_plans)
        })
        .cloned()
        .collect()
}

/// Returns a new vector sorted by price descending. Equal prices keep their
/// relative order; the input is never mutated.
pub fn sort_pricing_plans_by_price_descending(
    rows: &[DisplayPricingPlan],
) -> Vec<DisplayPricingPlan> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.price.cmp(&a.price));
    sorted
}

fn is_recommended(plan_id: i64, plans: Option<&[PricingPlan]>) -> bool {
    let Some(plans) = plans else {
        return true;
    };
    find_plan(plans, plan_id).is_some_and(|plan| plan.is_recommended == Some(true))
}

fn find_plan(plans: &[PricingPlan], plan_id: i64) -> Option<&PricingPlan> {
    for plan in plans {
        if plan.id == plan_id {
            return Some(plan);
        }
        if let Some(children) = &plan.children {
            if let Some(found) = find_plan(children, plan_id) {
                return Some(found);
            }
        }
    }
    None
}

/// Background task for pricing-catalog refresh
///
/// Only runs when PRICING_CATALOG_ENDPOINT is set. Fetches the plan tree
/// from the upstream catalog on a fixed interval and swaps it into the
/// shared state; on failure the previous catalog stays in place.
pub async fn catalog_refresh_task(app_state: AppState) {
    let Ok(endpoint) = std::env::var("PRICING_CATALOG_ENDPOINT") else {
        return; // no upstream catalog configured, the built-in one serves forever
    };

    let mut interval = time::interval(CATALOG_REFRESH_INTERVAL);

    loop {
        interval.tick().await;

        match http_client::get_json::<Vec<PricingPlan>>(&endpoint).await {
            Ok(plans) => {
                tracing::info!(count = plans.len(), "refreshed pricing catalog from upstream");
                app_state.replace_pricing_plans(plans);
            }
            Err(err) => {
                tracing::warn!("pricing catalog refresh failed: {err}");
            }
        }
    }
}
