//! HTTP request handlers
//!
//! This module contains all the HTTP endpoint handlers. Each handler is
//! responsible for extracting data from HTTP requests, calling the
//! appropriate services, and returning HTTP responses.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

use crate::infrastructure::certificate_store::StoreError;
use crate::models::{
    CertificateCreationResult, CertificateModel, CreateCertificateRequest, DisplayPricingPlan,
    ErrorResponse, PricingPlan, PricingPlanFilter,
};
use crate::services::{certificate_service, pricing_service};
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Root endpoint - simple liveness check
pub async fn root() -> &'static str {
    "Insurance certificate service"
}

/// Get the current pricing catalog as a tree
pub async fn get_pricing_plans(State(state): State<AppState>) -> Json<Vec<PricingPlan>> {
    Json(state.pricing_plans())
}

/// Get flattened display rows for the catalog
///
/// Query parameters:
/// - `min_price`: lower price bound, inclusive (default 0)
/// - `max_price`: upper price bound, inclusive (default unbounded)
/// - `recommended_only`: keep only recommended plans (default false)
///
/// Rows are filtered against the catalog tree and sorted by price descending.
pub async fn get_display_plans(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<DisplayPricingPlan>> {
    let filter = PricingPlanFilter {
        min_price: parse_decimal_param(&params, "min_price").unwrap_or(Decimal::ZERO),
        max_price: parse_decimal_param(&params, "max_price").unwrap_or(Decimal::MAX),
        recommended_only: params
            .get("recommended_only")
            .and_then(|value| value.parse().ok())
            .unwrap_or(false),
    };

    let plans = state.pricing_plans();
    let rows = pricing_service::flatten_pricing_plans(&plans);
    let filtered = pricing_service::filter_pricing_plans(&rows, &filter, Some(&plans));
    Json(pricing_service::sort_pricing_plans_by_price_descending(
        &filtered,
    ))
}

/// Get recommended plans within a price window
///
/// `min_price` and `max_price` default to the 100..200 window the storefront
/// page shows. Results are sorted by price descending.
pub async fn get_recommended_plans(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<DisplayPricingPlan>> {
    let min_price = parse_decimal_param(&params, "min_price").unwrap_or_else(|| Decimal::from(100));
    let max_price = parse_decimal_param(&params, "max_price").unwrap_or_else(|| Decimal::from(200));

    let plans = state.pricing_plans();
    let recommended =
        pricing_service::filter_recommended_pricing_plans(&plans, min_price, max_price);
    Json(pricing_service::sort_pricing_plans_by_price_descending(
        &recommended,
    ))
}

/// List every issued certificate
pub async fn list_certificates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CertificateModel>>, ApiError> {
    let certificates = certificate_service::list_certificates(&state)
        .await
        .map_err(store_error)?;
    Ok(Json(certificates))
}

/// Create a new certificate
///
/// Business rejections come back as 400 with the rejection reason; store
/// failures as 500.
pub async fn create_certificate(
    State(state): State<AppState>,
    Json(request): Json<CreateCertificateRequest>,
) -> Result<Json<CertificateModel>, ApiError> {
    let result = certificate_service::create_certificate(&state, request)
        .await
        .map_err(store_error)?;

    match result {
        CertificateCreationResult::Success(certificate) => Ok(Json(certificate)),
        CertificateCreationResult::Failure(message) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: message }),
        )),
    }
}

fn parse_decimal_param(params: &HashMap<String, String>, name: &str) -> Option<Decimal> {
    params.get(name).and_then(|value| value.parse().ok())
}

fn store_error(err: StoreError) -> ApiError {
    tracing::error!("certificate store failure: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "The certificate store is unavailable.".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::catalog;
    use crate::infrastructure::certificate_store::CertificateStore;

    fn test_state() -> AppState {
        AppState::new(
            CertificateStore::in_memory(),
            catalog::default_pricing_plans(),
        )
    }

    fn valid_request() -> CreateCertificateRequest {
        CreateCertificateRequest {
            customer_name: "John Doe".to_string(),
            customer_date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            insured_item: "iPhone 15".to_string(),
            insured_sum: Decimal::from(75),
        }
    }

    #[tokio::test]
    async fn create_certificate_returns_the_read_model() {
        let state = test_state();

        let Json(model) = create_certificate(State(state), Json(valid_request()))
            .await
            .unwrap();

        assert_eq!(model.number, "00001");
        assert_eq!(model.certificate_sum, Decimal::from(15));
    }

    #[tokio::test]
    async fn create_certificate_maps_rejection_to_bad_request() {
        let state = test_state();
        let mut request = valid_request();
        request.customer_name = " ".to_string();

        let (status, Json(body)) = create_certificate(State(state), Json(request))
            .await
            .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Customer name is required.");
    }

    #[tokio::test]
    async fn list_certificates_returns_issued_certificates() {
        let state = test_state();
        create_certificate(State(state.clone()), Json(valid_request()))
            .await
            .unwrap();

        let Json(certificates) = list_certificates(State(state)).await.unwrap();

        assert_eq!(certificates.len(), 1);
        assert_eq!(certificates[0].number, "00001");
    }

    #[tokio::test]
    async fn display_plans_filters_and_sorts_descending() {
        let state = test_state();
        let params = HashMap::from([
            ("min_price".to_string(), "100".to_string()),
            ("max_price".to_string(), "200".to_string()),
            ("recommended_only".to_string(), "true".to_string()),
        ]);

        let Json(rows) = get_display_plans(State(state), Query(params)).await;

        let prices: Vec<Decimal> = rows.iter().map(|row| row.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::from(170), Decimal::from(130), Decimal::from(110)]
        );
    }

    #[tokio::test]
    async fn display_plans_defaults_keep_every_priced_row() {
        let state = test_state();

        let Json(rows) = get_display_plans(State(state), Query(HashMap::new())).await;

        assert_eq!(rows.len(), 6);
        assert!(rows.windows(2).all(|pair| pair[0].price >= pair[1].price));
    }

    #[tokio::test]
    async fn recommended_plans_default_to_storefront_price_window() {
        let state = test_state();

        let Json(rows) = get_recommended_plans(State(state), Query(HashMap::new())).await;

        let prices: Vec<Decimal> = rows.iter().map(|row| row.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::from(170), Decimal::from(130), Decimal::from(110)]
        );
    }

    #[tokio::test]
    async fn recommended_plans_honor_explicit_price_window() {
        let state = test_state();
        let params = HashMap::from([
            ("min_price".to_string(), "100".to_string()),
            ("max_price".to_string(), "300".to_string()),
        ]);

        let Json(rows) = get_recommended_plans(State(state), Query(params)).await;

        let prices: Vec<Decimal> = rows.iter().map(|row| row.price).collect();
        assert_eq!(
            prices,
            vec![
                Decimal::from(250),
                Decimal::from(170),
                Decimal::from(130),
                Decimal::from(110)
            ]
        );
    }

    #[tokio::test]
    async fn unparseable_query_values_fall_back_to_defaults() {
        let state = test_state();
        let params = HashMap::from([
            ("min_price".to_string(), "not-a-number".to_string()),
            ("recommended_only".to_string(), "maybe".to_string()),
        ]);

        let Json(rows) = get_display_plans(State(state), Query(params)).await;

        assert_eq!(rows.len(), 6);
    }
}
