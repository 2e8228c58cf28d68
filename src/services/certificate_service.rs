//! Certificate issuance rules
//!
//! Validates an issuance request, computes the certificate fee from the
//! insured value, derives the validity window, assigns the next sequential
//! certificate number, and persists the result. Business rejections come
//! back as [`CertificateCreationResult::Failure`] values; only store
//! failures surface as errors.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::infrastructure::certificate_store::StoreError;
use crate::models::{
    Certificate, CertificateCreationResult, CertificateModel, CreateCertificateRequest, Customer,
};
use crate::state::AppState;

const MINIMUM_AGE: u32 = 18;

/// Issue a certificate for a validated request.
///
/// Validation and fee calculation are pure; number assignment and the record
/// write run under the issuance lock so no two requests can read the same
/// last number.
pub async fn create_certificate(
    app_state: &AppState,
    request: CreateCertificateRequest,
) -> Result<CertificateCreationResult, StoreError> {
    if let Some(message) = validate_request(&request) {
        return Ok(CertificateCreationResult::Failure(message));
    }

    let Some(certificate_sum) = calculate_certificate_sum(request.insured_sum) else {
        return Ok(CertificateCreationResult::Failure(
            "Insured item price must be between 20.00 and 200.00.".to_string(),
        ));
    };

    let creation_date = Utc::now();

    let _issuance = app_state.issuance_lock.lock().await;

    let number = generate_certificate_number(app_state).await?;

    let customer = Customer {
        name: request.customer_name,
        date_of_birth: request.customer_date_of_birth,
    };

    let certificate = Certificate {
        number,
        creation_date,
        valid_from: creation_date,
        valid_to: start_of_day(creation_date + Months::new(12)),
        customer,
        insured_item: request.insured_item,
        insured_sum: request.insured_sum,
        certificate_sum,
    };

    let record = app_state.store.append(certificate).await?;
    tracing::info!(number = %record.certificate.number, "issued certificate");

    Ok(CertificateCreationResult::Success(CertificateModel::from(
        record.certificate,
    )))
}

/// Every issued certificate projected to the read model, in issuance order.
pub async fn list_certificates(app_state: &AppState) -> Result<Vec<CertificateModel>, StoreError> {
    let records = app_state.store.all().await?;
    Ok(records
        .into_iter()
        .map(|record| CertificateModel::from(record.certificate))
        .collect())
}

/// Seed the store with the demo certificate on first startup. A store that
/// already holds records is left untouched.
pub async fn seed_demo_certificate(app_state: &AppState) -> Result<(), StoreError> {
    if app_state.store.latest().await?.is_some() {
        return Ok(());
    }

    let creation_date = Utc::now();
    let certificate = Certificate {
        number: "00001".to_string(),
        creation_date,
        valid_from: creation_date,
        valid_to: start_of_day(creation_date + Months::new(12)),
        customer: Customer {
            name: "Customer 1".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        },
        insured_item: "Apple Iphone 14 PRO".to_string(),
        insured_sum: Decimal::from(75),
        certificate_sum: Decimal::from(15),
    };

    app_state.store.append(certificate).await?;
    tracing::info!("seeded demo certificate 00001");
    Ok(())
}

/// Checks the request fields in order and returns the first failure message,
/// or `None` when the request passes.
fn validate_request(request: &CreateCertificateRequest) -> Option<String> {
    if request.customer_name.trim().is_empty() {
        return Some("Customer name is required.".to_string());
    }

    if request.insured_item.trim().is_empty() {
        return Some("Insured item is required.".to_string());
    }

    let age = calculate_age(request.customer_date_of_birth, Utc::now().date_naive());
    if age < MINIMUM_AGE {
        return Some(format!("Customer must be at least {MINIMUM_AGE} years old."));
    }

    None
}

/// Whole years elapsed between the date of birth and `today`: the
/// calendar-year difference, minus one when the birthday has not yet
/// occurred this year. A date of birth in the future counts as zero.
fn calculate_age(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(date_of_birth).unwrap_or(0)
}

/// Fee tier for the insured value. `None` when the value falls outside the
/// insurable 20.00..=200.00 window. Bracket upper bounds are inclusive:
/// 50.00 prices at 8 and 100.00 at 15.
fn calculate_certificate_sum(insured_sum: Decimal) -> Option<Decimal> {
    let lower_bound = Decimal::new(2000, 2); // 20.00
    let first_tier = Decimal::new(5000, 2); // 50.00
    let second_tier = Decimal::new(10000, 2); // 100.00
    let upper_bound = Decimal::new(20000, 2); // 200.00

    if insured_sum >= lower_bound && insured_sum <= first_tier {
        Some(Decimal::from(8))
    } else if insured_sum > first_tier && insured_sum <= second_tier {
        Some(Decimal::from(15))
    } else if insured_sum > second_tier && insured_sum <= upper_bound {
        Some(Decimal::from(25))
    } else {
        None
    }
}

/// Next certificate number: the most recently stored number plus one, or 1
/// when the store is empty or the stored number does not parse. Formatted
/// zero-padded to five digits; larger numbers widen rather than truncate.
async fn generate_certificate_number(app_state: &AppState) -> Result<String, StoreError> {
    let last = app_state.store.latest().await?;

    let next = last
        .and_then(|record| record.certificate.number.parse::<u64>().ok())
        .map_or(1, |last_number| last_number + 1);

    Ok(format!("{next:05}"))
}

fn start_of_day(moment: DateTime<Utc>) -> DateTime<Utc> {
    moment.date_naive().and_time(NaiveTime::MIN).and_utc()
}
