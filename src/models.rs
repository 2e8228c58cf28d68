//! Domain models and data structures
//!
//! This module contains all the core data types used throughout the
//! application. These are "pure" data structures without business logic.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A node in the hierarchical pricing-plan catalog.
///
/// Category nodes carry no price of their own and group their children; a
/// node may carry both a price and children, in which case it shows up in the
/// flattened output as a row and as a path prefix for its descendants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPlan {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(rename = "isRecommended", default)]
    pub is_recommended: Option<bool>,
    #[serde(default)]
    pub children: Option<Vec<PricingPlan>>,
}

/// Flattened, path-annotated projection of a priced plan node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayPricingPlan {
    pub id: i64,
    pub name: String,
    #[serde(rename = "fullPath")]
    pub full_path: String,
    pub price: Decimal,
}

/// Criteria applied to an already-flattened plan list.
#[derive(Debug, Clone)]
pub struct PricingPlanFilter {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub recommended_only: bool,
}

/// Certificate creation request from clients
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCertificateRequest {
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerDateOfBirth")]
    pub customer_date_of_birth: NaiveDate,
    #[serde(rename = "insuredItem")]
    pub insured_item: String,
    #[serde(rename = "insuredSum")]
    pub insured_sum: Decimal,
}

/// A customer as stored alongside the certificate that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// An issued certificate as written to the store. Immutable once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub number: String,
    pub creation_date: DateTime<Utc>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub customer: Customer,
    pub insured_item: String,
    pub insured_sum: Decimal,
    pub certificate_sum: Decimal,
}

/// A certificate together with the surrogate key the store assigned to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: u64,
    pub certificate: Certificate,
}

/// Read model returned to API clients. Never exposes the surrogate key.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateModel {
    pub number: String,
    #[serde(rename = "creationDate")]
    pub creation_date: DateTime<Utc>,
    #[serde(rename = "validFrom")]
    pub valid_from: DateTime<Utc>,
    #[serde(rename = "validTo")]
    pub valid_to: DateTime<Utc>,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerDateOfBirth")]
    pub customer_date_of_birth: NaiveDate,
    #[serde(rename = "insuredItem")]
    pub insured_item: String,
    #[serde(rename = "insuredSum")]
    pub insured_sum: Decimal,
    #[serde(rename = "certificateSum")]
    pub certificate_sum: Decimal,
}

impl From<Certificate> for CertificateModel {
    fn from(certificate: Certificate) -> Self {
        Self {
            number: certificate.number,
            creation_date: certificate.creation_date,
            valid_from: certificate.valid_from,
            valid_to: certificate.valid_to,
            customer_name: certificate.customer.name,
            customer_date_of_birth: certificate.customer.date_of_birth,
            insured_item: certificate.insured_item,
            insured_sum: certificate.insured_sum,
            certificate_sum: certificate.certificate_sum,
        }
    }
}

/// Outcome of a certificate issuance attempt. A request is either issued or
/// rejected with a human-readable reason, never both.
#[derive(Debug)]
pub enum CertificateCreationResult {
    Success(CertificateModel),
    Failure(String),
}

/// Error body used by all non-2xx responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
