//! Application state management
//!
//! This module defines the global application state that is shared across
//! all handlers and services. It holds the certificate store handle, the
//! current pricing catalog, and the issuance lock.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;

use crate::infrastructure::certificate_store::CertificateStore;
use crate::models::PricingPlan;

/// Global application state
///
/// This struct holds all shared state that needs to be accessed across
/// different parts of the application. It's designed to be cheaply cloneable
/// using Arc (Atomic Reference Counting).
#[derive(Clone)]
pub struct AppState {
    /// Certificate record store
    pub store: CertificateStore,

    /// Current pricing catalog, swapped wholesale by the refresh task
    pricing_plans: Arc<RwLock<Vec<PricingPlan>>>,

    /// Serializes certificate-number assignment with the record write.
    /// Held across the read-latest/append pair so two concurrent requests
    /// can never observe the same last number.
    pub issuance_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state from a store handle and the initial
    /// pricing catalog.
    pub fn new(store: CertificateStore, pricing_plans: Vec<PricingPlan>) -> Self {
        Self {
            store,
            pricing_plans: Arc::new(RwLock::new(pricing_plans)),
            issuance_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A snapshot of the current pricing catalog.
    pub fn pricing_plans(&self) -> Vec<PricingPlan> {
        if let Ok(plans) = self.pricing_plans.read() {
            plans.clone()
        } else {
            Vec::new()
        }
    }

    /// Replace the pricing catalog with a freshly fetched one.
    pub fn replace_pricing_plans(&self, plans: Vec<PricingPlan>) {
        if let Ok(mut current) = self.pricing_plans.write() {
            *current = plans;
        }
    }
}
