//! Business logic services
//!
//! This module contains all the business logic of the application.
//! Services orchestrate domain operations and coordinate with infrastructure.

pub mod certificate_service;
pub mod pricing_service;
