//! Infrastructure layer
//!
//! This module contains all external dependencies and infrastructure
//! concerns. It provides abstractions over the certificate record store and
//! the outbound HTTP client.

pub mod certificate_store;
pub mod http_client;
