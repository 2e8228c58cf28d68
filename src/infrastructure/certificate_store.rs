//! Certificate record store
//!
//! Append-only store for issued certificates. Every appended record receives
//! a monotonically increasing surrogate key, and the most recent record can
//! be read back by descending key, which is all the numbering logic needs.
//!
//! Two backends sit behind one cheaply-cloneable handle: an in-memory store
//! (the default, and what every test runs against) and a Redis store selected
//! when `REDIS_URL` is set.

use std::sync::Arc;

use redis::{AsyncCommands, aio::ConnectionManager};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Certificate, CertificateRecord};

const ID_SEQUENCE_KEY: &str = "certificate:id_seq";
const INDEX_KEY: &str = "certificates_by_id";

/// Failures surfaced by the store collaborator. Never retried here; callers
/// decide how to report them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("certificate store unavailable: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("stored certificate record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Handle to the certificate record store.
#[derive(Clone)]
pub enum CertificateStore {
    Memory(MemoryStore),
    Redis(ConnectionManager),
}

impl CertificateStore {
    /// Creates an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::Memory(MemoryStore::default())
    }

    /// Connects to a Redis-backed store.
    pub async fn connect_redis(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self::Redis(manager))
    }

    /// Appends a certificate, assigning it the next surrogate key.
    pub async fn append(&self, certificate: Certificate) -> Result<CertificateRecord, StoreError> {
        match self {
            Self::Memory(store) => Ok(store.append(certificate).await),
            Self::Redis(manager) => append_redis(manager.clone(), certificate).await,
        }
    }

    /// Returns the record with the highest surrogate key, if any.
    pub async fn latest(&self) -> Result<Option<CertificateRecord>, StoreError> {
        match self {
            Self::Memory(store) => Ok(store.latest().await),
            Self::Redis(manager) => latest_redis(manager.clone()).await,
        }
    }

    /// Returns every record in ascending surrogate-key order.
    pub async fn all(&self) -> Result<Vec<CertificateRecord>, StoreError> {
        match self {
            Self::Memory(store) => Ok(store.all().await),
            Self::Redis(manager) => all_redis(manager.clone()).await,
        }
    }
}

/// In-memory backend. Records are only ever pushed, so the vector stays in
/// ascending key order.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<CertificateRecord>>>,
}

impl MemoryStore {
    async fn append(&self, certificate: Certificate) -> CertificateRecord {
        let mut records = self.records.write().await;
        let id = records.last().map_or(1, |record| record.id + 1);
        let record = CertificateRecord { id, certificate };
        records.push(record.clone());
        record
    }

    async fn latest(&self) -> Option<CertificateRecord> {
        self.records.read().await.last().cloned()
    }

    async fn all(&self) -> Vec<CertificateRecord> {
        self.records.read().await.clone()
    }
}

fn record_key(id: u64) -> String {
    format!("certificate:{id}")
}

async fn append_redis(
    mut con: ConnectionManager,
    certificate: Certificate,
) -> Result<CertificateRecord, StoreError> {
    let id: u64 = con.incr(ID_SEQUENCE_KEY, 1).await?;
    let record = CertificateRecord { id, certificate };

    let value = serde_json::to_string(&record)?;
    let _: () = con.set(record_key(id), value).await?;
    let _: () = con.zadd(INDEX_KEY, id, id).await?;

    Ok(record)
}

async fn latest_redis(mut con: ConnectionManager) -> Result<Option<CertificateRecord>, StoreError> {
    let ids: Vec<u64> = con.zrevrange(INDEX_KEY, 0, 0).await?;
    let Some(id) = ids.first().copied() else {
        return Ok(None);
    };

    let value: Option<String> = con.get(record_key(id)).await?;
    match value {
        Some(value) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

async fn all_redis(mut con: ConnectionManager) -> Result<Vec<CertificateRecord>, StoreError> {
    let ids: Vec<u64> = con.zrange(INDEX_KEY, 0, -1).await?;

    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        let value: Option<String> = con.get(record_key(id)).await?;
        if let Some(value) = value {
            records.push(serde_json::from_str(&value)?);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::Customer;

    fn certificate(number: &str) -> Certificate {
        let creation_date = Utc::now();
        Certificate {
            number: number.to_string(),
            creation_date,
            valid_from: creation_date,
            valid_to: creation_date,
            customer: Customer {
                name: "Customer".to_string(),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            },
            insured_item: "Item".to_string(),
            insured_sum: Decimal::from(75),
            certificate_sum: Decimal::from(15),
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_keys() {
        let store = CertificateStore::in_memory();

        let first = store.append(certificate("00001")).await.unwrap();
        let second = store.append(certificate("00002")).await.unwrap();
        let third = store.append(certificate("00003")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn latest_returns_highest_key() {
        let store = CertificateStore::in_memory();
        assert!(store.latest().await.unwrap().is_none());

        store.append(certificate("00001")).await.unwrap();
        store.append(certificate("00002")).await.unwrap();

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.id, 2);
        assert_eq!(latest.certificate.number, "00002");
    }

    #[tokio::test]
    async fn all_returns_records_in_ascending_key_order() {
        let store = CertificateStore::in_memory();

        store.append(certificate("00001")).await.unwrap();
        store.append(certificate("00002")).await.unwrap();
        store.append(certificate("00003")).await.unwrap();

        let records = store.all().await.unwrap();
        let ids: Vec<u64> = records.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
