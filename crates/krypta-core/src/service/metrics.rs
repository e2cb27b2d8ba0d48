//! Storage usage summary

use crate::error::Result;
use krypta_store::ObjectStore;

/// Disk usage as reported to clients.
#[derive(Clone, Copy, Debug)]
pub struct DiskUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct MetricsService {
    store: ObjectStore,
    capacity_bytes: u64,
}

impl MetricsService {
    /// `capacity_bytes` is the operator-configured total; S3-compatible
    /// endpoints expose no capacity API. Zero means unknown.
    pub fn new(store: ObjectStore, capacity_bytes: u64) -> Self {
        Self {
            store,
            capacity_bytes,
        }
    }

    /// Bytes held in the blob container versus configured capacity.
    pub async fn disk_usage(&self) -> Result<DiskUsage> {
        let used_bytes = self.store.total_usage().await?;
        Ok(DiskUsage {
            used_bytes,
            total_bytes: self.capacity_bytes,
        })
    }
}
