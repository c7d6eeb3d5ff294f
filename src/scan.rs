//! Full-fleet scan: discover, register, reconcile.

use futures::future::join_all;
use log::{debug, info};

use crate::config::FleetConfig;
use crate::discovery::Discovery;
use crate::errors::Error;
use crate::reconciler::StateReconciler;
use crate::record::{DeviceRecord, sort_by_display_name};
use crate::registry::Registry;
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

/// Runs discovery once, registers new addresses and refreshes every known
/// bulb, including ones that did not answer the broadcast.
pub struct ScanOrchestrator<'a, R, T, D> {
    registry: &'a R,
    transport: &'a T,
    discovery: &'a D,
    config: &'a FleetConfig,
}

impl<'a, R: Registry, T: Transport, D: Discovery> ScanOrchestrator<'a, R, T, D> {
    pub fn new(
        registry: &'a R,
        transport: &'a T,
        discovery: &'a D,
        config: &'a FleetConfig,
    ) -> Self {
        ScanOrchestrator {
            registry,
            transport,
            discovery,
            config,
        }
    }

    /// Returns the whole reconciled fleet ordered by display name.
    pub async fn scan(&self) -> Result<Vec<DeviceRecord>> {
        let found = self
            .discovery
            .discover(self.config.discovery_window())
            .await?;

        let mut added = 0;
        for address in &found {
            if self.registry.insert_if_absent(address).await? {
                added += 1;
            }
        }

        let known = self.registry.all().await?;
        let reconciler =
            StateReconciler::new(self.registry, self.transport, self.config.query_timeout());

        let results = if self.config.concurrent {
            join_all(known.iter().map(|r| reconciler.reconcile(r.address()))).await
        } else {
            let mut results = Vec::with_capacity(known.len());
            for record in &known {
                results.push(reconciler.reconcile(record.address()).await);
            }
            results
        };

        let mut records = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(record) => records.push(record),
                // Deleted while the scan was running
                Err(Error::UnknownAddress(address)) => {
                    debug!("scan: {} left the registry, skipping", address)
                }
                Err(e) => return Err(e),
            }
        }
        sort_by_display_name(&mut records);

        info!(
            "scan: {} answered, {} new, {} of {} online",
            found.len(),
            added,
            records.iter().filter(|r| r.is_online()).count(),
            records.len()
        );
        Ok(records)
    }
}
