//! Bringing registry records in line with what bulbs report.

use std::time::Duration;

use log::{debug, warn};

use crate::errors::Error;
use crate::record::DeviceRecord;
use crate::registry::Registry;
use crate::transport::Transport;

type Result<T> = std::result::Result<T, Error>;

/// Queries one bulb and commits the answer to the registry.
///
/// An unreachable bulb is not an error: the record is marked offline and
/// returned like any other. Only registry failures (including an address
/// that was never registered) surface as `Err`.
pub struct StateReconciler<'a, R, T> {
    registry: &'a R,
    transport: &'a T,
    timeout: Duration,
}

impl<'a, R: Registry, T: Transport> StateReconciler<'a, R, T> {
    pub fn new(registry: &'a R, transport: &'a T, timeout: Duration) -> Self {
        StateReconciler {
            registry,
            transport,
            timeout,
        }
    }

    /// Refresh the record for `address`. Performs exactly one registry write.
    pub async fn reconcile(&self, address: &str) -> Result<DeviceRecord> {
        match self.transport.query_state(address, self.timeout).await {
            Ok(state) => {
                debug!("bulb {} reports {:?}", address, state);
                self.registry.update_state(address, &state).await
            }
            Err(e) => {
                warn!("cannot get state of {}: {}", address, e);
                self.registry.mark_offline(address).await
            }
        }
    }
}
