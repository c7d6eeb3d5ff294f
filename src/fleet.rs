//! Operations offered to an outer API layer.

use std::path::Path;

use crate::config::FleetConfig;
use crate::discovery::{BroadcastDiscovery, Discovery};
use crate::dispatcher::{Command, DispatchReport, Dispatcher, Target};
use crate::errors::Error;
use crate::reconciler::StateReconciler;
use crate::record::DeviceRecord;
use crate::registry::{JsonFileRegistry, Registry};
use crate::scan::ScanOrchestrator;
use crate::transport::{Transport, UdpTransport};

type Result<T> = std::result::Result<T, Error>;

/// A registry of bulbs together with the means to reach them.
///
/// Each method maps onto one request of an outer API. Failures are reported
/// as [`Error`]s whose [`kind`](Error::kind) tells the caller how to answer;
/// unreachable bulbs are never errors, they come back marked offline.
///
/// # Example
///
/// ```ignore
/// use wiz_fleet::{Fleet, FleetConfig};
///
/// let fleet = Fleet::open("bulbs.json", FleetConfig::default()).await?;
/// for bulb in fleet.scan().await? {
///     println!("{} {:?}", bulb.display_name(), bulb.power_state());
/// }
/// fleet.toggle_scene("living room", 6).await?;
/// ```
pub struct Fleet<R, T, D> {
    registry: R,
    transport: T,
    discovery: D,
    config: FleetConfig,
}

impl Fleet<JsonFileRegistry, UdpTransport, BroadcastDiscovery> {
    /// Fleet persisted at `path`, talking Wiz UDP on the configured port.
    pub async fn open(path: impl AsRef<Path>, config: FleetConfig) -> Result<Self> {
        config.validate()?;
        let registry = JsonFileRegistry::open(path).await?;
        let transport = UdpTransport::new(config.port);
        let discovery = BroadcastDiscovery::new(&config.broadcast_address, config.port);
        Ok(Fleet::new(registry, transport, discovery, config))
    }
}

impl<R: Registry, T: Transport, D: Discovery> Fleet<R, T, D> {
    const MAX_NAME_LEN: usize = 32;

    pub fn new(registry: R, transport: T, discovery: D, config: FleetConfig) -> Self {
        Fleet {
            registry,
            transport,
            discovery,
            config,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Discover, register and refresh every bulb.
    pub async fn scan(&self) -> Result<Vec<DeviceRecord>> {
        ScanOrchestrator::new(&self.registry, &self.transport, &self.discovery, &self.config)
            .scan()
            .await
    }

    /// Run `command` against `target` (`"all"`, an address or a display name).
    pub async fn dispatch(&self, command: Command, target: &str) -> Result<DispatchReport> {
        Dispatcher::new(&self.registry, &self.transport, &self.config)
            .dispatch(command, &Target::from(target))
            .await
    }

    pub async fn power_on(&self, target: &str) -> Result<DispatchReport> {
        self.dispatch(Command::PowerOn, target).await
    }

    pub async fn power_off(&self, target: &str) -> Result<DispatchReport> {
        self.dispatch(Command::PowerOff, target).await
    }

    pub async fn activate_scene(&self, target: &str, scene_id: u16) -> Result<DispatchReport> {
        self.dispatch(Command::activate_scene(scene_id)?, target)
            .await
    }

    pub async fn toggle_scene(&self, target: &str, scene_id: u16) -> Result<DispatchReport> {
        self.dispatch(Command::toggle_scene(scene_id)?, target)
            .await
    }

    /// Refresh a single registered bulb without sending it a command.
    pub async fn refresh(&self, address: &str) -> Result<DeviceRecord> {
        self.list_one(address).await?;
        StateReconciler::new(&self.registry, &self.transport, self.config.query_timeout())
            .reconcile(address)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<DeviceRecord>> {
        self.registry.all().await
    }

    pub async fn list_one(&self, address: &str) -> Result<DeviceRecord> {
        self.registry
            .get(address)
            .await?
            .ok_or_else(|| Error::DeviceNotFound(address.to_string()))
    }

    /// Set the display name of a bulb. Names are trimmed, must be non-empty,
    /// at most 32 characters, and cannot be `"all"`.
    pub async fn rename(&self, address: &str, name: &str) -> Result<DeviceRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_name(name, "empty"));
        }
        if name.chars().count() > Self::MAX_NAME_LEN {
            return Err(Error::invalid_name(name, "longer than 32 characters"));
        }
        if name == Target::ALL {
            return Err(Error::invalid_name(name, "reserved for the whole fleet"));
        }
        self.registry.rename(address, name).await
    }

    /// Forget a bulb. It comes back on the next scan if it still answers.
    pub async fn delete(&self, address: &str) -> Result<DeviceRecord> {
        self.registry.delete(address).await
    }
}
