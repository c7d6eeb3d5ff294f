//! Fan-out of control commands over the registry.

use std::fmt;

use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::FleetConfig;
use crate::errors::Error;
use crate::reconciler::StateReconciler;
use crate::record::{DeviceRecord, display_order};
use crate::registry::Registry;
use crate::transport::Transport;
use crate::types::{PowerState, SceneMode};

type Result<T> = std::result::Result<T, Error>;

/// Which records a dispatch applies to.
///
/// # Examples
///
/// ```
/// use wiz_fleet::Target;
///
/// assert_eq!(Target::from("all"), Target::All);
/// assert_eq!(Target::from("porch"), Target::Named("porch".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every record currently online
    All,
    /// Every record whose address or display name matches
    Named(String),
}

impl Target {
    pub const ALL: &'static str = "all";
}

impl From<&str> for Target {
    fn from(target: &str) -> Self {
        if target == Self::ALL {
            Target::All
        } else {
            Target::Named(target.to_string())
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::All => f.write_str(Self::ALL),
            Target::Named(key) => f.write_str(key),
        }
    }
}

/// A control request. Scene ids are checked against the catalogue when the
/// command is built, so an invalid one never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PowerOn,
    PowerOff,
    ActivateScene(SceneMode),
    /// Activate the scene, or switch off bulbs already showing it.
    ToggleScene(SceneMode),
}

impl Command {
    pub fn activate_scene(scene_id: u16) -> Result<Self> {
        Ok(Command::ActivateScene(scene(scene_id)?))
    }

    pub fn toggle_scene(scene_id: u16) -> Result<Self> {
        Ok(Command::ToggleScene(scene(scene_id)?))
    }

    /// The action to send to one target.
    ///
    /// Toggle decides from `record` as it was when the targets were resolved;
    /// it is not re-read mid-dispatch.
    pub fn action_for(&self, record: &DeviceRecord) -> Action {
        match *self {
            Command::PowerOn => Action::PowerOn,
            Command::PowerOff => Action::PowerOff,
            Command::ActivateScene(scene) => Action::ActivateScene(scene),
            Command::ToggleScene(scene) => {
                if record.power_state() == PowerState::Off
                    || record.active_scene_id() != scene.id()
                {
                    Action::ActivateScene(scene)
                } else {
                    Action::PowerOff
                }
            }
        }
    }
}

fn scene(scene_id: u16) -> Result<SceneMode> {
    SceneMode::create(scene_id).ok_or(Error::InvalidScene(scene_id))
}

/// What was actually sent to a bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    PowerOn,
    PowerOff,
    ActivateScene(SceneMode),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::PowerOn => f.write_str("switch on"),
            Action::PowerOff => f.write_str("switch off"),
            Action::ActivateScene(scene) => write!(f, "activate scene {}", scene),
        }
    }
}

/// How a single target fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Command accepted and the bulb answered the follow-up query
    Applied,
    /// Command failed but the bulb still answered the follow-up query
    CommandFailed(String),
    /// The follow-up query failed; the record is marked offline
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub record: DeviceRecord,
    pub action: Action,
    pub outcome: Outcome,
}

/// Per-target results of a dispatch, ordered by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub targets: Vec<TargetReport>,
}

impl DispatchReport {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn records(&self) -> Vec<&DeviceRecord> {
        self.targets.iter().map(|t| &t.record).collect()
    }

    pub fn into_records(self) -> Vec<DeviceRecord> {
        self.targets.into_iter().map(|t| t.record).collect()
    }

    /// Targets that did not end in [`Outcome::Applied`].
    pub fn failures(&self) -> impl Iterator<Item = &TargetReport> {
        self.targets
            .iter()
            .filter(|t| !matches!(t.outcome, Outcome::Applied))
    }
}

/// Resolves targets, sends commands and reconciles every target.
///
/// A target whose command fails is still reconciled, and later targets are
/// always processed. Only resolution and registry failures abort the call.
pub struct Dispatcher<'a, R, T> {
    registry: &'a R,
    transport: &'a T,
    config: &'a FleetConfig,
}

impl<'a, R: Registry, T: Transport> Dispatcher<'a, R, T> {
    pub fn new(registry: &'a R, transport: &'a T, config: &'a FleetConfig) -> Self {
        Dispatcher {
            registry,
            transport,
            config,
        }
    }

    pub async fn dispatch(&self, command: Command, target: &Target) -> Result<DispatchReport> {
        let records = self.resolve(target).await?;
        debug!("{:?} on {}: {} targets", command, target, records.len());

        let mut targets = if self.config.concurrent {
            join_all(records.iter().map(|r| self.apply(command, r)))
                .await
                .into_iter()
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut targets = Vec::with_capacity(records.len());
            for record in &records {
                targets.push(self.apply(command, record).await?);
            }
            targets
        };
        targets.sort_by(|a, b| display_order(&a.record, &b.record));

        let report = DispatchReport { targets };
        info!(
            "{:?} on {}: {} targets, {} not applied",
            command,
            target,
            report.len(),
            report.failures().count()
        );
        Ok(report)
    }

    async fn resolve(&self, target: &Target) -> Result<Vec<DeviceRecord>> {
        match target {
            Target::All => self.registry.online().await,
            Target::Named(key) => {
                let records = self.registry.by_address_or_name(key).await?;
                if records.is_empty() {
                    return Err(Error::TargetNotFound(key.clone()));
                }
                Ok(records)
            }
        }
    }

    async fn apply(&self, command: Command, record: &DeviceRecord) -> Result<TargetReport> {
        let address = record.address();
        let action = command.action_for(record);

        let sent = self.send(action, address).await;
        if let Err(e) = &sent {
            warn!("cannot {} {}: {}", action, address, e);
        }

        let reconciler =
            StateReconciler::new(self.registry, self.transport, self.config.query_timeout());
        let reconciled = reconciler.reconcile(address).await?;

        let outcome = match sent {
            _ if !reconciled.is_online() => Outcome::Offline,
            Err(e) => Outcome::CommandFailed(e.to_string()),
            Ok(()) => Outcome::Applied,
        };
        Ok(TargetReport {
            record: reconciled,
            action,
            outcome,
        })
    }

    async fn send(&self, action: Action, address: &str) -> Result<()> {
        let timeout = self.config.command_timeout();
        match action {
            Action::PowerOn => {
                self.transport
                    .send_power_on(address, self.config.power_on_brightness, timeout)
                    .await
            }
            Action::PowerOff => self.transport.send_power_off(address, timeout).await,
            Action::ActivateScene(scene) => {
                self.transport
                    .send_activate_scene(address, scene, timeout)
                    .await
            }
        }
    }
}
