//! # wiz_fleet
//!
//! Keeps a local registry of Wiz smart bulbs in step with the bulbs themselves.
//!
//! Bulbs are independently powered and reachable only over best-effort UDP, so
//! this crate treats "the bulb did not answer" as ordinary data rather than a
//! failure. Every operation ends with a query to each bulb it touched and
//! commits the answer (or an offline marker) to the registry.
//!
//! ## Quick Start
//!
//! ```ignore
//! use wiz_fleet::{Fleet, FleetConfig};
//!
//! async fn evening() -> Result<(), wiz_fleet::Error> {
//!     let fleet = Fleet::open("bulbs.json", FleetConfig::default()).await?;
//!
//!     // Find bulbs and refresh everything the registry knows about
//!     fleet.scan().await?;
//!
//!     // Sunset on every online bulb; unreachable ones come back offline
//!     let report = fleet.activate_scene("all", 3).await?;
//!     for target in &report.targets {
//!         println!("{} -> {:?}", target.record.display_name(), target.outcome);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Components
//!
//! - [`StateReconciler`]: queries one bulb and writes the result to the registry
//! - [`Dispatcher`]: resolves a [`Target`], sends a [`Command`] to each match and
//!   reconciles it, collecting a [`DispatchReport`]
//! - [`ScanOrchestrator`]: discovery, registration and a full-fleet refresh
//! - [`Fleet`]: the operations an outer API exposes, bundled over one registry
//!
//! The registry, transport and discovery are traits ([`Registry`],
//! [`Transport`], [`Discovery`]) with Wiz UDP and JSON-file implementations
//! provided.
//!
//! ## Communication
//!
//! All communication with Wiz bulbs occurs over UDP on port 38899. Each request
//! is bounded by a timeout from [`FleetConfig`] and never retried; the next
//! scan or command is the retry.

mod config;
mod discovery;
mod dispatcher;
mod errors;
mod fleet;
mod payload;
mod reconciler;
mod record;
mod registry;
mod scan;
mod status;
#[cfg(test)]
mod testing;
mod transport;
mod types;

// Re-export public API
pub use config::FleetConfig;
pub use discovery::{BroadcastDiscovery, Discovery};
pub use dispatcher::{Action, Command, DispatchReport, Dispatcher, Outcome, Target, TargetReport};
pub use errors::{Error, ErrorKind};
pub use fleet::Fleet;
pub use payload::Payload;
pub use reconciler::StateReconciler;
pub use record::{DeviceRecord, sort_by_display_name};
pub use registry::{JsonFileRegistry, MemoryRegistry, Registry};
pub use scan::ScanOrchestrator;
pub use status::ReportedState;
pub use transport::{Transport, UdpTransport};
pub use types::{Brightness, PowerState, SceneMode};
