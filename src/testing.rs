//! Scripted collaborators for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::discovery::Discovery;
use crate::errors::Error;
use crate::status::ReportedState;
use crate::transport::Transport;
use crate::types::{Brightness, PowerState, SceneMode};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Query(String),
    PowerOn(String, u8),
    PowerOff(String),
    Scene(String, u16),
}

impl Call {
    fn is_command(&self) -> bool {
        !matches!(self, Call::Query(_))
    }
}

#[derive(Debug, Clone)]
struct FakeBulb {
    state: ReportedState,
    answers_queries: bool,
    accepts_commands: bool,
    delay: Duration,
}

/// Transport backed by an in-memory table of bulbs. Unknown addresses behave
/// like powered-off hardware and time out.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    bulbs: Mutex<HashMap<String, FakeBulb>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bulb(self, address: &str, power: PowerState, scene_id: u16) -> Self {
        self.bulbs.lock().unwrap().insert(
            address.to_string(),
            FakeBulb {
                state: ReportedState::new(power, scene_id),
                answers_queries: true,
                accepts_commands: true,
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn unreachable(self, address: &str) -> Self {
        self.edit(address, |b| {
            b.answers_queries = false;
            b.accepts_commands = false;
        });
        self
    }

    pub fn rejecting_commands(self, address: &str) -> Self {
        self.edit(address, |b| b.accepts_commands = false);
        self
    }

    pub fn slow(self, address: &str, delay: Duration) -> Self {
        self.edit(address, |b| b.delay = delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_command).collect()
    }

    fn edit(&self, address: &str, f: impl FnOnce(&mut FakeBulb)) {
        if let Some(bulb) = self.bulbs.lock().unwrap().get_mut(address) {
            f(bulb);
        }
    }

    fn timed_out() -> Error {
        Error::socket(
            "receive",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "receive timeout"),
        )
    }

    async fn command(
        &self,
        call: Call,
        address: &str,
        f: impl FnOnce(&mut ReportedState),
    ) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let delay = self.delay(address);
        tokio::time::sleep(delay).await;

        let mut bulbs = self.bulbs.lock().unwrap();
        match bulbs.get_mut(address) {
            Some(bulb) if bulb.accepts_commands => {
                f(&mut bulb.state);
                bulb.state.scene_name = SceneMode::name_of(bulb.state.scene_id);
                Ok(())
            }
            _ => Err(Self::timed_out()),
        }
    }

    fn delay(&self, address: &str) -> Duration {
        self.bulbs
            .lock()
            .unwrap()
            .get(address)
            .map_or(Duration::ZERO, |b| b.delay)
    }
}

impl Transport for FakeTransport {
    async fn query_state(&self, address: &str, _timeout: Duration) -> Result<ReportedState> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Query(address.to_string()));
        let delay = self.delay(address);
        tokio::time::sleep(delay).await;

        match self.bulbs.lock().unwrap().get(address) {
            Some(bulb) if bulb.answers_queries => Ok(bulb.state.clone()),
            _ => Err(Self::timed_out()),
        }
    }

    async fn send_power_on(
        &self,
        address: &str,
        brightness: Brightness,
        _timeout: Duration,
    ) -> Result<()> {
        self.command(
            Call::PowerOn(address.to_string(), brightness.value()),
            address,
            |s| s.power = PowerState::On,
        )
        .await
    }

    async fn send_power_off(&self, address: &str, _timeout: Duration) -> Result<()> {
        self.command(Call::PowerOff(address.to_string()), address, |s| {
            s.power = PowerState::Off
        })
        .await
    }

    async fn send_activate_scene(
        &self,
        address: &str,
        scene: SceneMode,
        _timeout: Duration,
    ) -> Result<()> {
        self.command(Call::Scene(address.to_string(), scene.id()), address, |s| {
            s.power = PowerState::On;
            s.scene_id = scene.id();
        })
        .await
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDiscovery {
    addresses: Vec<String>,
    fails: bool,
}

impl FakeDiscovery {
    pub fn finding(addresses: &[&str]) -> Self {
        FakeDiscovery {
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
            fails: false,
        }
    }

    pub fn broken() -> Self {
        FakeDiscovery {
            addresses: Vec::new(),
            fails: true,
        }
    }
}

impl Discovery for FakeDiscovery {
    async fn discover(&self, _window: Duration) -> Result<Vec<String>> {
        if self.fails {
            return Err(Error::Discovery(Box::new(Error::socket(
                "bind",
                std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
            ))));
        }
        Ok(self.addresses.clone())
    }
}
