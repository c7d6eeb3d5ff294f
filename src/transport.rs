//! Per-bulb command and query transport.

use std::future::Future;
use std::net::Ipv4Addr;
use std::time::Duration;

use log::debug;
use serde_json::{Value, json};
use tokio::net::UdpSocket;

use crate::errors::Error;
use crate::payload::Payload;
use crate::status::{BulbStatus, ReportedState};
use crate::types::{Brightness, SceneMode};

type Result<T> = std::result::Result<T, Error>;

/// Network round trips to a single bulb.
///
/// Every call is bounded by `timeout`; expiry is reported as an error like any
/// other connection failure. Implementations do not retry.
pub trait Transport: Send + Sync {
    fn query_state(
        &self,
        address: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<ReportedState>> + Send;

    fn send_power_on(
        &self,
        address: &str,
        brightness: Brightness,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    fn send_power_off(
        &self,
        address: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    fn send_activate_scene(
        &self,
        address: &str,
        scene: SceneMode,
        timeout: Duration,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Wiz JSON-over-UDP transport.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    port: u16,
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new(Self::PORT)
    }
}

impl UdpTransport {
    pub const PORT: u16 = 38899;

    pub fn new(port: u16) -> Self {
        UdpTransport { port }
    }

    async fn set_pilot(&self, address: &str, payload: &Payload, timeout: Duration) -> Result<()> {
        if !payload.is_valid() {
            return Err(Error::NoAttribute);
        }
        let params = serde_json::to_value(payload).map_err(Error::JsonDump)?;
        self.request(
            address,
            &json!({"method": "setPilot", "params": params}),
            timeout,
        )
        .await?;
        Ok(())
    }

    async fn request(&self, address: &str, msg: &Value, timeout: Duration) -> Result<Value> {
        let ip: Ipv4Addr = address
            .parse()
            .map_err(|_| Error::InvalidAddress(address.to_string()))?;
        let msg_str = serde_json::to_string(msg).map_err(Error::JsonDump)?;
        debug!("UDP request to {}: {}", ip, msg_str);

        let response = tokio::time::timeout(timeout, self.send_udp(ip, &msg_str))
            .await
            .map_err(|_| {
                Error::socket(
                    "receive",
                    std::io::Error::new(std::io::ErrorKind::TimedOut, "receive timeout"),
                )
            })??;
        debug!("UDP response from {}: {:?}", ip, response);

        if let Some(err) = response.get("error") {
            return Err(Error::BulbRejected {
                address: address.to_string(),
                method: msg["method"].as_str().unwrap_or_default().to_string(),
                message: err
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
                    .unwrap_or_else(|| err.to_string()),
            });
        }
        Ok(response)
    }

    async fn send_udp(&self, ip: Ipv4Addr, msg: &str) -> Result<Value> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;

        socket
            .connect((ip, self.port))
            .await
            .map_err(|e| Error::socket("connect", e))?;

        socket
            .send(msg.as_bytes())
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = [0u8; 4096];
        let bytes = socket
            .recv(&mut buffer)
            .await
            .map_err(|e| Error::socket("receive", e))?;

        let response = String::from_utf8(buffer[..bytes].to_vec()).map_err(Error::Utf8Decode)?;
        serde_json::from_str(&response).map_err(Error::JsonLoad)
    }
}

impl Transport for UdpTransport {
    async fn query_state(&self, address: &str, timeout: Duration) -> Result<ReportedState> {
        let resp = self
            .request(
                address,
                &json!({"method": "getPilot", "params": {}}),
                timeout,
            )
            .await?;
        let status: BulbStatus = serde_json::from_value(resp).map_err(Error::JsonLoad)?;
        debug!(
            "bulb {} (mac {:?}) reports {:?}",
            address, status.result.mac, status.result
        );
        Ok(ReportedState::from(&status))
    }

    async fn send_power_on(
        &self,
        address: &str,
        brightness: Brightness,
        timeout: Duration,
    ) -> Result<()> {
        self.set_pilot(address, &Payload::power_on(&brightness), timeout)
            .await
    }

    async fn send_power_off(&self, address: &str, timeout: Duration) -> Result<()> {
        self.set_pilot(address, &Payload::power_off(), timeout)
            .await
    }

    async fn send_activate_scene(
        &self,
        address: &str,
        scene: SceneMode,
        timeout: Duration,
    ) -> Result<()> {
        self.set_pilot(address, &Payload::from(&scene), timeout)
            .await
    }
}
