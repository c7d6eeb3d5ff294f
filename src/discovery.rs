//! Device discovery via UDP broadcast.

use std::collections::BTreeMap;
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::debug;
use serde_json::{Value, json};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Finds bulbs on the local network.
pub trait Discovery: Send + Sync {
    /// Addresses of every bulb that answered within `window`.
    fn discover(&self, window: Duration) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Sends the Wiz `registration` broadcast and collects replies.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use wiz_fleet::{BroadcastDiscovery, Discovery};
///
/// let addresses = BroadcastDiscovery::default()
///     .discover(Duration::from_secs(5))
///     .await?;
/// println!("Found {} bulbs", addresses.len());
/// ```
#[derive(Debug, Clone)]
pub struct BroadcastDiscovery {
    broadcast_address: String,
    port: u16,
}

impl Default for BroadcastDiscovery {
    fn default() -> Self {
        Self::new("255.255.255.255", 38899)
    }
}

impl BroadcastDiscovery {
    const RECV_TIMEOUT_MS: u64 = 500;

    pub fn new(broadcast_address: &str, port: u16) -> Self {
        BroadcastDiscovery {
            broadcast_address: broadcast_address.to_string(),
            port,
        }
    }

    async fn run(&self, window: Duration) -> Result<Vec<String>> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;

        socket
            .set_broadcast(true)
            .map_err(|e| Error::socket("set_broadcast", e))?;

        let msg = json!({
            "method": "registration",
            "params": {
                "phoneMac": "AAAAAAAAAAAA",
                "register": false,
                "phoneIp": "1.2.3.4",
                "id": "1"
            }
        });
        let msg_bytes = serde_json::to_vec(&msg).map_err(Error::JsonDump)?;

        socket
            .send_to(
                &msg_bytes,
                format!("{}:{}", self.broadcast_address, self.port),
            )
            .await
            .map_err(|e| Error::socket("send_to", e))?;

        // keyed by MAC so a bulb answering twice is counted once
        let mut discovered: BTreeMap<String, Ipv4Addr> = BTreeMap::new();
        let start = Instant::now();
        let mut buffer = [0u8; 4096];
        let recv_timeout = Duration::from_millis(Self::RECV_TIMEOUT_MS).min(window);

        while start.elapsed() < window {
            match tokio::time::timeout(recv_timeout, socket.recv_from(&mut buffer)).await {
                Ok(Ok((size, SocketAddr::V4(addr)))) => {
                    if let Some(mac) = serde_json::from_slice::<Value>(&buffer[..size])
                        .ok()
                        .as_ref()
                        .and_then(extract_mac)
                    {
                        debug!("discovered bulb {} at {}", mac, addr.ip());
                        discovered.insert(mac, *addr.ip());
                    }
                }
                Ok(Ok(_)) | Ok(Err(_)) | Err(_) => continue,
            }
        }

        let mut addresses: Vec<Ipv4Addr> = discovered.into_values().collect();
        addresses.sort();
        addresses.dedup();
        Ok(addresses.into_iter().map(|ip| ip.to_string()).collect())
    }
}

impl Discovery for BroadcastDiscovery {
    async fn discover(&self, window: Duration) -> Result<Vec<String>> {
        self.run(window)
            .await
            .map_err(|e| Error::Discovery(Box::new(e)))
    }
}

fn extract_mac(json: &Value) -> Option<String> {
    json.get("result")
        .and_then(|r| r.get("mac"))
        .and_then(|m| m.as_str())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_mac() {
        let reply = json!({"method": "registration", "result": {"mac": "a8bb50d4f1c2", "success": true}});
        assert_eq!(extract_mac(&reply).as_deref(), Some("a8bb50d4f1c2"));
        assert!(extract_mac(&json!({"result": {}})).is_none());
    }

    #[tokio::test]
    async fn test_collects_replies_from_loopback() {
        let bulb = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = bulb.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];
            let (_, from) = bulb.recv_from(&mut buffer).await.unwrap();
            let reply = json!({"method": "registration", "result": {"mac": "a8bb50000002", "success": true}});
            let bytes = serde_json::to_vec(&reply).unwrap();
            // duplicate answer, counted once
            bulb.send_to(&bytes, from).await.unwrap();
            bulb.send_to(&bytes, from).await.unwrap();
            bulb.send_to(b"garbage", from).await.unwrap();
        });

        let found = BroadcastDiscovery::new("127.0.0.1", port)
            .discover(Duration::from_millis(300))
            .await
            .unwrap();
        assert_eq!(found, vec!["127.0.0.1".to_string()]);
    }
}
