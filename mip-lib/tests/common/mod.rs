//! Common test utilities and shared imports

// Shared across several test files; not every item is used in each of them
#![allow(dead_code, unused_imports)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub use bytes::Bytes;
pub use hex;
pub use mip_lib::constants::*;
pub use mip_lib::types::*;
pub use mip_lib::{Config, Expect, Mip, MipError, Transport};

use mip_lib::Result;

/// In-memory transport driven by a script of canned frames.
///
/// Every frame written is recorded in `sent`. Queries are answered from
/// `responses` in order and `poll_out_of_band` drains `notifications`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub options: Option<String>,
    pub connected: bool,
    pub connected_to: Option<String>,
    pub discovering: bool,
    pub discovered: Vec<String>,
    pub sent: Vec<(Bytes, Expect)>,
    pub responses: VecDeque<Bytes>,
    pub notifications: VecDeque<Bytes>,
    /// Returned once by `poll_out_of_band` after the notification queue runs dry.
    pub poll_error: Option<MipError>,
    /// Miss the deadline on the next query. The reply queued for it arrives
    /// late and is dropped, as a real transport must do.
    pub stall: bool,
    /// How long every reply takes to arrive. Only `stall` applies the deadline.
    pub reply_delay: Duration,
    pub closed: Arc<AtomicBool>,
    awaiting_response: bool,
}

impl ScriptedTransport {
    pub fn respond(&mut self, hex_frame: &str) -> &mut Self {
        self.responses.push_back(hex_to_bytes(hex_frame));
        self
    }

    pub fn notify(&mut self, hex_frame: &str) -> &mut Self {
        self.notifications.push_back(hex_to_bytes(hex_frame));
        self
    }

    /// The frames written so far, hex encoded.
    pub fn sent_hex(&self) -> Vec<String> {
        self.sent.iter().map(|(frame, _)| hex::encode(frame)).collect()
    }

    pub fn last_sent(&self) -> Option<&(Bytes, Expect)> {
        self.sent.last()
    }
}

impl Transport for ScriptedTransport {
    async fn open(options: Option<&str>) -> Result<Self> {
        Ok(Self {
            options: options.map(str::to_owned),
            ..Default::default()
        })
    }

    async fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    async fn connect(&mut self, name: Option<&str>) -> Result<()> {
        let target = match name {
            Some(name) => self
                .discovered
                .iter()
                .find(|candidate| candidate.as_str() == name)
                .cloned()
                .ok_or_else(|| MipError::Connect(format!("no robot named {}", name)))?,
            None => self
                .discovered
                .first()
                .cloned()
                .ok_or_else(|| MipError::Connect("no robots discovered".to_string()))?,
        };
        self.connected = true;
        self.connected_to = Some(target);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if !self.connected {
            return Err(MipError::NotConnected);
        }
        self.connected = false;
        self.connected_to = None;
        Ok(())
    }

    async fn start_discovery(&mut self) -> Result<()> {
        self.discovering = true;
        Ok(())
    }

    async fn discovered_count(&mut self) -> Result<usize> {
        Ok(self.discovered.len())
    }

    async fn discovered_name(&mut self, index: usize) -> Result<String> {
        self.discovered
            .get(index)
            .cloned()
            .ok_or_else(|| MipError::Connect(format!("no robot at index {}", index)))
    }

    async fn stop_discovery(&mut self) -> Result<()> {
        self.discovering = false;
        Ok(())
    }

    async fn send(&mut self, frame: &[u8], expect: Expect) -> Result<()> {
        if !self.connected {
            return Err(MipError::NotConnected);
        }
        self.sent.push((Bytes::copy_from_slice(frame), expect));
        self.awaiting_response = expect == Expect::Response;
        Ok(())
    }

    async fn receive_response(&mut self) -> Result<Bytes> {
        if !self.awaiting_response {
            return Err(MipError::NoRequest);
        }
        self.awaiting_response = false;
        if std::mem::take(&mut self.stall) {
            let waited = tokio::time::timeout(RESPONSE_DEADLINE, std::future::pending::<()>()).await;
            self.responses.pop_front();
            waited?;
        }
        if !self.reply_delay.is_zero() {
            tokio::time::sleep(self.reply_delay).await;
        }
        self.responses.pop_front().ok_or(MipError::Timeout)
    }

    async fn poll_out_of_band(&mut self) -> Result<Option<Bytes>> {
        if !self.connected {
            return Err(MipError::NotConnected);
        }
        match self.notifications.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => match self.poll_error.take() {
                Some(err) => Err(err),
                None => Ok(None),
            },
        }
    }
}

/// How long `ScriptedTransport` waits for a reply before giving up.
pub const RESPONSE_DEADLINE: Duration = Duration::from_secs(2);

/// A session over a transport that is already connected to "MiP-1".
pub fn connected_mip() -> Mip<ScriptedTransport> {
    let transport = ScriptedTransport {
        connected: true,
        connected_to: Some("MiP-1".to_string()),
        discovered: vec!["MiP-1".to_string()],
        ..Default::default()
    };
    Mip::with_transport(transport, Config::default())
}

/// Decode hex string to bytes for testing
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}
