//! In-memory Bluetooth stack.
//!
//! Used by the unit and integration tests and by `btkbd --dry-run`.  Every
//! listen, accept, send, and close is appended to a shared [`ChannelLog`] so a
//! test can assert on the exact sequence of socket operations.  Failures are
//! injected with plain flags and builder methods.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use btkbd_core::{decode_report, AdapterAddress};
use tracing::debug;

use crate::application::establish::{
    BluetoothManager, ChannelFactory, ChannelListener, HidProfile, SetupError,
};
use crate::application::session::HidChannel;

/// Address reported by the mock adapter unless configured otherwise.
pub const MOCK_ADAPTER: AdapterAddress = AdapterAddress([0x00, 0x1A, 0x7D, 0xDA, 0x71, 0x13]);

/// Address of the simulated host.
pub const MOCK_HOST: AdapterAddress = AdapterAddress([0x3C, 0x22, 0xFB, 0x01, 0x02, 0x03]);

// ── Event log ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Listen { psm: u16, address: AdapterAddress },
    Accept { psm: u16 },
    Send { psm: u16, packet: Vec<u8> },
    Close { psm: u16 },
}

/// Shared, cloneable record of socket operations.
#[derive(Debug, Clone, Default)]
pub struct ChannelLog(Arc<Mutex<Vec<ChannelEvent>>>);

impl ChannelLog {
    pub fn events(&self) -> Vec<ChannelEvent> {
        self.lock().clone()
    }

    /// Packets written on the channel bound to `psm`, in order.
    pub fn sent(&self, psm: u16) -> Vec<Vec<u8>> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Send { psm: p, packet } if *p == psm => Some(packet.clone()),
                _ => None,
            })
            .collect()
    }

    /// PSMs bound, in bind order.
    pub fn listens(&self) -> Vec<u16> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Listen { psm, .. } => Some(*psm),
                _ => None,
            })
            .collect()
    }

    /// PSMs whose channel was closed, in close order.
    pub fn closed(&self) -> Vec<u16> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Close { psm } => Some(*psm),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ChannelEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChannelEvent>> {
        // A poisoned log only means another test thread panicked mid-push.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ── Management service ────────────────────────────────────────────────────────

/// Mock of bluetoothd's profile manager and adapter.
pub struct MockBluetoothManager {
    pub address: AdapterAddress,
    pub fail_registration: bool,
    pub fail_adapter_lookup: bool,
    registered: Arc<Mutex<Vec<HidProfile>>>,
}

impl MockBluetoothManager {
    pub fn with_address(address: AdapterAddress) -> Self {
        Self {
            address,
            fail_registration: false,
            fail_adapter_lookup: false,
            registered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Profiles passed to `register_profile`, shared with this manager.
    pub fn registered(&self) -> Arc<Mutex<Vec<HidProfile>>> {
        Arc::clone(&self.registered)
    }
}

impl Default for MockBluetoothManager {
    fn default() -> Self {
        Self::with_address(MOCK_ADAPTER)
    }
}

/// Returned by [`MockBluetoothManager::register_profile`].
#[derive(Debug)]
pub struct MockRegistration {
    pub name: String,
}

impl Drop for MockRegistration {
    fn drop(&mut self) {
        debug!(name = %self.name, "mock profile unregistered");
    }
}

#[async_trait]
impl BluetoothManager for MockBluetoothManager {
    type Registration = MockRegistration;

    async fn register_profile(&self, profile: HidProfile) -> Result<MockRegistration, SetupError> {
        if self.fail_registration {
            return Err(SetupError::Registration(format!(
                "UUID {} is already registered",
                profile.uuid
            )));
        }
        let name = profile.name.clone();
        self.registered
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(profile);
        Ok(MockRegistration { name })
    }

    async fn adapter_address(&self) -> Result<AdapterAddress, SetupError> {
        if self.fail_adapter_lookup {
            return Err(SetupError::AdapterLookup("no such adapter: hci0".into()));
        }
        Ok(self.address)
    }
}

// ── Channels ──────────────────────────────────────────────────────────────────

/// Mock L2CAP socket layer.  Every `accept` connects [`MOCK_HOST`] immediately.
pub struct MockChannelFactory {
    log: ChannelLog,
    fail_listen_psm: Option<u16>,
    fail_send_at: Option<usize>,
    fail_close: bool,
    sends: Arc<AtomicUsize>,
}

impl MockChannelFactory {
    pub fn new(log: ChannelLog) -> Self {
        Self {
            log,
            fail_listen_psm: None,
            fail_send_at: None,
            fail_close: false,
            sends: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes `listen` on `psm` fail with `AddrInUse`.
    pub fn with_listen_failure(mut self, psm: u16) -> Self {
        self.fail_listen_psm = Some(psm);
        self
    }

    /// Makes the `n`-th send (1-based, across all channels) fail with `BrokenPipe`.
    pub fn with_send_failure_at(mut self, n: usize) -> Self {
        self.fail_send_at = Some(n);
        self
    }

    /// Makes every `close` fail after the close has been recorded.
    pub fn with_close_failure(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

impl ChannelFactory for MockChannelFactory {
    type Listener = MockListener;

    fn listen(&self, address: AdapterAddress, psm: u16) -> io::Result<MockListener> {
        if self.fail_listen_psm == Some(psm) {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                format!("PSM {psm} already bound"),
            ));
        }
        self.log.push(ChannelEvent::Listen { psm, address });
        Ok(MockListener {
            psm,
            log: self.log.clone(),
            fail_send_at: self.fail_send_at,
            fail_close: self.fail_close,
            sends: Arc::clone(&self.sends),
        })
    }
}

pub struct MockListener {
    psm: u16,
    log: ChannelLog,
    fail_send_at: Option<usize>,
    fail_close: bool,
    sends: Arc<AtomicUsize>,
}

#[async_trait]
impl ChannelListener for MockListener {
    type Channel = MockChannel;

    async fn accept(&mut self) -> io::Result<(MockChannel, AdapterAddress)> {
        self.log.push(ChannelEvent::Accept { psm: self.psm });
        let channel = MockChannel {
            psm: self.psm,
            log: self.log.clone(),
            fail_send_at: self.fail_send_at,
            fail_close: self.fail_close,
            sends: Arc::clone(&self.sends),
            open: true,
        };
        Ok((channel, MOCK_HOST))
    }
}

pub struct MockChannel {
    psm: u16,
    log: ChannelLog,
    fail_send_at: Option<usize>,
    fail_close: bool,
    sends: Arc<AtomicUsize>,
    open: bool,
}

#[async_trait]
impl HidChannel for MockChannel {
    async fn send(&mut self, packet: &[u8]) -> io::Result<()> {
        if !self.open {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        let n = self.sends.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_send_at == Some(n) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "host disconnected"));
        }
        match decode_report(packet) {
            Ok(report) => debug!(psm = self.psm, ?report, "mock send"),
            Err(_) => debug!(psm = self.psm, ?packet, "mock send"),
        }
        self.log.push(ChannelEvent::Send {
            psm: self.psm,
            packet: packet.to_vec(),
        });
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.log.push(ChannelEvent::Close { psm: self.psm });
        if self.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_failure_is_injected_once_at_requested_index() {
        // Arrange
        let log = ChannelLog::default();
        let factory = MockChannelFactory::new(log.clone()).with_send_failure_at(2);
        let mut listener = factory.listen(MOCK_ADAPTER, 19).unwrap();
        let (mut channel, peer) = listener.accept().await.unwrap();

        // Act
        let first = channel.send(&[1]).await;
        let second = channel.send(&[2]).await;
        let third = channel.send(&[3]).await;

        // Assert
        assert_eq!(peer, MOCK_HOST);
        assert!(first.is_ok());
        assert_eq!(second.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(third.is_ok());
        assert_eq!(log.sent(19), vec![vec![1], vec![3]]);
    }

    #[tokio::test]
    async fn test_closed_channel_rejects_sends_and_logs_one_close() {
        let log = ChannelLog::default();
        let factory = MockChannelFactory::new(log.clone());
        let (mut channel, _) = factory.listen(MOCK_ADAPTER, 17).unwrap().accept().await.unwrap();

        channel.close().await.unwrap();
        channel.close().await.unwrap();

        assert_eq!(channel.send(&[0]).await.unwrap_err().kind(), io::ErrorKind::NotConnected);
        assert_eq!(log.closed(), vec![17]);
    }

    #[tokio::test]
    async fn test_close_failure_is_reported_once_and_still_logged() {
        let log = ChannelLog::default();
        let factory = MockChannelFactory::new(log.clone()).with_close_failure();
        let (mut channel, _) = factory.listen(MOCK_ADAPTER, 19).unwrap().accept().await.unwrap();

        let first = channel.close().await;
        let second = channel.close().await;

        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(log.closed(), vec![19]);
    }

    #[tokio::test]
    async fn test_manager_records_registered_profile() {
        let manager = MockBluetoothManager::default();
        let registered = manager.registered();

        let registration = manager
            .register_profile(HidProfile::keyboard("kbd", "<record/>"))
            .await
            .unwrap();

        assert_eq!(registration.name, "kbd");
        assert_eq!(registered.lock().unwrap()[0].name, "kbd");
        assert_eq!(manager.adapter_address().await.unwrap(), MOCK_ADAPTER);
    }
}
