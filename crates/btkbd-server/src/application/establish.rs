//! ConnectionEstablisher: registers the HID profile and performs the
//! two-channel L2CAP handshake with the host.
//!
//! # Handshake order (for beginners)
//!
//! ```text
//! btkbd                                   BlueZ / host
//! ─────                                   ────────────
//! register_profile(HID, service record) ─▶ bluetoothd publishes the SDP record
//! adapter_address()                     ─▶ e.g. DC:A6:32:00:11:22
//! listen(addr, PSM 17)   (control)
//! listen(addr, PSM 19)   (interrupt)
//!                                          host pairs and connects
//! accept control         ◀──────────────── L2CAP connect PSM 17
//! accept interrupt       ◀──────────────── L2CAP connect PSM 19
//! ```
//!
//! Every step is awaited in sequence; hosts always open the control channel
//! first, so accepting in that order never deadlocks.  There is no timeout:
//! an operator is expected to pair the host while the process waits.
//!
//! Both the management service and the socket layer sit behind traits so the
//! handshake can run against the in-memory stack in
//! [`crate::infrastructure::bluetooth::mock`].

use std::io;

use async_trait::async_trait;
use btkbd_core::{
    protocol::{CONTROL_PSM, HID_SERVICE_UUID, INTERRUPT_PSM},
    AdapterAddress,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::session::{HidChannel, TransportSession};

/// Error type for connection setup.  Every variant is fatal for the process.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The Bluetooth management service (bluetoothd) could not be reached.
    #[error("Bluetooth service unavailable: {0}")]
    ServiceUnavailable(String),
    /// `RegisterProfile` was rejected, e.g. because the UUID is already registered.
    #[error("HID profile registration failed: {0}")]
    Registration(String),
    #[error("adapter address lookup failed: {0}")]
    AdapterLookup(String),
    #[error("failed to listen on L2CAP PSM {psm}: {source}")]
    Listen {
        psm: u16,
        #[source]
        source: io::Error,
    },
    #[error("failed to accept connection on L2CAP PSM {psm}: {source}")]
    Accept {
        psm: u16,
        #[source]
        source: io::Error,
    },
}

/// Options passed to `RegisterProfile`.  The profile is always registered
/// in the server role: the host initiates both L2CAP connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HidProfile {
    /// Human readable profile name.
    pub name: String,
    pub uuid: Uuid,
    pub require_authentication: bool,
    pub require_authorization: bool,
    pub auto_connect: bool,
    /// SDP service record XML, passed through unmodified.
    pub service_record: String,
}

impl HidProfile {
    /// The profile for an unauthenticated, auto-connecting HID keyboard server.
    pub fn keyboard(name: impl Into<String>, service_record: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: HID_SERVICE_UUID,
            require_authentication: false,
            require_authorization: false,
            auto_connect: true,
            service_record: service_record.into(),
        }
    }
}

/// Handle to the host's Bluetooth management service.
#[async_trait]
pub trait BluetoothManager: Send + Sync {
    /// Keeps the profile registered for as long as it is alive.
    type Registration: Send;

    /// Registers `profile` with the management service.
    async fn register_profile(&self, profile: HidProfile) -> Result<Self::Registration, SetupError>;

    /// Looks up the address of the local adapter.
    async fn adapter_address(&self) -> Result<AdapterAddress, SetupError>;
}

/// Opens listening L2CAP SEQPACKET endpoints.
pub trait ChannelFactory: Send + Sync {
    type Listener: ChannelListener;

    /// Binds `(address, psm)` with address reuse enabled and a backlog of one.
    fn listen(&self, address: AdapterAddress, psm: u16) -> io::Result<Self::Listener>;
}

/// A bound, listening endpoint.
#[async_trait]
pub trait ChannelListener: Send {
    type Channel: HidChannel;

    /// Waits for one peer to connect, returning the channel and the peer address.
    async fn accept(&mut self) -> io::Result<(Self::Channel, AdapterAddress)>;
}

/// Connected channel type produced by a [`ChannelFactory`].
pub type ChannelOf<F> = <<F as ChannelFactory>::Listener as ChannelListener>::Channel;

/// Result of a successful handshake.
///
/// The registration is returned alongside the session so the caller decides
/// when the profile goes away; dropping it unregisters.
pub struct Established<R, C> {
    pub registration: R,
    pub session: TransportSession<C>,
}

/// Performs profile registration and the control/interrupt handshake.
pub struct ConnectionEstablisher<M, F> {
    manager: M,
    channels: F,
    profile: HidProfile,
}

impl<M, F> ConnectionEstablisher<M, F>
where
    M: BluetoothManager,
    F: ChannelFactory,
{
    pub fn new(manager: M, channels: F, profile: HidProfile) -> Self {
        Self {
            manager,
            channels,
            profile,
        }
    }

    /// Runs the handshake once.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if registration, adapter lookup, or either
    /// listen/accept fails.  Nothing is retried.  If registration or lookup
    /// fails no endpoint has been bound.
    pub async fn establish(
        &self,
    ) -> Result<Established<M::Registration, ChannelOf<F>>, SetupError> {
        info!(name = %self.profile.name, uuid = %self.profile.uuid, "registering HID profile");
        let registration = self.manager.register_profile(self.profile.clone()).await?;

        let address = self.manager.adapter_address().await?;
        info!(%address, "local adapter resolved");

        let mut control = self
            .channels
            .listen(address, CONTROL_PSM)
            .map_err(|source| SetupError::Listen { psm: CONTROL_PSM, source })?;
        let mut interrupt = self
            .channels
            .listen(address, INTERRUPT_PSM)
            .map_err(|source| SetupError::Listen { psm: INTERRUPT_PSM, source })?;

        info!("waiting for a host to connect");

        let (control_channel, peer) = control
            .accept()
            .await
            .map_err(|source| SetupError::Accept { psm: CONTROL_PSM, source })?;
        info!(%peer, "connected on the control channel");

        let (interrupt_channel, peer) = interrupt
            .accept()
            .await
            .map_err(|source| SetupError::Accept { psm: INTERRUPT_PSM, source })?;
        info!(%peer, "connected on the interrupt channel");

        Ok(Established {
            registration,
            session: TransportSession::new(control_channel, interrupt_channel),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
