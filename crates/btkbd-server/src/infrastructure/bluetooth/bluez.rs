//! BlueZ implementation of the Bluetooth seams.
//!
//! # How this maps onto BlueZ (for beginners)
//!
//! - [`BluezManager`] talks to `bluetoothd` over D-Bus through `bluer`.  It
//!   registers the HID profile with `org.bluez.ProfileManager1.RegisterProfile`
//!   and reads the adapter address from `org.bluez.Adapter1`.  `bluer` picks
//!   the profile's D-Bus object path; the returned [`ProfileHandle`]
//!   unregisters the profile when dropped.
//! - [`L2capChannels`] opens kernel L2CAP SEQPACKET sockets directly.  PSMs
//!   below 0x1001 are privileged, so binding 17 and 19 needs root.

use std::io;
use std::os::fd::AsRawFd;

use async_trait::async_trait;
use bluer::{
    l2cap::{SeqPacket, SeqPacketListener, Socket, SocketAddr},
    rfcomm::{Profile, ProfileHandle, Role},
    Adapter, Address, AddressType, Session,
};
use btkbd_core::AdapterAddress;
use tracing::{debug, info};

use crate::application::establish::{
    BluetoothManager, ChannelFactory, ChannelListener, HidProfile, SetupError,
};
use crate::application::session::HidChannel;

/// One pending connection per PSM; the host connects exactly once.
const LISTEN_BACKLOG: u32 = 1;

// ── Profile manager ───────────────────────────────────────────────────────────

pub struct BluezManager {
    session: Session,
    adapter: Adapter,
}

impl BluezManager {
    /// Connects to bluetoothd and selects the adapter named `adapter_name`
    /// (e.g. `hci0`).  The adapter is not queried until it is used.
    pub async fn connect(adapter_name: &str) -> Result<Self, SetupError> {
        let session = Session::new()
            .await
            .map_err(|e| SetupError::ServiceUnavailable(e.to_string()))?;
        let adapter = session
            .adapter(adapter_name)
            .map_err(|e| SetupError::AdapterLookup(format!("{adapter_name}: {e}")))?;
        info!(adapter = adapter_name, "connected to bluetoothd");
        Ok(Self { session, adapter })
    }
}

#[async_trait]
impl BluetoothManager for BluezManager {
    type Registration = ProfileHandle;

    async fn register_profile(&self, profile: HidProfile) -> Result<ProfileHandle, SetupError> {
        let bluez_profile = Profile {
            uuid: profile.uuid,
            name: Some(profile.name),
            role: Some(Role::Server),
            require_authentication: Some(profile.require_authentication),
            require_authorization: Some(profile.require_authorization),
            auto_connect: Some(profile.auto_connect),
            service_record: Some(profile.service_record),
            ..Default::default()
        };
        self.session
            .register_profile(bluez_profile)
            .await
            .map_err(|e| SetupError::Registration(e.to_string()))
    }

    async fn adapter_address(&self) -> Result<AdapterAddress, SetupError> {
        let address = self
            .adapter
            .address()
            .await
            .map_err(|e| SetupError::AdapterLookup(format!("{}: {e}", self.adapter.name())))?;
        Ok(AdapterAddress::new(address.0))
    }
}

// ── L2CAP sockets ─────────────────────────────────────────────────────────────

/// Opens BR/EDR L2CAP SEQPACKET listeners.
pub struct L2capChannels;

impl ChannelFactory for L2capChannels {
    type Listener = L2capListener;

    fn listen(&self, address: AdapterAddress, psm: u16) -> io::Result<L2capListener> {
        let socket = Socket::<SeqPacket>::new_seq_packet()?;
        set_reuse_address(&socket)?;
        socket.bind(SocketAddr::new(Address(address.octets()), AddressType::BrEdr, psm))?;
        let listener = socket.listen(LISTEN_BACKLOG)?;
        debug!(%address, psm, "listening");
        Ok(L2capListener { psm, listener })
    }
}

pub struct L2capListener {
    psm: u16,
    listener: SeqPacketListener,
}

#[async_trait]
impl ChannelListener for L2capListener {
    type Channel = L2capChannel;

    async fn accept(&mut self) -> io::Result<(L2capChannel, AdapterAddress)> {
        let (socket, peer) = self.listener.accept().await?;
        Ok((
            L2capChannel {
                psm: self.psm,
                socket,
            },
            AdapterAddress::new(peer.addr.0),
        ))
    }
}

pub struct L2capChannel {
    psm: u16,
    socket: SeqPacket,
}

#[async_trait]
impl HidChannel for L2capChannel {
    async fn send(&mut self, packet: &[u8]) -> io::Result<()> {
        let written = self.socket.send(packet).await?;
        if written != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write on PSM {}: {written} of {} bytes", self.psm, packet.len()),
            ));
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        // SAFETY: the descriptor is owned by `self.socket` and stays open for the call.
        let rc = unsafe { libc::shutdown(self.socket.as_raw_fd(), libc::SHUT_RDWR) };
        if rc == 0 {
            debug!(psm = self.psm, "channel shut down");
            return Ok(());
        }
        let err = io::Error::last_os_error();
        // Already disconnected by the peer.
        if err.raw_os_error() == Some(libc::ENOTCONN) {
            return Ok(());
        }
        Err(err)
    }
}

/// Sets `SO_REUSEADDR` so a restart can rebind the PSMs immediately.
fn set_reuse_address(socket: &impl AsRawFd) -> io::Result<()> {
    let enable: libc::c_int = 1;
    // SAFETY: the descriptor is valid for the call and the option value is a
    // c_int living on this stack frame, with its exact size passed.
    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_REUSEADDR,
            (&enable as *const libc::c_int).cast::<libc::c_void>(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
