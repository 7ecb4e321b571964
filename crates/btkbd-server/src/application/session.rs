//! TransportSession: the pair of connected L2CAP channels and the logic that
//! turns one character into a press/release report pair on the wire.
//!
//! # What happens per character (for beginners)
//!
//! ```text
//! 'H' ─▶ char_to_keycode ─▶ KeyH + shift
//!     ─▶ interrupt.send([A1 01 40 00 0B 00 00 00 00 00])   (press)
//!     ─▶ sleep 10 ms
//!     ─▶ interrupt.send([A1 01 00 00 00 00 00 00 00 00])   (release)
//!     ─▶ sleep 10 ms
//! ```
//!
//! The control channel is held open for the lifetime of the session but never
//! written.  Dropping a session drops both channels, which closes the sockets;
//! [`TransportSession::close`] does the same explicitly and reports failures.

use std::io;

use async_trait::async_trait;
use btkbd_core::{
    char_to_keycode, encode_press, encode_release, protocol::REPORT_INTERVAL, KeyState,
    KeyStateError, KeyStroke, ReportBytes,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// One connected L2CAP SEQPACKET channel.
#[async_trait]
pub trait HidChannel: Send {
    /// Writes one whole packet.
    async fn send(&mut self, packet: &[u8]) -> io::Result<()>;

    /// Shuts the channel down.  Closing an already-closed channel succeeds.
    async fn close(&mut self) -> io::Result<()>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("write to the interrupt channel failed: {0}")]
    Write(#[source] io::Error),
    #[error("failed to close channel: {0}")]
    Close(#[source] io::Error),
    #[error("session is closed")]
    Closed,
    #[error("report sequence out of order: {0}")]
    KeyState(#[from] KeyStateError),
}

/// The two connected channels of one host connection.
pub struct TransportSession<C> {
    control: Option<C>,
    interrupt: Option<C>,
    key_state: KeyState,
    reports_sent: u64,
}

impl<C: HidChannel> TransportSession<C> {
    pub fn new(control: C, interrupt: C) -> Self {
        Self {
            control: Some(control),
            interrupt: Some(interrupt),
            key_state: KeyState::Released,
            reports_sent: 0,
        }
    }

    /// Types `c` on the host: a press report, 10 ms, a release report, 10 ms.
    ///
    /// Characters with no key code are sent as an empty press so the
    /// press/release alternation is kept.
    ///
    /// # Errors
    ///
    /// [`TransportError::Write`] if either report cannot be written;
    /// [`TransportError::Closed`] after [`close`](Self::close).
    pub async fn send_key_event(&mut self, c: char) -> Result<(), TransportError> {
        let stroke = char_to_keycode(c).unwrap_or_else(|| {
            warn!(character = ?c, "no key code for character; sending an empty press");
            KeyStroke::NONE
        });
        let keycode = stroke.key.as_u8();

        let pressed = self.key_state.press(keycode)?;
        self.send_report(&encode_press(keycode, stroke.shift)).await?;
        self.key_state = pressed;
        tokio::time::sleep(REPORT_INTERVAL).await;

        let released = self.key_state.release()?;
        self.send_report(&encode_release()).await?;
        self.key_state = released;
        tokio::time::sleep(REPORT_INTERVAL).await;

        Ok(())
    }

    /// Closes the interrupt channel, then the control channel.
    ///
    /// Idempotent.  Both channels are always attempted; the first failure is
    /// returned.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        let mut first_error = None;
        let mut closed_any = false;

        for (name, channel) in [
            ("interrupt", self.interrupt.take()),
            ("control", self.control.take()),
        ] {
            let Some(mut channel) = channel else { continue };
            closed_any = true;
            if let Err(e) = channel.close().await {
                warn!(channel = name, "failed to close channel: {e}");
                first_error.get_or_insert(e);
            }
        }

        if closed_any {
            info!(reports = self.reports_sent, "session closed");
        }
        match first_error {
            Some(e) => Err(TransportError::Close(e)),
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.interrupt.is_some()
    }

    /// Number of reports successfully written on the interrupt channel.
    pub fn reports_sent(&self) -> u64 {
        self.reports_sent
    }

    pub fn key_state(&self) -> KeyState {
        self.key_state
    }

    async fn send_report(&mut self, report: &ReportBytes) -> Result<(), TransportError> {
        let interrupt = self.interrupt.as_mut().ok_or(TransportError::Closed)?;
        interrupt.send(report).await.map_err(TransportError::Write)?;
        self.reports_sent += 1;
        debug!(report = ?report, "report sent");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
