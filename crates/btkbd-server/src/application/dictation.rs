//! DictationLoop: establishes the connection, then types each input line on
//! the host followed by Enter.
//!
//! The loop ends when input is exhausted, when the shutdown future resolves
//! (Ctrl-C in the binary), or on the first transport error.  In every case
//! the session is closed and the profile registration dropped before
//! returning.

use std::{future::Future, io};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{io::AsyncBufRead, sync::mpsc};
use tracing::{info, warn};

use crate::application::establish::{
    BluetoothManager, ChannelFactory, ConnectionEstablisher, Established, SetupError,
};
use crate::application::session::{HidChannel, TransportError, TransportSession};

/// Appended to every line so the host sees Enter.
const LINE_TERMINATOR: char = '\n';

/// Producer of input lines, without their terminators.
#[async_trait]
pub trait LineSource: Send {
    /// `Ok(None)` at end of input.  Must be cancel safe.
    async fn read_line(&mut self) -> io::Result<Option<String>>;
}

#[async_trait]
impl<R> LineSource for tokio::io::Lines<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.next_line().await
    }
}

/// Lines forwarded from a reader thread.
#[async_trait]
impl LineSource for mpsc::Receiver<io::Result<String>> {
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.recv().await.transpose()
    }
}

#[derive(Debug, Error)]
pub enum DictationError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    EndOfInput,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictationSummary {
    pub lines: u64,
    pub characters: u64,
    pub reports: u64,
    pub termination: Termination,
}

pub struct DictationLoop<M, F> {
    establisher: ConnectionEstablisher<M, F>,
}

impl<M, F> DictationLoop<M, F>
where
    M: BluetoothManager,
    F: ChannelFactory,
{
    pub fn new(establisher: ConnectionEstablisher<M, F>) -> Self {
        Self { establisher }
    }

    /// Runs until `input` is exhausted or a write fails.
    pub async fn run<L: LineSource>(&self, input: L) -> Result<DictationSummary, DictationError> {
        self.run_until(input, std::future::pending()).await
    }

    /// Like [`run`](Self::run), but also stops cleanly when `shutdown` resolves.
    ///
    /// A character already being typed is finished first: shutdown is only
    /// observed while waiting for the next line.
    pub async fn run_until<L, S>(
        &self,
        mut input: L,
        shutdown: S,
    ) -> Result<DictationSummary, DictationError>
    where
        L: LineSource,
        S: Future<Output = ()>,
    {
        let Established {
            registration,
            mut session,
        } = self.establisher.establish().await?;

        let result = type_lines(&mut session, &mut input, shutdown).await;

        if let Err(e) = session.close().await {
            warn!("session did not close cleanly: {e}");
        }
        drop(registration);
        info!("HID profile unregistered");

        let mut summary = result?;
        summary.reports = session.reports_sent();
        Ok(summary)
    }
}

async fn type_lines<C, L, S>(
    session: &mut TransportSession<C>,
    input: &mut L,
    shutdown: S,
) -> Result<DictationSummary, DictationError>
where
    C: HidChannel,
    L: LineSource,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut summary = DictationSummary {
        lines: 0,
        characters: 0,
        reports: 0,
        termination: Termination::EndOfInput,
    };

    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("shutdown requested");
                summary.termination = Termination::Shutdown;
                break;
            }
            line = input.read_line() => line.map_err(DictationError::Input)?,
        };
        let Some(line) = line else {
            info!("end of input");
            break;
        };

        for c in line.chars().chain(std::iter::once(LINE_TERMINATOR)) {
            session.send_key_event(c).await?;
            summary.characters += 1;
        }
        summary.lines += 1;
    }

    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
