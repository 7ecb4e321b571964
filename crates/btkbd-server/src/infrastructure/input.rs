//! Standard input as a [`LineSource`](crate::application::dictation::LineSource).
//!
//! Lines are read on a dedicated OS thread and forwarded over a bounded
//! channel.  A thread blocked in `read` does not hold the process open once
//! `main` returns, so Ctrl-C exits promptly even while stdin is idle.
//!
//! The thread is only started when the first line is requested, which the
//! dictation loop does after the host has connected.  Input piped in while
//! setup fails stays unread.

use std::io::{self, BufRead};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::application::dictation::LineSource;

type LineReceiver = mpsc::Receiver<io::Result<String>>;

/// Lines buffered ahead of the typing loop.
const READ_AHEAD: usize = 16;

/// Spawns the reader thread.  The receiver yields `None` at end of input;
/// a read error is forwarded once and ends the stream.
pub fn spawn_stdin_reader() -> io::Result<LineReceiver> {
    let (tx, rx) = mpsc::channel(READ_AHEAD);
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || forward_lines(io::stdin().lock(), &tx))?;
    Ok(rx)
}

/// Standard input, read from the first `read_line` on.
pub fn stdin_lines() -> LazyLineSource<fn() -> io::Result<LineReceiver>> {
    LazyLineSource::new(spawn_stdin_reader as fn() -> io::Result<LineReceiver>)
}

/// A [`LineSource`] that starts its reader on first use.
pub struct LazyLineSource<F> {
    start: Option<F>,
    lines: Option<LineReceiver>,
}

impl<F> LazyLineSource<F>
where
    F: FnOnce() -> io::Result<LineReceiver> + Send,
{
    pub fn new(start: F) -> Self {
        Self {
            start: Some(start),
            lines: None,
        }
    }
}

#[async_trait]
impl<F> LineSource for LazyLineSource<F>
where
    F: FnOnce() -> io::Result<LineReceiver> + Send,
{
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(start) = self.start.take() {
            debug!("starting input reader");
            self.lines = Some(start()?);
        }
        match self.lines.as_mut() {
            Some(lines) => lines.read_line().await,
            // The reader failed to start; that error was already returned.
            None => Ok(None),
        }
    }
}

fn forward_lines(reader: impl BufRead, tx: &mpsc::Sender<io::Result<String>>) {
    for line in reader.lines() {
        let failed = line.is_err();
        if tx.blocking_send(line).is_err() || failed {
            break;
        }
    }
}
