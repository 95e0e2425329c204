//! Code readers: the capability that turns camera frames (or scanner
//! keystrokes) into decoded ticket codes.
//!
//! Opening a reader yields a [`ReaderControl`]; the controller wraps it in a
//! [`ReaderGuard`] so the device is released on every exit path.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, warn};

use crate::checkin::Action;
use crate::error::CameraError;

pub type ReaderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Box<dyn ReaderControl>, CameraError>> + Send + 'a>>;

/// A device that can be opened to start delivering decodes into a [`DecodeSink`].
pub trait CodeReader: Send {
    /// Acquire the device. Fails if access is denied or the device is missing.
    fn open(&mut self, sink: DecodeSink) -> ReaderFuture<'_>;
}

/// Control over an open reader.
pub trait ReaderControl: Send {
    /// Stop delivering decodes until [`ReaderControl::resume`]. Frames seen
    /// while paused are dropped, not queued.
    fn pause(&mut self);
    fn resume(&mut self);
    /// Release the device. Called exactly once, by [`ReaderGuard`].
    fn close(&mut self);
}

/// Scoped ownership of an open reader; dropping it releases the device.
pub struct ReaderGuard {
    control: Option<Box<dyn ReaderControl>>,
}

impl ReaderGuard {
    pub fn new(control: Box<dyn ReaderControl>) -> Self {
        Self {
            control: Some(control),
        }
    }

    pub fn pause(&mut self) {
        if let Some(control) = self.control.as_mut() {
            control.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(control) = self.control.as_mut() {
            control.resume();
        }
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        if let Some(mut control) = self.control.take() {
            debug!("releasing code reader");
            control.close();
        }
    }
}

/// Where a reader delivers what it decodes.
///
/// Holds only a weak reference to the controller, so an open reader never
/// keeps a torn-down session alive.
#[derive(Clone)]
pub struct DecodeSink {
    tx: mpsc::WeakUnboundedSender<Action>,
}

impl DecodeSink {
    pub(crate) fn new(tx: mpsc::WeakUnboundedSender<Action>) -> Self {
        Self { tx }
    }

    /// Deliver a decoded code. Returns `false` once the controller is gone.
    pub fn decoded(&self, code: impl Into<String>) -> bool {
        self.send(Action::Decoded(code.into()))
    }

    /// Report an unreadable frame.
    pub fn decode_failed(&self, reason: impl Into<String>) -> bool {
        self.send(Action::DecodeFailed(reason.into()))
    }

    fn send(&self, action: Action) -> bool {
        self.tx
            .upgrade()
            .is_some_and(|tx| tx.send(action).is_ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderMode {
    Active,
    Paused,
    Closed,
}

/// A reader fed by a line-oriented source, one code per line.
///
/// Handheld barcode scanners in keyboard mode type the code followed by
/// Enter, so `LineReader::stdin()` turns such a scanner into a code reader.
pub struct LineReader<S> {
    lines: Arc<Mutex<Lines<S>>>,
}

impl<S> LineReader<S>
where
    S: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(source: S) -> Self {
        Self {
            lines: Arc::new(Mutex::new(source.lines())),
        }
    }
}

impl LineReader<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<S> CodeReader for LineReader<S>
where
    S: AsyncBufRead + Unpin + Send + 'static,
{
    fn open(&mut self, sink: DecodeSink) -> ReaderFuture<'_> {
        let lines = Arc::clone(&self.lines);
        Box::pin(async move {
            let (mode_tx, mode_rx) = watch::channel(ReaderMode::Active);
            tokio::spawn(pump_lines(lines, sink, mode_rx));
            Ok(Box::new(LineControl { mode: mode_tx }) as Box<dyn ReaderControl>)
        })
    }
}

struct LineControl {
    mode: watch::Sender<ReaderMode>,
}

impl ReaderControl for LineControl {
    fn pause(&mut self) {
        self.mode.send_replace(ReaderMode::Paused);
    }

    fn resume(&mut self) {
        self.mode.send_replace(ReaderMode::Active);
    }

    fn close(&mut self) {
        self.mode.send_replace(ReaderMode::Closed);
    }
}

async fn pump_lines<S>(
    lines: Arc<Mutex<Lines<S>>>,
    sink: DecodeSink,
    mut mode: watch::Receiver<ReaderMode>,
) where
    S: AsyncBufRead + Unpin + Send,
{
    // A previous pump may still hold the source for a moment after closing.
    let mut lines = lines.lock().await;
    loop {
        if *mode.borrow_and_update() == ReaderMode::Closed {
            break;
        }
        tokio::select! {
            changed = mode.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if *mode.borrow() != ReaderMode::Active {
                        debug!("reader paused, dropping scan");
                        continue;
                    }
                    let code = line.trim();
                    let delivered = if code.is_empty() {
                        sink.decode_failed("empty scan")
                    } else {
                        sink.decoded(code)
                    };
                    if !delivered {
                        break;
                    }
                }
                Ok(None) => {
                    debug!("code source exhausted");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "code source failed");
                    break;
                }
            },
        }
    }
}
