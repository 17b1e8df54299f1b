//! Scripted transport for tests
//!
//! Records every open, counts closes by watching stream drops, and lets the
//! test emit events into the currently open connection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{ConnectOptions, EventStream, Transport, TransportEvent};

#[derive(Default)]
pub struct MockTransport {
    opens: AtomicUsize,
    closes: Arc<AtomicUsize>,
    sender: Mutex<Option<UnboundedSender<TransportEvent>>>,
    last_url: Mutex<Option<String>>,
    last_options: Mutex<Option<ConnectOptions>>,
}

/// Bumps the close counter when the event stream is dropped
struct CloseGuard(Arc<AtomicUsize>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Emit a named event into the currently open connection.
    pub fn emit(&self, event: &str, data: &str) {
        if let Some(tx) = self.sender.lock().as_ref() {
            let _ = tx.send(TransportEvent::Message {
                event: event.to_string(),
                data: data.to_string(),
            });
        }
    }

    /// Emit a transport-level error into the currently open connection.
    pub fn emit_error(&self) {
        if let Some(tx) = self.sender.lock().as_ref() {
            let _ = tx.send(TransportEvent::Error);
        }
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().clone()
    }

    pub fn last_options(&self) -> Option<ConnectOptions> {
        self.last_options.lock().clone()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn open(&self, url: &str, options: &ConnectOptions) -> anyhow::Result<EventStream> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock() = Some(url.to_string());
        *self.last_options.lock() = Some(options.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock() = Some(tx);

        let guard = CloseGuard(self.closes.clone());
        let stream = UnboundedReceiverStream::new(rx).map(move |event| {
            let _alive = &guard;
            event
        });
        Ok(Box::pin(stream))
    }
}
