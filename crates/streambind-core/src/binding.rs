//! Reactive stream binding
//!
//! `StreamBinding` owns one connection epoch at a time, keyed on
//! (url, event, with_credentials). Rebinding with the same key never touches
//! the connection; rebinding with a different key tears the epoch down and
//! opens a new one, resetting the observable result to pending. The transform
//! lives in a latest-value slot outside the epoch key, so it can change on
//! every rebind without a reconnect and is always read fresh per event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::BindError;
use crate::result::StreamData;
use crate::transform::{FromPayload, Transform};
use crate::transport::wire::MESSAGE_EVENT;
use crate::transport::{ConnectOptions, Transport, TransportEvent};

/// One reconfiguration of a binding
pub struct BindingConfig<T> {
    pub url: String,
    pub event: String,
    pub with_credentials: bool,
    pub transform: Option<Transform<T>>,
}

impl<T> BindingConfig<T> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            event: MESSAGE_EVENT.to_string(),
            with_credentials: false,
            transform: None,
        }
    }

    /// Listen for a named event instead of the generic message event.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    pub fn transform(mut self, transform: Transform<T>) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// The configuration fields that identify a connection epoch
#[derive(Debug, Clone, PartialEq, Eq)]
struct EpochKey {
    url: String,
    event: String,
    with_credentials: bool,
}

/// Binds a remote event stream to an observable three-state result
pub struct StreamBinding<T> {
    transport: Arc<dyn Transport>,
    tx: watch::Sender<StreamData<T>>,
    /// Latest-value slot; never part of the epoch key
    transform: Arc<RwLock<Option<Transform<T>>>>,
    /// Monotonic epoch counter; tasks compare against it before committing
    epoch: Arc<AtomicU64>,
    key: Option<EpochKey>,
    cancel: CancellationToken,
}

impl<T> StreamBinding<T>
where
    T: FromPayload + Clone + Send + Sync + 'static,
{
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (tx, _rx) = watch::channel(StreamData::pending());
        Self {
            transport,
            tx,
            transform: Arc::new(RwLock::new(None)),
            epoch: Arc::new(AtomicU64::new(0)),
            key: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Apply a configuration.
    ///
    /// The transform is stored unconditionally. The connection is only
    /// reopened when url, event, or with_credentials changed.
    pub fn bind(&mut self, config: BindingConfig<T>) {
        let BindingConfig {
            url,
            event,
            with_credentials,
            transform,
        } = config;

        *self.transform.write() = transform;

        let key = EpochKey {
            url,
            event,
            with_credentials,
        };
        if self.key.as_ref() == Some(&key) {
            return;
        }

        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "Opening stream epoch {} for {} (event: {})",
            epoch, key.url, key.event
        );
        self.tx.send_replace(StreamData::pending());

        let task = EpochTask {
            transport: self.transport.clone(),
            url: key.url.clone(),
            event: key.event.clone(),
            options: ConnectOptions { with_credentials },
            transform: self.transform.clone(),
            tx: self.tx.clone(),
            epochs: self.epoch.clone(),
            epoch,
            cancel: self.cancel.clone(),
        };
        self.key = Some(key);
        tokio::spawn(task.run());
    }

    /// Bare-URL overload: generic message event, raw payload data.
    pub fn bind_url(&mut self, url: impl Into<String>) {
        self.bind(BindingConfig::new(url));
    }

    /// Watch the result across transitions.
    pub fn subscribe(&self) -> watch::Receiver<StreamData<T>> {
        self.tx.subscribe()
    }

    /// The current result.
    pub fn current(&self) -> StreamData<T> {
        self.tx.borrow().clone()
    }

    /// Tear down the current epoch. Idempotent; also runs on drop.
    pub fn close(&mut self) {
        if self.key.take().is_some() {
            info!("Closing stream binding");
        }
        self.cancel.cancel();
    }
}

impl<T> Drop for StreamBinding<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Pump task for one connection epoch
struct EpochTask<T> {
    transport: Arc<dyn Transport>,
    url: String,
    event: String,
    options: ConnectOptions,
    transform: Arc<RwLock<Option<Transform<T>>>>,
    tx: watch::Sender<StreamData<T>>,
    epochs: Arc<AtomicU64>,
    epoch: u64,
    cancel: CancellationToken,
}

impl<T> EpochTask<T>
where
    T: FromPayload + Clone + Send + Sync + 'static,
{
    async fn run(self) {
        let mut stream = match self.transport.open(&self.url, &self.options).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("{}", BindError::Transport(e));
                self.publish(StreamData::error());
                return;
            }
        };

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("Stream epoch {} cancelled", self.epoch);
                    break;
                }
                next = stream.next() => match next {
                    Some(TransportEvent::Message { event, data }) if event == self.event => {
                        self.handle_message(data).await;
                    }
                    Some(TransportEvent::Message { event, .. }) => {
                        debug!("Ignoring event {:?} (listening for {:?})", event, self.event);
                    }
                    Some(TransportEvent::Error) => {
                        warn!("{}", BindError::Transport(anyhow::anyhow!("stream-level error event")));
                        self.publish(StreamData::error());
                    }
                    None => {
                        debug!("Stream epoch {} ended", self.epoch);
                        break;
                    }
                }
            }
        }
    }

    async fn handle_message(&self, data: String) {
        // Read the slot fresh per event so a transform supplied after the
        // connection opened is the one that runs.
        let transform = self.transform.read().clone();
        let Some(transform) = transform else {
            self.publish(StreamData::success(T::from_payload(data)));
            return;
        };

        let fut = transform(data);
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            result = fut => match result {
                Ok(value) => self.publish(StreamData::success(value)),
                Err(e) => {
                    warn!("{}", BindError::Transform(e));
                    self.publish(StreamData::error());
                }
            }
        }
    }

    /// Commit a result only while this epoch is still live.
    ///
    /// The liveness check runs inside `send_if_modified`, under the watch
    /// channel's lock. Teardown publishes the new epoch's pending value
    /// through the same lock after cancelling, so a stale task either sees
    /// the cancellation here or its value is overwritten by that pending
    /// publish; it can never land on top of it.
    fn publish(&self, value: StreamData<T>) {
        self.tx.send_if_modified(|current| {
            if self.cancel.is_cancelled() || self.epochs.load(Ordering::SeqCst) != self.epoch {
                debug!("Discarding result for stale epoch {}", self.epoch);
                return false;
            }
            *current = value;
            true
        });
    }
}
