//! Streaming connection transports
//!
//! The binding consumes the connection capability through the [`Transport`]
//! trait: open a URL, get back a stream of named events and transport-level
//! errors. Closing a connection is dropping the stream; implementations must
//! detach everything when the stream is dropped.

use std::pin::Pin;

use futures::Stream;

pub mod http;
pub mod wire;

#[cfg(test)]
pub(crate) mod mock;

/// Options applied when opening a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Send credentials (cookies) with the stream request
    pub with_credentials: bool,
}

/// What a transport delivers while a connection is open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A named stream event carrying a text payload
    Message { event: String, data: String },
    /// A stream-level error (network failure, broken body)
    Error,
}

/// Stream of transport events for one connection
pub type EventStream = Pin<Box<dyn Stream<Item = TransportEvent> + Send>>;

/// A streaming connection primitive
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Open a connection and return its event stream.
    ///
    /// A failure to establish the stream (e.g. a non-2xx response) is
    /// returned as an error here; failures after establishment arrive as
    /// [`TransportEvent::Error`] items.
    async fn open(&self, url: &str, options: &ConnectOptions) -> anyhow::Result<EventStream>;
}
