//! HTTP transport over reqwest
//!
//! Opens a GET request with `Accept: text/event-stream` and pumps the
//! response body through the wire decoder into an event channel. Dropping
//! the returned stream drops the channel, which stops the pump task and
//! closes the underlying connection.

use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use super::wire::SseDecoder;
use super::{ConnectOptions, EventStream, Transport, TransportEvent};

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Transport backed by a persistent HTTP response body
pub struct HttpTransport {
    plain: reqwest::Client,
    /// Cookie-store-enabled client, used when credentials are requested
    credentialed: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            plain: reqwest::Client::builder().build()?,
            credentialed: reqwest::Client::builder().cookie_store(true).build()?,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn open(&self, url: &str, options: &ConnectOptions) -> anyhow::Result<EventStream> {
        let client = if options.with_credentials {
            &self.credentialed
        } else {
            &self.plain
        };

        info!(
            "Opening SSE connection to {} (with_credentials: {})",
            url, options.with_credentials
        );
        let response = client
            .get(url)
            .header(ACCEPT, EVENT_STREAM_MIME)
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with(EVENT_STREAM_MIME) {
            warn!(
                "SSE endpoint {} responded with content-type {:?}",
                url, content_type
            );
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut decoder = SseDecoder::new();
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(bytes) => {
                        for event in decoder.push_chunk(&bytes) {
                            let message = TransportEvent::Message {
                                event: event.event,
                                data: event.data,
                            };
                            if tx.send(message).is_err() {
                                // Receiver dropped: connection closed
                                debug!("SSE receiver dropped, stopping pump");
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("SSE body error: {}", e);
                        let _ = tx.send(TransportEvent::Error);
                        return;
                    }
                }
            }
            info!("SSE stream ended");
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
