//! Demo SSE server
//!
//! Emits `{"random": <f64>}` once per second. An `event=NAME` query parameter
//! makes the stream use a named event instead of the generic message event.

use std::collections::VecDeque;
use std::io::{self, Read};
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server, StatusCode};
use tracing::{info, warn};

pub fn run(port: u16) -> anyhow::Result<()> {
    let server = Server::http(("0.0.0.0", port))
        .map_err(|e| anyhow::anyhow!("failed to bind port {}: {}", port, e))?;
    info!("Server is running on http://localhost:{}", port);

    for request in server.incoming_requests() {
        let event = query_param(request.url(), "event");
        info!(
            "SSE client connected: {} (event: {:?})",
            request.remote_addr().map(|a| a.to_string()).unwrap_or_default(),
            event
        );

        // One blocking thread per stream; each connection ticks forever
        // until the client goes away.
        thread::spawn(move || {
            let headers = [
                ("Content-Type", "text/event-stream"),
                ("Cache-Control", "no-cache"),
                ("Access-Control-Allow-Origin", "*"),
            ]
            .into_iter()
            .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
            .collect();

            let response = Response::new(StatusCode(200), headers, TickStream::new(event), None, None);
            if let Err(e) = request.respond(response) {
                warn!("SSE client disconnected: {}", e);
            }
        });
    }

    Ok(())
}

/// Extract a query parameter from a request path like `/?event=custom-event`.
fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// Blocking reader producing one SSE record per second
struct TickStream {
    event: Option<String>,
    pending: VecDeque<u8>,
}

impl TickStream {
    fn new(event: Option<String>) -> Self {
        Self {
            event,
            pending: VecDeque::new(),
        }
    }
}

impl Read for TickStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            thread::sleep(Duration::from_secs(1));

            let mut record = String::new();
            if let Some(event) = &self.event {
                record.push_str(&format!("event: {}\n", event));
            }
            let data = serde_json::json!({ "random": rand::random::<f64>() * 100000.0 });
            record.push_str(&format!("data: {}\n\n", data));
            self.pending.extend(record.as_bytes());
        }

        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param() {
        assert_eq!(
            query_param("/?event=custom-event", "event"),
            Some("custom-event".to_string())
        );
        assert_eq!(
            query_param("/?foo=bar&event=tick", "event"),
            Some("tick".to_string())
        );
        assert_eq!(query_param("/", "event"), None);
        assert_eq!(query_param("/?event=", "event"), None);
    }

    #[test]
    fn test_tick_stream_emits_named_record() {
        let mut stream = TickStream::new(Some("custom-event".to_string()));
        let mut buf = [0u8; 256];
        let n = stream.read(&mut buf).unwrap();
        let text = String::from_utf8_lossy(&buf[..n]);
        assert!(text.starts_with("event: custom-event\ndata: "));
        assert!(text.ends_with("\n\n"));
    }
}
