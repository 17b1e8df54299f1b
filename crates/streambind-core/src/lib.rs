//! streambind-core - reactive bindings over server-sent event streams
//!
//! Subscribe to a remote text event stream and observe the latest outcome as
//! a three-state result (pending / success / error) without managing the
//! connection lifecycle by hand. Reconfiguring a binding reopens the
//! connection only when the connection identity (url, event name,
//! credentials) actually changed; the payload transform can change freely
//! and is always read fresh.

pub mod binding;
pub mod error;
pub mod result;
pub mod transform;
pub mod transport;

pub use binding::{BindingConfig, StreamBinding};
pub use error::BindError;
pub use result::{Status, StreamData};
pub use transform::{async_transform, transform, FromPayload, Transform};
pub use transport::http::HttpTransport;
pub use transport::{ConnectOptions, EventStream, Transport, TransportEvent};
