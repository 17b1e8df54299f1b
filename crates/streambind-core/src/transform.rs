//! Payload transforms
//!
//! A transform maps the raw payload string of a stream event to a typed
//! value. It may be asynchronous and it may fail; failure moves the binding
//! into the error state.

use std::sync::Arc;

use futures::future::BoxFuture;

/// Shared transform closure: raw payload in, typed value (or failure) out.
///
/// Stored behind a latest-value slot inside the binding, so the identity of
/// the closure can change on every reconfiguration without reopening the
/// connection.
pub type Transform<T> =
    Arc<dyn Fn(String) -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Wrap a synchronous transform.
pub fn transform<T, F>(f: F) -> Transform<T>
where
    T: Send + 'static,
    F: Fn(String) -> anyhow::Result<T> + Send + Sync + 'static,
{
    Arc::new(move |raw| -> BoxFuture<'static, anyhow::Result<T>> {
        let out = f(raw);
        Box::pin(async move { out })
    })
}

/// Wrap an asynchronous transform.
pub fn async_transform<T, F, Fut>(f: F) -> Transform<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<T>> + Send + 'static,
{
    Arc::new(move |raw| -> BoxFuture<'static, anyhow::Result<T>> { Box::pin(f(raw)) })
}

/// Conversion applied when no transform is installed: the raw payload is
/// used directly as the data value. The caller owns the typing contract.
pub trait FromPayload: Sized {
    fn from_payload(raw: String) -> Self;
}

impl FromPayload for String {
    fn from_payload(raw: String) -> Self {
        raw
    }
}
