//! Error taxonomy for stream bindings
//!
//! Both kinds collapse into the error status of the observable result; the
//! distinction survives only in the logs.

use thiserror::Error;

/// Why a binding entered the error state
#[derive(Debug, Error)]
pub enum BindError {
    /// The underlying connection signaled a stream-level error
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),

    /// The caller-supplied transform failed while processing a payload
    #[error("transform failed: {0:#}")]
    Transform(anyhow::Error),
}
