//! Observable result model for a stream binding
//!
//! Three mutually exclusive states: pending, success, error. A binding always
//! holds exactly one current `StreamData` value and every transition fully
//! replaces it.

use serde::Serialize;

/// Connection outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Connection open, no message or error observed yet
    Pending,
    /// Most recent payload transformed successfully
    Success,
    /// Transport-level error, or the transform failed
    Error,
}

/// The value a binding exposes to its consumers.
///
/// The boolean flags are redundant with `status` and always agree with it;
/// the constructors below are the only producers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamData<T> {
    pub status: Status,
    pub data: Option<T>,
    pub is_pending: bool,
    pub is_success: bool,
    pub is_error: bool,
}

impl<T> StreamData<T> {
    /// State of a freshly opened connection epoch.
    pub fn pending() -> Self {
        Self {
            status: Status::Pending,
            data: None,
            is_pending: true,
            is_success: false,
            is_error: false,
        }
    }

    /// A successfully received (and transformed) payload.
    pub fn success(value: T) -> Self {
        Self {
            status: Status::Success,
            data: Some(value),
            is_pending: false,
            is_success: true,
            is_error: false,
        }
    }

    /// Transport or transform failure. Carries no data.
    pub fn error() -> Self {
        Self {
            status: Status::Error,
            data: None,
            is_pending: false,
            is_success: false,
            is_error: true,
        }
    }
}
