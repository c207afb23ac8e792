//! Error type for the CIM session client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-side fault code signalling that a response exceeded the negotiated
/// WS-Management envelope size. Callers react to this specifically (raise
/// the host cap via `set_max_envelope_size`) rather than treating it as a
/// generic protocol failure.
pub const WSMAN_ERROR_MAX_ENVELOPE_SIZE_EXCEEDED: u32 = 0x8033_8048;

/// Error kinds for CIM operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CimErrorKind {
    /// The transport could not be established (unreachable host, refused
    /// connection, authentication failure).
    Connection,
    /// The transport did not respond within the session timeout.
    Timeout,
    /// The host returned a protocol fault.
    Fault,
    /// A remote method invocation failed host-side.
    MethodFailed,
    /// The host responded with something the transport could not decode.
    InvalidResponse,
}

/// CIM operation error. `code` carries the host-side fault code when one
/// was reported, so distinguished conditions stay inspectable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CimError {
    pub kind: CimErrorKind,
    pub message: String,
    #[serde(default)]
    pub code: Option<u32>,
}

impl fmt::Display for CimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(code) = self.code {
            write!(f, " (code 0x{code:08x})")?;
        }
        Ok(())
    }
}

impl std::error::Error for CimError {}

impl CimError {
    pub fn new(kind: CimErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(kind: CimErrorKind, message: impl Into<String>, code: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            code: Some(code),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(CimErrorKind::Connection, message)
    }

    pub fn timeout(op: &str) -> Self {
        Self::new(CimErrorKind::Timeout, format!("operation '{op}' timed out"))
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::new(CimErrorKind::Fault, message)
    }

    pub fn fault_with_code(message: impl Into<String>, code: u32) -> Self {
        Self::with_code(CimErrorKind::Fault, message, code)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(CimErrorKind::InvalidResponse, message)
    }

    /// True when the host rejected the response for exceeding its maximum
    /// envelope size.
    pub fn is_envelope_size_exceeded(&self) -> bool {
        self.code == Some(WSMAN_ERROR_MAX_ENVELOPE_SIZE_EXCEEDED)
    }
}

/// Convenience alias.
pub type CimResult<T> = Result<T, CimError>;
