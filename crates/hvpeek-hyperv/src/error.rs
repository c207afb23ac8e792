//! Error types for remote Hyper-V operations.

use hvpeek_cim::error::{CimError, CimErrorKind, WSMAN_ERROR_MAX_ENVELOPE_SIZE_EXCEEDED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kinds for remote Hyper-V operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HyperVErrorKind {
    /// An operation requiring a connection ran against a disconnected host.
    NotConnected,
    /// No virtual machine with the requested name exists on the host.
    VmNotFound,
    /// The thumbnail call reported success but returned no usable image data.
    NoImageData,
    /// A preview buffer was inconsistent with its declared dimensions.
    ImageFormat,
    /// The session to the host could not be established.
    Connection,
    /// The underlying management session failed during a query or invoke.
    Protocol,
}

/// Remote Hyper-V error. `code` carries the host-side fault code when the
/// failure originated in the protocol layer, so the envelope-size condition
/// stays distinguishable at the domain level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperVError {
    pub kind: HyperVErrorKind,
    pub message: String,
    #[serde(default)]
    pub code: Option<u32>,
}

impl fmt::Display for HyperVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(code) = self.code {
            write!(f, " (code 0x{code:08x})")?;
        }
        Ok(())
    }
}

impl std::error::Error for HyperVError {}

impl HyperVError {
    pub fn new(kind: HyperVErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
        }
    }

    pub fn not_connected() -> Self {
        Self::new(HyperVErrorKind::NotConnected, "not connected")
    }

    pub fn vm_not_found(name: &str) -> Self {
        Self::new(
            HyperVErrorKind::VmNotFound,
            format!("failed to find virtual machine named {name}"),
        )
    }

    pub fn no_image_data(name: &str) -> Self {
        Self::new(
            HyperVErrorKind::NoImageData,
            format!("failed to get image data for {name}"),
        )
    }

    pub fn image_format(message: impl Into<String>) -> Self {
        Self::new(HyperVErrorKind::ImageFormat, message)
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(HyperVErrorKind::Connection, message)
    }

    /// True when the host rejected a response for exceeding its maximum
    /// envelope size — the caller's cue to raise the host cap and retry.
    pub fn is_envelope_size_exceeded(&self) -> bool {
        self.code == Some(WSMAN_ERROR_MAX_ENVELOPE_SIZE_EXCEEDED)
    }
}

impl From<CimError> for HyperVError {
    fn from(e: CimError) -> Self {
        let kind = match e.kind {
            CimErrorKind::Connection | CimErrorKind::Timeout => HyperVErrorKind::Connection,
            _ => HyperVErrorKind::Protocol,
        };
        Self {
            kind,
            message: e.message,
            code: e.code,
        }
    }
}

/// Convenience alias.
pub type HyperVResult<T> = Result<T, HyperVError>;
