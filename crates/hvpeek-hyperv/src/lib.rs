//! # HvPeek – Remote Hyper-V Console Peeking
//!
//! Enumerates virtual machines on a Hyper-V host and fetches live
//! thumbnail previews of their console output over a CIM session. Provides:
//!
//! - **Remote Host Model** – connection state machine, locality
//!   classification, management-service resolution, VM enumeration,
//!   thumbnail retrieval, and the host-side envelope-size workaround
//! - **Image Assembly** – packed 16-bit framebuffer description (row
//!   stride, length validation) for the returned thumbnail bytes
//!
//! Rendering, settings persistence, and the CIM wire protocol are out of
//! scope; the model drives everything through `hvpeek-cim`.

pub mod error;
pub mod locality;
pub mod image;
pub mod model;
