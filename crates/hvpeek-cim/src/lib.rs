//! # HvPeek – CIM Session Client
//!
//! Client surface for talking to a remote (or local) WS-Management/CIM
//! host. The wire protocol itself is a consumed capability: callers plug
//! in a [`session::CimConnector`] that produces [`session::CimTransport`]
//! objects, and everything above that — session lifecycle, WQL query
//! construction, remote method invocation, the remote-process helpers —
//! lives here.
//!
//! - **Sessions** – create / query / invoke against a named host, with
//!   per-session options (operation timeout, client max envelope size)
//! - **Extensions** – `select` / `select_all` in the virtualization
//!   namespace, remote process creation in the base namespace, and the
//!   host-side MaxEnvelopeSizekb workaround
//! - **WQL** – a small query builder with opt-in literal escaping

pub mod types;
pub mod error;
pub mod session;
pub mod ext;
pub mod wql;
