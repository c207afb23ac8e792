//! Shared types for the CIM session client.
//!
//! Covers the credential/option objects handed to the transport capability,
//! the property-bag instance type returned by queries, and method
//! parameter/result containers for remote invocations.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default operation timeout applied to a new session.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default client-side maximum envelope size in bytes (1 MiB).
pub const DEFAULT_MAX_ENVELOPE_SIZE: usize = 1024 * 1024;

// ─── Values & Instances ──────────────────────────────────────────────

/// The finite set of value shapes this client moves over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CimValue {
    Null,
    Bool(bool),
    U16(u16),
    U32(u32),
    String(String),
    Bytes(Vec<u8>),
    /// By-reference parameter pointing at another managed instance.
    Reference(Box<CimInstance>),
}

impl CimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CimValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            CimValue::U16(v) => Some(u32::from(*v)),
            CimValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            CimValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CimValue::Null)
    }
}

/// A managed object instance: class name, owning namespace, and a property
/// bag. Dynamic lookup is deliberately narrowed to the typed accessors
/// below — callers read a known, finite set of property names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CimInstance {
    pub class_name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    properties: HashMap<String, CimValue>,
}

impl CimInstance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            namespace: None,
            properties: HashMap::new(),
        }
    }

    /// An instance bound to a namespace, e.g. a bare class target for a
    /// static method invocation.
    pub fn new_in(class_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            namespace: Some(namespace.into()),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: CimValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&CimValue> {
        self.properties.get(name)
    }

    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(CimValue::as_str)
    }

    pub fn u32_property(&self, name: &str) -> Option<u32> {
        self.properties.get(name).and_then(CimValue::as_u32)
    }

    pub fn bytes_property(&self, name: &str) -> Option<&[u8]> {
        self.properties.get(name).and_then(CimValue::as_bytes)
    }
}

// ─── Method Invocation ───────────────────────────────────────────────

/// Ordered, named in-parameters for a remote method invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CimMethodParams {
    params: Vec<(String, CimValue)>,
}

impl CimMethodParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, name: impl Into<String>, value: CimValue) -> Self {
        self.params.push((name.into(), value));
        self
    }

    pub fn string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, CimValue::String(value.into()))
    }

    pub fn u16(self, name: impl Into<String>, value: u16) -> Self {
        self.push(name, CimValue::U16(value))
    }

    pub fn reference(self, name: impl Into<String>, target: CimInstance) -> Self {
        self.push(name, CimValue::Reference(Box::new(target)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CimValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&CimValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Result of a remote method invocation: a numeric return code plus named
/// out-parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CimMethodResult {
    pub return_value: u32,
    #[serde(default)]
    pub out_parameters: HashMap<String, CimValue>,
}

impl CimMethodResult {
    pub fn new(return_value: u32) -> Self {
        Self {
            return_value,
            out_parameters: HashMap::new(),
        }
    }

    pub fn with_out(mut self, name: impl Into<String>, value: CimValue) -> Self {
        self.out_parameters.insert(name.into(), value);
        self
    }

    pub fn out_u32(&self, name: &str) -> Option<u32> {
        self.out_parameters.get(name).and_then(CimValue::as_u32)
    }

    /// Takes a byte-buffer out-parameter, leaving the slot empty. Returns
    /// `None` when the parameter is absent or not a byte buffer.
    pub fn take_bytes(&mut self, name: &str) -> Option<Vec<u8>> {
        match self.out_parameters.remove(name) {
            Some(CimValue::Bytes(b)) => Some(b),
            Some(other) => {
                // Wrong type: put it back so repeated inspection still sees it.
                self.out_parameters.insert(name.to_string(), other);
                None
            }
            None => None,
        }
    }
}

// ─── Credentials & Options ───────────────────────────────────────────

/// Credentials for a remote host. The password is held behind
/// [`SecretString`] and is only exposed to the transport at session
/// creation; sessions never retain it.
#[derive(Debug, Clone)]
pub struct CimCredential {
    pub username: String,
    pub domain: Option<String>,
    pub password: SecretString,
}

impl CimCredential {
    pub fn new(
        username: impl Into<String>,
        domain: Option<String>,
        password: SecretString,
    ) -> Self {
        Self {
            username: username.into(),
            domain,
            password,
        }
    }
}

/// Per-session options negotiated at creation time. `max_envelope_size` is
/// the *client-side* cap; the host enforces its own independent cap (see
/// the `set_max_envelope_size` extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CimSessionOptions {
    pub timeout: Duration,
    pub max_envelope_size: usize,
}

impl Default for CimSessionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_envelope_size: DEFAULT_MAX_ENVELOPE_SIZE,
        }
    }
}

/// Outcome of creating a process on the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProcess {
    pub return_code: u32,
    #[serde(default)]
    pub process_id: Option<u32>,
}

impl RemoteProcess {
    pub fn succeeded(&self) -> bool {
        self.return_code == 0
    }
}
