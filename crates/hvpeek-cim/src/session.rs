//! Session lifecycle over a pluggable CIM transport.
//!
//! The wire protocol is a consumed capability: a [`CimConnector`] opens a
//! [`CimTransport`] for a host, and [`CimSession`] owns that transport for
//! its lifetime. Dropping the session releases the transport, so a failed
//! or abandoned connection can never leak a half-open channel.

use crate::error::CimResult;
use crate::types::{
    CimCredential, CimInstance, CimMethodParams, CimMethodResult, CimSessionOptions,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use std::fmt;
use uuid::Uuid;

/// Query dialect used for instance selection.
pub const WQL_DIALECT: &str = "WQL";

/// An open channel to a management host: the query and method-invocation
/// primitives of the consumed CIM capability.
#[async_trait]
pub trait CimTransport: Send {
    /// Execute a selection query in a namespace, returning all matching
    /// instances. The sequence is finite and fully materialized.
    async fn query_instances(
        &mut self,
        namespace: &str,
        dialect: &str,
        query: &str,
    ) -> CimResult<Vec<CimInstance>>;

    /// Invoke a named method on a managed instance (or a bare class target
    /// for static methods).
    async fn invoke_method(
        &mut self,
        target: &CimInstance,
        method_name: &str,
        params: &CimMethodParams,
    ) -> CimResult<CimMethodResult>;
}

/// Session-creation primitive of the consumed CIM capability.
///
/// `host = None` targets the local machine; implementations must refuse
/// explicit credentials for loop-back connections.
#[async_trait]
pub trait CimConnector: Send + Sync {
    async fn connect(
        &self,
        host: Option<&str>,
        credential: Option<&CimCredential>,
        options: &CimSessionOptions,
    ) -> CimResult<Box<dyn CimTransport>>;
}

/// An open management session. Exclusively owns its transport; all remote
/// operations go through `&mut self`, so callers serialize access by
/// construction.
pub struct CimSession {
    id: String,
    host: Option<String>,
    options: CimSessionOptions,
    transport: Box<dyn CimTransport>,
    connected_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl CimSession {
    /// Open a session. The credential is handed to the connector once and
    /// not retained.
    pub async fn create(
        connector: &dyn CimConnector,
        host: Option<&str>,
        credential: Option<&CimCredential>,
        options: CimSessionOptions,
    ) -> CimResult<Self> {
        let id = Uuid::new_v4().to_string();
        debug!(
            "creating CIM session {} to {} (timeout {:?}, max envelope {} bytes)",
            id,
            host.unwrap_or("localhost"),
            options.timeout,
            options.max_envelope_size,
        );

        let transport = connector.connect(host, credential, &options).await?;

        let now = Utc::now();
        Ok(Self {
            id,
            host: host.map(str::to_string),
            options,
            transport,
            connected_at: now,
            last_activity: now,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target host, `None` for the local machine.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn is_local(&self) -> bool {
        self.host.is_none()
    }

    pub fn options(&self) -> &CimSessionOptions {
        &self.options
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Execute a WQL query in the given namespace.
    pub async fn query_instances(
        &mut self,
        namespace: &str,
        query: &str,
    ) -> CimResult<Vec<CimInstance>> {
        debug!("session {}: query [{}] {}", self.id, namespace, query);
        self.last_activity = Utc::now();
        self.transport
            .query_instances(namespace, WQL_DIALECT, query)
            .await
    }

    /// Invoke a remote method on a managed instance.
    pub async fn invoke_method(
        &mut self,
        target: &CimInstance,
        method_name: &str,
        params: &CimMethodParams,
    ) -> CimResult<CimMethodResult> {
        debug!(
            "session {}: invoke {}.{} ({} params)",
            self.id,
            target.class_name,
            method_name,
            params.len()
        );
        self.last_activity = Utc::now();
        self.transport.invoke_method(target, method_name, params).await
    }
}

impl fmt::Debug for CimSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CimSession")
            .field("id", &self.id)
            .field("host", &self.host)
            .field("options", &self.options)
            .field("connected_at", &self.connected_at)
            .field("last_activity", &self.last_activity)
            .finish_non_exhaustive()
    }
}
