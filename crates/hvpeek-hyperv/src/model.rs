//! Remote host model: the connection state machine and VM operations.
//!
//! A model owns at most one session to one host. Connection state is
//! derived from what is actually held — a session alone means the connect
//! is still resolving the management service; a session plus a resolved
//! service handle means connected. The session and the handle are only
//! meaningful together and are always released together.

use crate::error::{HyperVError, HyperVResult};
use crate::locality::LocalIdentity;
use hvpeek_cim::ext::NAMESPACE_VIRTUALIZATION;
use hvpeek_cim::session::{CimConnector, CimSession};
use hvpeek_cim::types::{
    CimCredential, CimInstance, CimMethodParams, CimSessionOptions, DEFAULT_MAX_ENVELOPE_SIZE,
    DEFAULT_TIMEOUT,
};
use hvpeek_cim::wql::WqlBuilder;
use log::{debug, info};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// CIM class names
const MSVM_VIRTUAL_SYSTEM_MANAGEMENT_SERVICE: &str = "Msvm_VirtualSystemManagementService";
const MSVM_COMPUTER_SYSTEM: &str = "Msvm_ComputerSystem";

// Property names
const ELEMENT_NAME: &str = "ElementName";
const CAPTION: &str = "Caption";

// Method names
const GET_VIRTUAL_SYSTEM_THUMBNAIL_IMAGE: &str = "GetVirtualSystemThumbnailImage";

// Values
const VIRTUAL_MACHINE_CAPTION: &str = "Virtual Machine";

// Argument names
const TARGET_SYSTEM: &str = "TargetSystem";
const WIDTH_PIXELS: &str = "WidthPixels";
const HEIGHT_PIXELS: &str = "HeightPixels";
const IMAGE_DATA: &str = "ImageData";

/// Connection state of a remote host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Disconnected,
    /// Session open, management service handle not yet resolved. Transient:
    /// a connect call either completes to `Connected` or tears back down to
    /// `Disconnected` before returning.
    Connecting,
    Connected,
}

/// Configuration for a remote host model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Connect / operation timeout handed to the session.
    pub timeout: Duration,
    /// Client-side maximum envelope size in bytes.
    pub max_envelope_size: usize,
    /// Escape VM names before substituting them into WQL filters. Disable
    /// only for byte-faithful query text in a trusted environment.
    pub escape_vm_names: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_envelope_size: DEFAULT_MAX_ENVELOPE_SIZE,
            escape_vm_names: true,
        }
    }
}

/// Model of one remote (or local) Hyper-V host.
///
/// Not internally synchronized: all operations take `&mut self`, so one
/// in-flight management operation at a time is enforced by construction.
pub struct RemoteHyperVHost {
    connector: Box<dyn CimConnector>,
    identity: LocalIdentity,
    config: HostConfig,
    session: Option<CimSession>,
    service: Option<CimInstance>,
    is_local: bool,
}

impl RemoteHyperVHost {
    pub fn new(connector: Box<dyn CimConnector>) -> Self {
        Self::with_config(connector, HostConfig::default())
    }

    pub fn with_config(connector: Box<dyn CimConnector>, config: HostConfig) -> Self {
        Self {
            connector,
            identity: LocalIdentity::detect(),
            config,
            session: None,
            service: None,
            is_local: false,
        }
    }

    /// Replace the detected machine identity (test seam).
    pub fn with_identity(mut self, identity: LocalIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Whether the last connect targeted the local machine.
    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Derived connection state: session + service handle ⇒ connected,
    /// session alone ⇒ connecting, neither ⇒ disconnected.
    pub fn connection_state(&self) -> ConnectionState {
        match (&self.session, &self.service) {
            (Some(_), Some(_)) => ConnectionState::Connected,
            (Some(_), None) => ConnectionState::Connecting,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Connect to the host named by `(domain, hostname)`. Returns false
    /// without touching anything when already connected.
    ///
    /// Targets naming this machine are connected locally, and the transport
    /// forbids explicit credentials for loop-back, so the credential is
    /// only attached for remote targets.
    pub async fn connect(
        &mut self,
        domain: &str,
        hostname: &str,
        username: &str,
        password: SecretString,
    ) -> HyperVResult<bool> {
        if self.connection_state() == ConnectionState::Connected {
            return Ok(false);
        }

        // A reconnect after a failed attempt starts from a clean slate.
        self.session = None;
        self.service = None;

        self.is_local = self.identity.is_local_target(domain, hostname);
        info!(
            "connecting to {} ({})",
            if hostname.trim().is_empty() { "." } else { hostname },
            if self.is_local { "local" } else { "remote" },
        );

        let credential = if self.is_local {
            None
        } else {
            let cred_domain = Some(domain.trim())
                .filter(|d| !d.is_empty() && *d != ".")
                .map(str::to_string);
            Some(CimCredential::new(username, cred_domain, password))
        };

        let options = CimSessionOptions {
            timeout: self.config.timeout,
            max_envelope_size: self.config.max_envelope_size,
        };
        let host = if self.is_local { None } else { Some(hostname) };

        let session =
            CimSession::create(self.connector.as_ref(), host, credential.as_ref(), options)
                .await?;

        // Holding the session before the service handle resolves is what
        // makes the transitional Connecting state representable.
        let session = self.session.insert(session);

        let service = match session.select_all(MSVM_VIRTUAL_SYSTEM_MANAGEMENT_SERVICE).await {
            Ok(instances) => instances.into_iter().next(),
            Err(e) => {
                self.session = None;
                return Err(e.into());
            }
        };

        let Some(service) = service else {
            self.session = None;
            return Err(HyperVError::connection(format!(
                "no {MSVM_VIRTUAL_SYSTEM_MANAGEMENT_SERVICE} instance on host"
            )));
        };

        self.service = Some(service);
        info!("connected");
        Ok(true)
    }

    /// Release the session and the management service handle. Returns false
    /// when already disconnected.
    pub fn disconnect(&mut self) -> bool {
        if self.connection_state() == ConnectionState::Disconnected {
            return false;
        }

        self.session = None;
        self.service = None;
        info!("disconnected");
        true
    }

    /// Names of all virtual machines on the host. Yields an empty list
    /// rather than an error when no session is open, so periodic refresh
    /// loops degrade quietly.
    pub async fn virtual_machine_list(&mut self) -> HyperVResult<Vec<String>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Vec::new());
        };

        let query = WqlBuilder::select(MSVM_COMPUTER_SYSTEM)
            .fields(&[ELEMENT_NAME])
            .where_eq(CAPTION, VIRTUAL_MACHINE_CAPTION)
            .build();
        let systems = session
            .query_instances(NAMESPACE_VIRTUALIZATION, &query)
            .await?;

        let names: Vec<String> = systems
            .iter()
            .filter_map(|s| s.string_property(ELEMENT_NAME))
            .map(str::to_string)
            .collect();
        debug!("enumerated {} virtual machines", names.len());
        Ok(names)
    }

    /// Fetch a console thumbnail for the named VM as raw packed pixels.
    pub async fn virtual_machine_preview(
        &mut self,
        name: &str,
        width: u16,
        height: u16,
    ) -> HyperVResult<Vec<u8>> {
        let (Some(session), Some(service)) = (self.session.as_mut(), self.service.as_ref())
        else {
            return Err(HyperVError::not_connected());
        };

        let lookup = WqlBuilder::select(MSVM_COMPUTER_SYSTEM);
        let lookup = if self.config.escape_vm_names {
            lookup.where_eq(ELEMENT_NAME, name)
        } else {
            lookup.where_eq_raw(ELEMENT_NAME, name)
        };
        let vm = session
            .query_instances(NAMESPACE_VIRTUALIZATION, &lookup.build())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HyperVError::vm_not_found(name))?;

        let params = CimMethodParams::new()
            .reference(TARGET_SYSTEM, vm)
            .u16(WIDTH_PIXELS, width)
            .u16(HEIGHT_PIXELS, height);
        let mut result = session
            .invoke_method(service, GET_VIRTUAL_SYSTEM_THUMBNAIL_IMAGE, &params)
            .await?;

        match result.take_bytes(IMAGE_DATA) {
            Some(data) if !data.is_empty() => Ok(data),
            _ => Err(HyperVError::no_image_data(name)),
        }
    }

    /// Raise the host-side envelope cap. No-op (false) unless connected;
    /// true when the remote command was launched successfully.
    pub async fn set_max_envelope_size(&mut self, size_kb: u32) -> HyperVResult<bool> {
        if self.connection_state() != ConnectionState::Connected {
            return Ok(false);
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };

        let return_code = session.set_max_envelope_size(size_kb).await?;
        Ok(return_code == 0)
    }
}
