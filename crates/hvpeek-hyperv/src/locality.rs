//! Local-versus-remote target classification.
//!
//! The underlying transport forbids explicit credentials for loop-back
//! connections, so connect targets naming this machine must be recognized
//! before the session is opened.

/// Identity of the machine this process runs on, captured once so the
/// classification is deterministic for a model's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    pub domain: String,
    pub machine_name: String,
    pub host_name: String,
}

impl LocalIdentity {
    pub fn new(
        domain: impl Into<String>,
        machine_name: impl Into<String>,
        host_name: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            machine_name: machine_name.into(),
            host_name: host_name.into(),
        }
    }

    /// Detect the current machine's identity from the environment.
    pub fn detect() -> Self {
        let host_name = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_default();
        let machine_name = std::env::var("COMPUTERNAME").unwrap_or_else(|_| host_name.clone());
        let domain = std::env::var("USERDOMAIN").unwrap_or_default();

        Self {
            domain,
            machine_name,
            host_name,
        }
    }

    /// True when the (domain, hostname) pair names this machine: the domain
    /// is blank, ".", or our own domain, AND the hostname is blank, ".", or
    /// our own machine/host name. All comparisons are case-insensitive.
    pub fn is_local_target(&self, domain: &str, hostname: &str) -> bool {
        let no_domain = domain.trim().is_empty()
            || domain == "."
            || domain.eq_ignore_ascii_case(&self.domain);
        let no_target_machine = hostname.trim().is_empty()
            || hostname == "."
            || hostname.eq_ignore_ascii_case(&self.machine_name)
            || hostname.eq_ignore_ascii_case(&self.host_name);

        no_domain && no_target_machine
    }
}
