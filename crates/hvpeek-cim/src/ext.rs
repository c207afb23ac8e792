//! Convenience operations layered on [`CimSession`].
//!
//! Two namespaces are in play and the split is load-bearing: VM discovery
//! and thumbnailing run in the virtualization namespace, while remote
//! process control runs in the base system namespace.

use crate::error::CimResult;
use crate::session::CimSession;
use crate::types::{CimInstance, CimMethodParams, RemoteProcess};
use log::debug;

/// Base system namespace (process management).
pub const NAMESPACE_CIMV2: &str = r"root\cimv2";

/// Virtualization namespace (VM objects, thumbnail method).
pub const NAMESPACE_VIRTUALIZATION: &str = r"root\virtualization\v2";

const WILDCARD: &str = "*";

const WIN32_PROCESS: &str = "Win32_Process";
const WIN32_PROCESS_CREATE: &str = "Create";
const WIN32_PROCESS_COMMAND_LINE: &str = "CommandLine";
const WIN32_PROCESS_PROCESS_ID: &str = "ProcessId";

impl CimSession {
    /// `select * from {from_expr}` in the virtualization namespace.
    pub async fn select_all(&mut self, from_expr: &str) -> CimResult<Vec<CimInstance>> {
        self.select(WILDCARD, from_expr).await
    }

    /// Projected selection in the virtualization namespace. `from_expr` is
    /// a class name optionally followed by a `where` clause.
    pub async fn select(&mut self, what: &str, from_expr: &str) -> CimResult<Vec<CimInstance>> {
        let query = format!("select {what} from {from_expr}");
        self.query_instances(NAMESPACE_VIRTUALIZATION, &query).await
    }

    /// Create a process on the host via `Win32_Process.Create` in the base
    /// namespace.
    pub async fn execute_remote_process(
        &mut self,
        command_line: &str,
    ) -> CimResult<RemoteProcess> {
        debug!("session {}: remote process: {}", self.id(), command_line);

        let target = CimInstance::new_in(WIN32_PROCESS, NAMESPACE_CIMV2);
        let params = CimMethodParams::new().string(WIN32_PROCESS_COMMAND_LINE, command_line);
        let result = self
            .invoke_method(&target, WIN32_PROCESS_CREATE, &params)
            .await?;

        Ok(RemoteProcess {
            return_code: result.return_value,
            process_id: result.out_u32(WIN32_PROCESS_PROCESS_ID),
        })
    }

    /// Raise the *host-side* WS-Management envelope cap by running a
    /// `Set-Item` against the WSMan configuration path on the target.
    ///
    /// The cap negotiated at session creation is a client-side limit only;
    /// the host enforces its own threshold, which can only be changed
    /// out-of-band like this. Returns the process-creation return code
    /// (0 = the command was launched).
    pub async fn set_max_envelope_size(&mut self, size_kb: u32) -> CimResult<u32> {
        let command = format!(
            r"powershell Set-Item -Path WSMan:\localhost\MaxEnvelopeSizekb -Value {size_kb}"
        );
        let process = self.execute_remote_process(&command).await?;
        Ok(process.return_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CimResult;
    use crate::session::{CimConnector, CimTransport};
    use crate::types::{CimCredential, CimMethodResult, CimSessionOptions, CimValue};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        queries: Vec<(String, String)>,
        invocations: Vec<(String, Option<String>, String, CimMethodParams)>,
    }

    struct RecordingTransport {
        state: Arc<Mutex<Recorded>>,
    }

    #[async_trait]
    impl CimTransport for RecordingTransport {
        async fn query_instances(
            &mut self,
            namespace: &str,
            _dialect: &str,
            query: &str,
        ) -> CimResult<Vec<CimInstance>> {
            self.state
                .lock()
                .unwrap()
                .queries
                .push((namespace.to_string(), query.to_string()));
            Ok(Vec::new())
        }

        async fn invoke_method(
            &mut self,
            target: &CimInstance,
            method_name: &str,
            params: &CimMethodParams,
        ) -> CimResult<CimMethodResult> {
            self.state.lock().unwrap().invocations.push((
                target.class_name.clone(),
                target.namespace.clone(),
                method_name.to_string(),
                params.clone(),
            ));
            Ok(CimMethodResult::new(0).with_out("ProcessId", CimValue::U32(4242)))
        }
    }

    struct RecordingConnector {
        state: Arc<Mutex<Recorded>>,
    }

    #[async_trait]
    impl CimConnector for RecordingConnector {
        async fn connect(
            &self,
            _host: Option<&str>,
            _credential: Option<&CimCredential>,
            _options: &CimSessionOptions,
        ) -> CimResult<Box<dyn CimTransport>> {
            Ok(Box::new(RecordingTransport {
                state: Arc::clone(&self.state),
            }))
        }
    }

    async fn session() -> (CimSession, Arc<Mutex<Recorded>>) {
        let state = Arc::new(Mutex::new(Recorded::default()));
        let connector = RecordingConnector {
            state: Arc::clone(&state),
        };
        let session =
            CimSession::create(&connector, Some("hv01"), None, CimSessionOptions::default())
                .await
                .unwrap();
        (session, state)
    }

    #[tokio::test]
    async fn test_select_all_targets_virtualization_namespace() {
        let (mut session, state) = session().await;
        session
            .select_all("Msvm_VirtualSystemManagementService")
            .await
            .unwrap();

        let recorded = state.lock().unwrap();
        assert_eq!(
            recorded.queries[0],
            (
                NAMESPACE_VIRTUALIZATION.to_string(),
                "select * from Msvm_VirtualSystemManagementService".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_select_projects_fields() {
        let (mut session, state) = session().await;
        session
            .select(
                "ElementName",
                "Msvm_ComputerSystem where Caption = 'Virtual Machine'",
            )
            .await
            .unwrap();

        let recorded = state.lock().unwrap();
        assert_eq!(
            recorded.queries[0].1,
            "select ElementName from Msvm_ComputerSystem where Caption = 'Virtual Machine'"
        );
    }

    #[tokio::test]
    async fn test_execute_remote_process_uses_base_namespace() {
        let (mut session, state) = session().await;
        let process = session.execute_remote_process("notepad.exe").await.unwrap();
        assert!(process.succeeded());
        assert_eq!(process.process_id, Some(4242));

        let recorded = state.lock().unwrap();
        let (class, namespace, method, params) = &recorded.invocations[0];
        assert_eq!(class, "Win32_Process");
        assert_eq!(namespace.as_deref(), Some(NAMESPACE_CIMV2));
        assert_eq!(method, "Create");
        assert_eq!(
            params.get("CommandLine"),
            Some(&CimValue::String("notepad.exe".into()))
        );
    }

    #[tokio::test]
    async fn test_set_max_envelope_size_command_shape() {
        let (mut session, state) = session().await;
        let code = session.set_max_envelope_size(2048).await.unwrap();
        assert_eq!(code, 0);

        let recorded = state.lock().unwrap();
        let (_, _, _, params) = &recorded.invocations[0];
        let command = params.get("CommandLine").and_then(CimValue::as_str).unwrap();
        assert_eq!(
            command,
            r"powershell Set-Item -Path WSMan:\localhost\MaxEnvelopeSizekb -Value 2048"
        );
    }
}
