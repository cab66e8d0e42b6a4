//! Seam to the embedded mock-server engine. The engine itself (HTTP serving,
//! request matching, fixture file format) lives outside this crate; the pool
//! only needs the six operations below from whatever implementation backs it.

use crate::errors::WireplayError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One running mock-server instance, bound to a port and a backing directory.
pub trait MockServer: Send {
    /// Forward unmatched traffic to `target` (recording mode only).
    fn proxy_to(&mut self, target: &str) -> Result<(), WireplayError>;
    fn start_recording(&mut self) -> Result<(), WireplayError>;
    /// Finalize and flush any pending fixtures to the backing directory.
    fn stop_recording(&mut self) -> Result<(), WireplayError>;
    fn start(&mut self) -> Result<(), WireplayError>;
    fn stop(&mut self) -> Result<(), WireplayError>;
}

pub trait MockServerFactory: Send + Sync {
    fn bind(
        &self,
        port: u16,
        backing_dir: &Path,
    ) -> Result<Box<dyn MockServer>, WireplayError>;
}

// ── Scriptable fake ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct FakeServerState {
    pub port: u16,
    pub backing_dir: PathBuf,
    pub proxy_target: Option<String>,
    pub started: bool,
    pub stopped: bool,
    pub recording: bool,
    pub recording_stopped: bool,
}

/// Fake engine for tests: every bound server shares its state with the
/// factory so assertions can inspect it after the pool has consumed the
/// boxed handle.
#[derive(Default, Clone)]
pub struct FakeMockServerFactory {
    servers: Arc<Mutex<Vec<Arc<Mutex<FakeServerState>>>>>,
    fail_bind_on_port: Arc<Mutex<Option<u16>>>,
    fail_next_stop: Arc<Mutex<bool>>,
}

impl FakeMockServerFactory {
    /// Make `bind` fail for `port`, simulating an engine that cannot listen.
    pub fn fail_bind_on_port(&self, port: u16) {
        *self.fail_bind_on_port.lock().expect("fail bind lock") = Some(port);
    }

    /// Make the next `stop` call fail, simulating an unclean shutdown.
    pub fn fail_next_stop(&self) {
        *self.fail_next_stop.lock().expect("fail stop lock") = true;
    }

    pub fn bound_servers(&self) -> Vec<FakeServerState> {
        self.servers
            .lock()
            .expect("servers lock")
            .iter()
            .map(|state| state.lock().expect("server state lock").clone())
            .collect()
    }
}

impl MockServerFactory for FakeMockServerFactory {
    fn bind(
        &self,
        port: u16,
        backing_dir: &Path,
    ) -> Result<Box<dyn MockServer>, WireplayError> {
        if *self.fail_bind_on_port.lock().expect("fail bind lock") == Some(port) {
            return Err(WireplayError::Server(format!(
                "failed to bind port {port}"
            )));
        }
        let state = Arc::new(Mutex::new(FakeServerState {
            port,
            backing_dir: backing_dir.to_path_buf(),
            ..FakeServerState::default()
        }));
        self.servers
            .lock()
            .expect("servers lock")
            .push(Arc::clone(&state));
        Ok(Box::new(FakeMockServer {
            state,
            fail_next_stop: Arc::clone(&self.fail_next_stop),
        }))
    }
}

pub struct FakeMockServer {
    state: Arc<Mutex<FakeServerState>>,
    fail_next_stop: Arc<Mutex<bool>>,
}

impl MockServer for FakeMockServer {
    fn proxy_to(&mut self, target: &str) -> Result<(), WireplayError> {
        self.state.lock().expect("server state lock").proxy_target = Some(target.to_string());
        Ok(())
    }

    fn start_recording(&mut self) -> Result<(), WireplayError> {
        self.state.lock().expect("server state lock").recording = true;
        Ok(())
    }

    fn stop_recording(&mut self) -> Result<(), WireplayError> {
        self.state.lock().expect("server state lock").recording_stopped = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), WireplayError> {
        self.state.lock().expect("server state lock").started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), WireplayError> {
        let mut fail = self.fail_next_stop.lock().expect("fail stop lock");
        if *fail {
            *fail = false;
            return Err(WireplayError::Server("unclean stop".to_string()));
        }
        self.state.lock().expect("server state lock").stopped = true;
        Ok(())
    }
}
