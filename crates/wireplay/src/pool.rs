//! Ownership and lifecycle of the mock-server instances for one scope.

use crate::config::ProxyPair;
use crate::engine::{MockServer, MockServerFactory};
use crate::errors::WireplayError;
use crate::runtime::FileSystem;
use std::path::Path;
use std::sync::Arc;

/// Recorded fixtures land under this subdirectory of the fixture root,
/// created eagerly before recording starts.
pub const MAPPINGS_SUBDIR: &str = "mappings";

struct OwnedServer {
    server: Box<dyn MockServer>,
    recording: bool,
}

/// Owns every server handle for one scope activation. No other scope's pool
/// may touch them; everything is local-loopback, so start/stop either
/// succeeds immediately or is fatal — nothing here retries.
pub struct MockServerPool {
    factory: Arc<dyn MockServerFactory>,
    fs: Arc<dyn FileSystem>,
    servers: Vec<OwnedServer>,
}

impl MockServerPool {
    pub fn new(factory: Arc<dyn MockServerFactory>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            factory,
            fs,
            servers: Vec::new(),
        }
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Start one recording server per proxy pair, each bound to the pair's
    /// port, backed by `fixture_dir`, and proxying to the pair's target.
    ///
    /// Partial failure leaves the servers already started by this call
    /// running and owned (forcing a rollback could mask the root cause);
    /// the error propagates and the scope is un-recordable.
    pub fn start_recording(
        &mut self,
        fixture_dir: &Path,
        pairs: &[ProxyPair],
    ) -> Result<(), WireplayError> {
        for pair in pairs {
            self.fs.create_dir_all(&fixture_dir.join(MAPPINGS_SUBDIR))?;
            let mut server = self.factory.bind(pair.port, fixture_dir)?;
            server.proxy_to(&pair.target)?;
            server.start()?;
            server.start_recording()?;
            self.servers.push(OwnedServer {
                server,
                recording: true,
            });
        }
        Ok(())
    }

    /// Start exactly one server on `replay_port` serving previously recorded
    /// fixtures from `fixture_dir` verbatim. No proxying, no recording.
    pub fn start_replaying(
        &mut self,
        fixture_dir: &Path,
        replay_port: u16,
    ) -> Result<(), WireplayError> {
        let mut server = self.factory.bind(replay_port, fixture_dir)?;
        server.start()?;
        self.servers.push(OwnedServer {
            server,
            recording: false,
        });
        Ok(())
    }

    /// Recursively delete `fixture_dir` if present, then record fresh.
    /// Deletion failure is fatal and aborts before any recording begins.
    pub fn reset_then_record(
        &mut self,
        fixture_dir: &Path,
        pairs: &[ProxyPair],
    ) -> Result<(), WireplayError> {
        if self.fs.dir_exists(fixture_dir) {
            self.fs.remove_dir_all(fixture_dir)?;
        }
        self.start_recording(fixture_dir, pairs)
    }

    /// Stop every owned server: recording servers flush pending fixtures
    /// first, then stop; replay servers just stop. Every server is attempted
    /// even if one fails; the first failure is returned afterwards. Clears
    /// the owned collection; a no-op when nothing is owned.
    pub fn stop_all(&mut self) -> Result<(), WireplayError> {
        let mut first_error = None;
        for mut owned in self.servers.drain(..) {
            if owned.recording {
                if let Err(err) = owned.server.stop_recording() {
                    first_error.get_or_insert(err);
                }
            }
            if let Err(err) = owned.server.stop() {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FakeMockServerFactory;
    use crate::runtime::FakeFileSystem;

    fn pairs() -> Vec<ProxyPair> {
        vec![
            ProxyPair {
                port: 9001,
                target: "http://api.example.com".to_string(),
            },
            ProxyPair {
                port: 9002,
                target: "http://auth.example.com".to_string(),
            },
        ]
    }

    fn pool_with(
        factory: &FakeMockServerFactory,
        fs: &FakeFileSystem,
    ) -> MockServerPool {
        MockServerPool::new(Arc::new(factory.clone()), Arc::new(fs.clone()))
    }

    #[test]
    fn start_recording_starts_one_server_per_pair_with_mappings_dir() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::default();
        let mut pool = pool_with(&factory, &fs);

        pool.start_recording(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect("start recording");

        assert_eq!(pool.server_count(), 2);
        assert!(fs.dir_exists(Path::new("fixtures/CaseASuiteX/mappings")));
        let servers = factory.bound_servers();
        assert_eq!(servers[0].port, 9001);
        assert_eq!(
            servers[0].proxy_target.as_deref(),
            Some("http://api.example.com")
        );
        assert!(servers.iter().all(|s| s.started && s.recording));
    }

    #[test]
    fn partial_bind_failure_leaves_earlier_servers_running() {
        let factory = FakeMockServerFactory::default();
        factory.fail_bind_on_port(9002);
        let fs = FakeFileSystem::default();
        let mut pool = pool_with(&factory, &fs);

        let err = pool
            .start_recording(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect_err("second bind must fail");
        assert!(matches!(err, WireplayError::Server(_)));

        // The first server stays owned and running, not rolled back.
        assert_eq!(pool.server_count(), 1);
        let servers = factory.bound_servers();
        assert_eq!(servers.len(), 1);
        assert!(servers[0].started && !servers[0].stopped);
    }

    #[test]
    fn directory_creation_failure_aborts_before_any_bind() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::default();
        fs.set_fail_next(WireplayError::Io("read-only filesystem".to_string()));
        let mut pool = pool_with(&factory, &fs);

        let err = pool
            .start_recording(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect_err("directory creation failure is fatal");
        assert!(matches!(err, WireplayError::Io(_)));
        assert_eq!(pool.server_count(), 0);
        assert!(factory.bound_servers().is_empty());
        assert!(!fs.dir_exists(Path::new("fixtures/CaseASuiteX/mappings")));
    }

    #[test]
    fn start_replaying_starts_one_server_without_proxy_or_recording() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::with_dir("fixtures/CaseASuiteX");
        let mut pool = pool_with(&factory, &fs);

        pool.start_replaying(Path::new("fixtures/CaseASuiteX"), 8080)
            .expect("start replaying");

        assert_eq!(pool.server_count(), 1);
        let servers = factory.bound_servers();
        assert_eq!(servers[0].port, 8080);
        assert!(servers[0].proxy_target.is_none());
        assert!(servers[0].started && !servers[0].recording);
    }

    #[test]
    fn reset_then_record_deletes_the_fixture_tree_before_recording() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::with_file("fixtures/CaseASuiteX/mappings/stale.json", "{}");
        fs.add_dir("fixtures/CaseASuiteX");
        fs.add_dir("fixtures/CaseASuiteX/mappings");
        let mut pool = pool_with(&factory, &fs);

        pool.reset_then_record(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect("reset then record");

        assert!(fs
            .read_to_string(Path::new("fixtures/CaseASuiteX/mappings/stale.json"))
            .is_err());
        assert!(fs.dir_exists(Path::new("fixtures/CaseASuiteX/mappings")));
        assert_eq!(pool.server_count(), 2);
    }

    #[test]
    fn reset_deletion_failure_aborts_before_recording() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::with_dir("fixtures/CaseASuiteX");
        fs.set_fail_next(WireplayError::Io("permission denied".to_string()));
        let mut pool = pool_with(&factory, &fs);

        let err = pool
            .reset_then_record(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect_err("deletion failure is fatal");
        assert!(matches!(err, WireplayError::Io(_)));
        assert_eq!(pool.server_count(), 0);
        assert!(factory.bound_servers().is_empty());
    }

    #[test]
    fn stop_all_flushes_recording_servers_and_clears_ownership() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::default();
        let mut pool = pool_with(&factory, &fs);
        pool.start_recording(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect("start recording");

        pool.stop_all().expect("stop all");

        assert_eq!(pool.server_count(), 0);
        let servers = factory.bound_servers();
        assert!(servers.iter().all(|s| s.recording_stopped && s.stopped));
        // Second call has nothing to do.
        pool.stop_all().expect("idempotent stop");
    }

    #[test]
    fn stop_all_attempts_every_server_and_reports_the_first_failure() {
        let factory = FakeMockServerFactory::default();
        let fs = FakeFileSystem::default();
        let mut pool = pool_with(&factory, &fs);
        pool.start_recording(Path::new("fixtures/CaseASuiteX"), &pairs())
            .expect("start recording");

        factory.fail_next_stop();
        let err = pool.stop_all().expect_err("first stop fails");
        assert!(matches!(err, WireplayError::Server(_)));

        assert_eq!(pool.server_count(), 0);
        let servers = factory.bound_servers();
        // Both were still asked to flush, and the second one stopped cleanly.
        assert!(servers.iter().all(|s| s.recording_stopped));
        assert!(servers[1].stopped);
    }
}
