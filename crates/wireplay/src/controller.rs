//! The scenario state machine: `Idle -> Active(mode) -> Idle`, driven by the
//! setup/cleanup hooks of one test scope.

use crate::config::ScenarioConfig;
use crate::engine::MockServerFactory;
use crate::errors::WireplayError;
use crate::hooks::HookContext;
use crate::locator::locate;
use crate::logging::{JsonlLogger, LogEvent};
use crate::mode::{resolve, ScenarioMode};
use crate::pool::MockServerPool;
use crate::registry::ScopeRegistry;
use crate::runtime::FileSystem;
use crate::scope::Scope;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Orchestrates locator, mode resolution, and the server pool across one
/// scope's lifecycle. The injected registry is shared with every other
/// controller in the process, so a suite-scoped activation survives any
/// number of case-level setup/cleanup pairs firing in between.
pub struct ScenarioController {
    config: ScenarioConfig,
    scope: Scope,
    registry: ScopeRegistry,
    pool: MockServerPool,
    fs: Arc<dyn FileSystem>,
    logger: Option<JsonlLogger>,
}

impl ScenarioController {
    pub fn new(
        config: ScenarioConfig,
        scope: Scope,
        registry: ScopeRegistry,
        factory: Arc<dyn MockServerFactory>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let pool = MockServerPool::new(factory, Arc::clone(&fs));
        Self {
            config,
            scope,
            registry,
            pool,
            fs,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Same key at setup and cleanup: pure function of immutable inputs.
    pub fn fixture_dir(&self) -> PathBuf {
        locate(
            &self.scope,
            self.config.mappings_folder.as_deref(),
            &self.config.mappings_parent_folder,
        )
    }

    pub fn active_mode(&self) -> Option<ScenarioMode> {
        self.registry.active_mode(&self.scope.identity())
    }

    /// Whether a hook firing with `ctx` belongs to this controller's scope.
    pub fn matches(&self, ctx: &HookContext) -> bool {
        match &self.scope {
            Scope::Suite { suite } => ctx.suite_name == *suite,
            Scope::Case { case, suite } => {
                ctx.suite_name == *suite && ctx.case_name.as_deref() == Some(case.as_str())
            }
        }
    }

    /// Setup transition. Runs before the guarded test body: claims the scope
    /// in the registry (already claimed means another hook invocation got
    /// here first and this call is a no-op), resolves the mode, and starts
    /// the matching server set. Any failure releases the claim and
    /// propagates so the test body never runs against a half-built scenario.
    pub fn on_scope_setup(&mut self) -> Result<(), WireplayError> {
        let identity = self.scope.identity();
        if !self.registry.claim(&identity) {
            return Ok(());
        }
        match self.activate() {
            Ok(mode) => {
                self.registry.complete(&identity, mode);
                Ok(())
            }
            Err(err) => {
                self.registry.release(&identity);
                Err(err)
            }
        }
    }

    fn activate(&mut self) -> Result<ScenarioMode, WireplayError> {
        let fixture_dir = self.fixture_dir();
        let mode = if self.config.enabled {
            resolve(&fixture_dir, self.config.record_if.as_ref(), self.fs.as_ref())?
        } else {
            ScenarioMode::Disabled
        };
        self.log(
            "info",
            "mode_resolved",
            json!({
                "scope": self.scope.identity(),
                "mode": mode.as_str(),
                "fixture_dir": fixture_dir.display().to_string(),
            }),
        );
        match mode {
            ScenarioMode::Recording => {
                self.pool.start_recording(&fixture_dir, &self.config.proxies)?;
            }
            ScenarioMode::Replaying => {
                self.pool
                    .start_replaying(&fixture_dir, self.config.replay_port)?;
            }
            ScenarioMode::ResetThenRecord => {
                self.pool
                    .reset_then_record(&fixture_dir, &self.config.proxies)?;
            }
            ScenarioMode::Disabled => {}
        }
        self.log(
            "info",
            "servers_started",
            json!({
                "scope": self.scope.identity(),
                "count": self.pool.server_count(),
            }),
        );
        Ok(mode)
    }

    /// Cleanup transition. Runs after the test body's own cleanup: releases
    /// the registry claim (not claimed means setup never ran, or another
    /// cleanup already tore down, so this is a no-op), then stops and
    /// flushes every owned server. A teardown failure is logged and
    /// returned; the claim is released first so a retried cleanup never
    /// double-stops.
    pub fn on_scope_cleanup(&mut self) -> Result<(), WireplayError> {
        let identity = self.scope.identity();
        if !self.registry.release(&identity) {
            return Ok(());
        }
        match self.pool.stop_all() {
            Ok(()) => {
                self.log(
                    "info",
                    "servers_stopped",
                    json!({ "scope": identity }),
                );
                Ok(())
            }
            Err(err) => {
                self.log(
                    "error",
                    "cleanup_error",
                    json!({ "scope": identity, "error": err.to_string() }),
                );
                Err(err)
            }
        }
    }

    fn log(&self, level: &str, event_type: &str, payload: serde_json::Value) {
        if let Some(logger) = &self.logger {
            let _ = logger.append(&LogEvent {
                level,
                event_type,
                payload,
            });
        }
    }
}
