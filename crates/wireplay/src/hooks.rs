//! Seam to the test framework's lifecycle hooks. The framework itself
//! (discovery, ordering, invocation of before/after phases) lives outside
//! this crate; it only has to expose the four registration points below and
//! fire them with the currently executing case and suite names.

use crate::controller::ScenarioController;
use crate::errors::WireplayError;
use crate::scope::Scope;
use std::sync::{Arc, Mutex};

/// Names supplied by the framework when a hook fires. `case_name` is `None`
/// for suite-level hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    pub suite_name: String,
    pub case_name: Option<String>,
}

impl HookContext {
    pub fn suite(suite: impl Into<String>) -> Self {
        Self {
            suite_name: suite.into(),
            case_name: None,
        }
    }

    pub fn case(case: impl Into<String>, suite: impl Into<String>) -> Self {
        Self {
            suite_name: suite.into(),
            case_name: Some(case.into()),
        }
    }
}

pub type Hook = Box<dyn FnMut(&HookContext) -> Result<(), WireplayError> + Send>;

/// The four hook points a test framework must expose. Setup hooks run before
/// the guarded test body, cleanup hooks after its own cleanup.
pub trait LifecycleHookProvider {
    fn add_suite_setup(&mut self, hook: Hook);
    fn add_suite_cleanup(&mut self, hook: Hook);
    fn add_case_setup(&mut self, hook: Hook);
    fn add_case_cleanup(&mut self, hook: Hook);
}

/// Register `controller` into the matching pair of hook points: suite
/// setup/cleanup for a suite-scoped controller, case setup/cleanup for a
/// case-scoped one. Each fired hook acts only when the context names match
/// the controller's scope. Returns the shared handle for inspection.
pub fn install(
    controller: ScenarioController,
    provider: &mut dyn LifecycleHookProvider,
) -> Arc<Mutex<ScenarioController>> {
    let shared = Arc::new(Mutex::new(controller));
    let suite_scoped = matches!(
        shared.lock().expect("controller lock").scope(),
        Scope::Suite { .. }
    );

    let setup = hook_for(&shared, ScenarioController::on_scope_setup);
    let cleanup = hook_for(&shared, ScenarioController::on_scope_cleanup);
    if suite_scoped {
        provider.add_suite_setup(setup);
        provider.add_suite_cleanup(cleanup);
    } else {
        provider.add_case_setup(setup);
        provider.add_case_cleanup(cleanup);
    }
    shared
}

fn hook_for(
    shared: &Arc<Mutex<ScenarioController>>,
    transition: fn(&mut ScenarioController) -> Result<(), WireplayError>,
) -> Hook {
    let shared = Arc::clone(shared);
    Box::new(move |ctx| {
        let mut controller = shared
            .lock()
            .map_err(|_| WireplayError::Hook("controller lock poisoned".to_string()))?;
        if controller.matches(ctx) {
            transition(&mut controller)
        } else {
            Ok(())
        }
    })
}

// ── Recording fake provider ───────────────────────────────────────────────────

/// In-memory hook provider driving registered hooks the way a framework
/// would: setup failures abort immediately (the guarded body must not run),
/// cleanup runs every hook and reports the first failure afterwards so one
/// teardown error never hides another.
#[derive(Default)]
pub struct RecordedLifecycleHooks {
    suite_setup: Vec<Hook>,
    suite_cleanup: Vec<Hook>,
    case_setup: Vec<Hook>,
    case_cleanup: Vec<Hook>,
}

impl LifecycleHookProvider for RecordedLifecycleHooks {
    fn add_suite_setup(&mut self, hook: Hook) {
        self.suite_setup.push(hook);
    }

    fn add_suite_cleanup(&mut self, hook: Hook) {
        self.suite_cleanup.push(hook);
    }

    fn add_case_setup(&mut self, hook: Hook) {
        self.case_setup.push(hook);
    }

    fn add_case_cleanup(&mut self, hook: Hook) {
        self.case_cleanup.push(hook);
    }
}

impl RecordedLifecycleHooks {
    pub fn fire_suite_setup(&mut self, suite: &str) -> Result<(), WireplayError> {
        let ctx = HookContext::suite(suite);
        for hook in &mut self.suite_setup {
            hook(&ctx)?;
        }
        Ok(())
    }

    pub fn fire_suite_cleanup(&mut self, suite: &str) -> Result<(), WireplayError> {
        let ctx = HookContext::suite(suite);
        fire_all(&mut self.suite_cleanup, &ctx)
    }

    pub fn fire_case_setup(&mut self, case: &str, suite: &str) -> Result<(), WireplayError> {
        let ctx = HookContext::case(case, suite);
        for hook in &mut self.case_setup {
            hook(&ctx)?;
        }
        Ok(())
    }

    pub fn fire_case_cleanup(&mut self, case: &str, suite: &str) -> Result<(), WireplayError> {
        let ctx = HookContext::case(case, suite);
        fire_all(&mut self.case_cleanup, &ctx)
    }
}

fn fire_all(hooks: &mut [Hook], ctx: &HookContext) -> Result<(), WireplayError> {
    let mut first_error = None;
    for hook in hooks {
        if let Err(err) = hook(ctx) {
            first_error.get_or_insert(err);
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
