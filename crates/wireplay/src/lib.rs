//! Record/replay scenario orchestration for HTTP test doubles.
//!
//! A test suite points its code under test at `localhost:<port>` and wireplay
//! decides, per scope, whether that port is backed by a recording proxy to
//! the live upstream or by a replay server serving previously captured
//! fixtures. The first run against a missing fixture directory records; every
//! later run replays until the directory is deleted or a `record_if`
//! predicate forces a reset.
//!
//! The mock-server engine, the test framework's hook mechanism, and the
//! fixture file format are collaborators behind traits (`engine`, `hooks`,
//! `runtime`); this crate only orchestrates them.

pub mod config;
pub mod controller;
pub mod engine;
pub mod errors;
pub mod hooks;
pub mod locator;
pub mod logging;
pub mod mode;
pub mod pool;
pub mod registry;
pub mod runtime;
pub mod scope;

pub use config::{ProxyPair, RecordPredicate, ScenarioConfig, ScenarioDeclaration};
pub use controller::ScenarioController;
pub use engine::{MockServer, MockServerFactory};
pub use errors::WireplayError;
pub use hooks::{install, HookContext, LifecycleHookProvider};
pub use mode::ScenarioMode;
pub use pool::MockServerPool;
pub use registry::ScopeRegistry;
pub use scope::Scope;
