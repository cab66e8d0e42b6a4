use crate::errors::WireplayError;
use crate::runtime::FileSystem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_REPLAY_PORT: u16 = 8080;
pub const DEFAULT_MAPPINGS_PARENT_FOLDER: &str = "tests/resources/wiremock/";

/// Zero-argument record condition. Evaluated in isolation: it sees nothing
/// beyond what its closure captured at config time. `Err` aborts mode
/// resolution; it is never treated as false.
pub type RecordPredicate = Arc<dyn Fn() -> Result<bool, String> + Send + Sync>;

/// One recording proxy: a local port and the live upstream it forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyPair {
    pub port: u16,
    pub target: String,
}

/// Immutable per-scope scenario configuration, built once at scope entry.
#[derive(Clone)]
pub struct ScenarioConfig {
    pub proxies: Vec<ProxyPair>,
    pub replay_port: u16,
    pub mappings_parent_folder: PathBuf,
    pub mappings_folder: Option<String>,
    pub record_if: Option<RecordPredicate>,
    pub enabled: bool,
}

impl fmt::Debug for ScenarioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioConfig")
            .field("proxies", &self.proxies)
            .field("replay_port", &self.replay_port)
            .field("mappings_parent_folder", &self.mappings_parent_folder)
            .field("mappings_folder", &self.mappings_folder)
            .field("record_if", &self.record_if.as_ref().map(|_| "<predicate>"))
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl ScenarioConfig {
    /// Build a config from positionally paired ports and targets, the way
    /// the declaration surface supplies them. Length mismatch and duplicate
    /// ports are configuration errors raised before any server starts.
    pub fn new(ports: &[u16], targets: &[String]) -> Result<Self, WireplayError> {
        if ports.len() != targets.len() {
            return Err(WireplayError::InvalidConfig(format!(
                "ports and targets must pair up: {} ports, {} targets",
                ports.len(),
                targets.len()
            )));
        }
        let mut seen = HashSet::new();
        for port in ports {
            if !seen.insert(*port) {
                return Err(WireplayError::InvalidConfig(format!(
                    "duplicate recording port {port}"
                )));
            }
        }
        let proxies = ports
            .iter()
            .zip(targets)
            .map(|(port, target)| ProxyPair {
                port: *port,
                target: target.clone(),
            })
            .collect();
        Ok(Self {
            proxies,
            replay_port: DEFAULT_REPLAY_PORT,
            mappings_parent_folder: PathBuf::from(DEFAULT_MAPPINGS_PARENT_FOLDER),
            mappings_folder: None,
            record_if: None,
            enabled: true,
        })
    }

    pub fn with_replay_port(mut self, port: u16) -> Self {
        self.replay_port = port;
        self
    }

    pub fn with_mappings_parent_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.mappings_parent_folder = folder.into();
        self
    }

    pub fn with_mappings_folder(mut self, folder: impl Into<String>) -> Self {
        self.mappings_folder = Some(folder.into());
        self
    }

    /// Force re-recording whenever `predicate` evaluates truthy. Absent
    /// means "never force re-record".
    pub fn with_record_if(
        mut self,
        predicate: impl Fn() -> Result<bool, String> + Send + Sync + 'static,
    ) -> Self {
        self.record_if = Some(Arc::new(predicate));
        self
    }

    /// Explicit opt-out: the controller resolves `Disabled` and dispatches
    /// nothing for this scope.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

// ── Declaration layer ─────────────────────────────────────────────────────────

/// TOML-facing scenario declaration. The predicate cannot be declared here;
/// it is attached programmatically via `with_record_if`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScenarioDeclaration {
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default = "default_replay_port")]
    pub replay_port: u16,
    #[serde(default = "default_mappings_parent_folder")]
    pub mappings_parent_folder: String,
    #[serde(default)]
    pub mappings_folder: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_replay_port() -> u16 {
    DEFAULT_REPLAY_PORT
}

fn default_mappings_parent_folder() -> String {
    DEFAULT_MAPPINGS_PARENT_FOLDER.to_string()
}

fn default_enabled() -> bool {
    true
}

impl ScenarioDeclaration {
    pub fn into_config(self) -> Result<ScenarioConfig, WireplayError> {
        let mut config = ScenarioConfig::new(&self.ports, &self.targets)?
            .with_replay_port(self.replay_port)
            .with_mappings_parent_folder(self.mappings_parent_folder);
        config.mappings_folder = self.mappings_folder.filter(|f| !f.is_empty());
        config.enabled = self.enabled;
        Ok(config)
    }
}

/// Load a scenario declaration from a TOML file via the injected filesystem.
pub fn load_declaration(
    fs: &dyn FileSystem,
    path: &Path,
) -> Result<ScenarioDeclaration, WireplayError> {
    let raw = fs.read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| WireplayError::ConfigParse(e.to_string()))
}
