//! Mode resolution: filesystem presence plus an optional user predicate
//! decide what a scope activation does.

use crate::config::RecordPredicate;
use crate::errors::WireplayError;
use crate::runtime::FileSystem;
use std::path::Path;

/// What a scenario does for one scope activation. Resolved once at setup and
/// immutable for the scope's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioMode {
    /// Explicit opt-out: no servers, no fixtures. Never produced by
    /// `resolve`; only the controller maps a disabled config here.
    Disabled,
    Recording,
    Replaying,
    ResetThenRecord,
}

impl ScenarioMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Recording => "recording",
            Self::Replaying => "replaying",
            Self::ResetThenRecord => "reset_then_record",
        }
    }
}

/// Resolve the mode for one scope activation.
///
/// A supplied predicate is evaluated first; evaluation failure is fatal (the
/// scenario cannot proceed with an ambiguous mode), truthy forces
/// `ResetThenRecord` regardless of what is on disk. Otherwise the fixture
/// directory's existence is the sole signal: present means replay, absent
/// means record. Evaluated fresh on every activation, so a directory created
/// by a prior recording run flips later runs to replay until it is deleted.
pub fn resolve(
    fixture_dir: &Path,
    record_if: Option<&RecordPredicate>,
    fs: &dyn FileSystem,
) -> Result<ScenarioMode, WireplayError> {
    if let Some(predicate) = record_if {
        let force_record = (predicate.as_ref())().map_err(WireplayError::Predicate)?;
        if force_record {
            return Ok(ScenarioMode::ResetThenRecord);
        }
    }
    if fs.dir_exists(fixture_dir) {
        Ok(ScenarioMode::Replaying)
    } else {
        Ok(ScenarioMode::Recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::FakeFileSystem;
    use std::sync::Arc;

    #[test]
    fn missing_directory_resolves_to_recording() {
        let fs = FakeFileSystem::default();
        let mode = resolve(Path::new("fixtures/CaseASuiteX"), None, &fs).expect("resolve");
        assert_eq!(mode, ScenarioMode::Recording);
    }

    #[test]
    fn existing_directory_resolves_to_replaying() {
        let fs = FakeFileSystem::with_dir("fixtures/CaseASuiteX");
        let mode = resolve(Path::new("fixtures/CaseASuiteX"), None, &fs).expect("resolve");
        assert_eq!(mode, ScenarioMode::Replaying);
    }

    #[test]
    fn truthy_predicate_forces_reset_even_when_directory_exists() {
        let fs = FakeFileSystem::with_dir("fixtures/CaseASuiteX");
        let predicate: RecordPredicate = Arc::new(|| Ok(true));
        let mode =
            resolve(Path::new("fixtures/CaseASuiteX"), Some(&predicate), &fs).expect("resolve");
        assert_eq!(mode, ScenarioMode::ResetThenRecord);
    }

    #[test]
    fn falsy_predicate_falls_through_to_directory_check() {
        let fs = FakeFileSystem::default();
        let predicate: RecordPredicate = Arc::new(|| Ok(false));
        let mode =
            resolve(Path::new("fixtures/CaseASuiteX"), Some(&predicate), &fs).expect("resolve");
        assert_eq!(mode, ScenarioMode::Recording);
    }

    #[test]
    fn predicate_failure_is_fatal_not_false() {
        let fs = FakeFileSystem::default();
        let predicate: RecordPredicate = Arc::new(|| Err("env var unset".to_string()));
        let err = resolve(Path::new("fixtures/CaseASuiteX"), Some(&predicate), &fs)
            .expect_err("must be fatal");
        assert!(matches!(err, WireplayError::Predicate(message) if message.contains("env var")));
    }
}
