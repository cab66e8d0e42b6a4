//! Test-scope identity: a scenario is keyed either to a whole suite or to a
//! single case inside one.

/// The span a scenario is attached to, with matching setup/cleanup boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Suite { suite: String },
    Case { case: String, suite: String },
}

impl Scope {
    pub fn suite(suite: impl Into<String>) -> Self {
        Self::Suite {
            suite: suite.into(),
        }
    }

    pub fn case(case: impl Into<String>, suite: impl Into<String>) -> Self {
        Self::Case {
            case: case.into(),
            suite: suite.into(),
        }
    }

    /// Registry key for this scope. Distinct from `folder_component` so that
    /// two scopes whose names collapse to the same folder still register
    /// separately.
    pub fn identity(&self) -> String {
        match self {
            Self::Suite { suite } => format!("suite::{suite}"),
            Self::Case { case, suite } => format!("case::{case}::{suite}"),
        }
    }

    pub fn suite_name(&self) -> &str {
        match self {
            Self::Suite { suite } | Self::Case { suite, .. } => suite,
        }
    }

    pub fn case_name(&self) -> Option<&str> {
        match self {
            Self::Suite { .. } => None,
            Self::Case { case, .. } => Some(case),
        }
    }

    /// Filesystem-safe fixture-directory component: suite name for suite
    /// scope, case-then-suite concatenation for case scope, whitespace
    /// stripped so display names never create spurious subdirectories.
    pub fn folder_component(&self) -> String {
        match self {
            Self::Suite { suite } => strip_whitespace(suite),
            Self::Case { case, suite } => {
                format!("{}{}", strip_whitespace(case), strip_whitespace(suite))
            }
        }
    }
}

fn strip_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
