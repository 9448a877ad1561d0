//! Playbook value types: a validated, ordered sequence of remediation steps
//! with per-step rollback.

use crate::ids::{ConfigPath, Fingerprint};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;

/// A remediation action. Tagged variants only — unknown tags are rejected
/// at validation time rather than represented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Action {
    ExecShell { cmd: String },
    RestartService { name: String },
    Redeploy { config_path: ConfigPath },
    Rollback { generation: Option<u64> },
    WaitSeconds { seconds: u64 },
    AssertFingerprint { expected: Fingerprint },
}

/// A single playbook step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookStep {
    pub id: String,
    pub name: String,
    pub action: Action,
    pub params: std::collections::BTreeMap<String, String>,
    pub timeout_seconds: u64,
    pub rollback: Option<Action>,
    pub continue_on_failure: bool,
}

/// An ordered, validated sequence of remediation steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playbook {
    pub id: String,
    pub name: String,
    pub version: semver::Version,
    pub steps: Vec<PlaybookStep>,
    pub preconditions: Vec<String>,
    pub triggers: Vec<String>,
    pub validated: bool,
    pub checksum: String,
}

/// Errors raised validating a playbook.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybookValidationError {
    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),
    #[error("step {0} has non-positive timeout")]
    NonPositiveTimeout(String),
    #[error("playbook has no steps")]
    Empty,
}

impl Playbook {
    /// Construct and validate a playbook in one step, computing its
    /// canonicalized-content checksum.
    pub fn validate(
        id: impl Into<String>,
        name: impl Into<String>,
        version: semver::Version,
        steps: Vec<PlaybookStep>,
        preconditions: Vec<String>,
        triggers: Vec<String>,
    ) -> Result<Self, PlaybookValidationError> {
        if steps.is_empty() {
            return Err(PlaybookValidationError::Empty);
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.clone()) {
                return Err(PlaybookValidationError::DuplicateStepId(step.id.clone()));
            }
            if step.timeout_seconds == 0 {
                return Err(PlaybookValidationError::NonPositiveTimeout(step.id.clone()));
            }
        }

        let id = id.into();
        let name = name.into();
        let checksum = Self::compute_checksum(&id, &name, &version, &steps);

        Ok(Self {
            id,
            name,
            version,
            steps,
            preconditions,
            triggers,
            validated: true,
            checksum,
        })
    }

    fn compute_checksum(
        id: &str,
        name: &str,
        version: &semver::Version,
        steps: &[PlaybookStep],
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        hasher.update(name.as_bytes());
        hasher.update(version.to_string().as_bytes());
        for step in steps {
            hasher.update(step.id.as_bytes());
            hasher.update(step.name.as_bytes());
            hasher.update(step.timeout_seconds.to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Outcome of a single executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    Ok,
    Fail,
    Timeout,
    Denied,
}

/// Recorded result for a single step execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_step(id: &str) -> PlaybookStep {
        PlaybookStep {
            id: id.to_string(),
            name: id.to_string(),
            action: Action::RestartService {
                name: "svc".into(),
            },
            params: Default::default(),
            timeout_seconds: 30,
            rollback: None,
            continue_on_failure: false,
        }
    }

    #[test]
    fn rejects_duplicate_step_ids() {
        let err = Playbook::validate(
            "pb-1",
            "test",
            semver::Version::new(1, 0, 0),
            vec![sample_step("a"), sample_step("a")],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, PlaybookValidationError::DuplicateStepId("a".into()));
    }

    #[test]
    fn rejects_non_positive_timeout() {
        let mut step = sample_step("a");
        step.timeout_seconds = 0;
        let err = Playbook::validate(
            "pb-1",
            "test",
            semver::Version::new(1, 0, 0),
            vec![step],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, PlaybookValidationError::NonPositiveTimeout("a".into()));
    }

    #[test]
    fn checksum_is_deterministic() {
        let pb1 = Playbook::validate(
            "pb-1",
            "test",
            semver::Version::new(1, 0, 0),
            vec![sample_step("a"), sample_step("b")],
            vec![],
            vec![],
        )
        .unwrap();
        let pb2 = Playbook::validate(
            "pb-1",
            "test",
            semver::Version::new(1, 0, 0),
            vec![sample_step("a"), sample_step("b")],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(pb1.checksum, pb2.checksum);
        assert!(pb1.validated);
    }
}
