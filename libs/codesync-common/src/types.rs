use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// One test case of a catalogued problem.
///
/// `input` is a JSON-encoded argument list and `expected_output` the JSON
/// serialization the entry point's result must match byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

impl TestCase {
    /// Returns true when `input` decodes to a JSON array.
    ///
    /// The harness still runs malformed cases and reports them per case;
    /// this is only used for early warnings when a catalogue is loaded.
    pub fn has_array_input(&self) -> bool {
        matches!(
            serde_json::from_str::<serde_json::Value>(&self.input),
            Ok(serde_json::Value::Array(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A catalogued problem as stored by the problem catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Language -> starter code
    #[serde(default)]
    pub starter_code: HashMap<String, String>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point_hint: Option<String>,
}

/// Listing entry for a problem: no statement, no test cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSummary {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub topics: Vec<String>,
}

impl From<&Problem> for ProblemSummary {
    fn from(problem: &Problem) -> Self {
        Self {
            id: problem.id.clone(),
            title: problem.title.clone(),
            difficulty: problem.difficulty,
            topics: problem.topics.clone(),
        }
    }
}

/// Structured pass/fail record for one test case.
///
/// The harness emits exactly these two shapes. `Errored` is listed first so
/// untagged decoding picks it whenever an `error` field is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Verdict {
    Errored {
        passed: bool,
        error: String,
        expected: String,
        input: String,
    },
    Completed {
        passed: bool,
        actual: String,
        expected: String,
        input: String,
    },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        match self {
            Verdict::Errored { passed, .. } | Verdict::Completed { passed, .. } => *passed,
        }
    }

    pub fn input(&self) -> &str {
        match self {
            Verdict::Errored { input, .. } | Verdict::Completed { input, .. } => input,
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            Verdict::Errored { expected, .. } | Verdict::Completed { expected, .. } => expected,
        }
    }

    /// Serialized actual value, absent for errored cases
    pub fn actual(&self) -> Option<&str> {
        match self {
            Verdict::Completed { actual, .. } => Some(actual),
            Verdict::Errored { .. } => None,
        }
    }

    /// Per-case error message, absent for cases that ran to completion
    pub fn error(&self) -> Option<&str> {
        match self {
            Verdict::Errored { error, .. } => Some(error),
            Verdict::Completed { .. } => None,
        }
    }
}

/// Failure kinds that invalidate a whole submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnsupportedLanguage,
    ProblemNotFound,
    CatalogueUnavailable,
    SourceTooLarge,
    OracleUnavailable,
    ExecutionTimeout,
    CandidateProgramFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedLanguage => "UnsupportedLanguage",
            ErrorKind::ProblemNotFound => "ProblemNotFound",
            ErrorKind::CatalogueUnavailable => "CatalogueUnavailable",
            ErrorKind::SourceTooLarge => "SourceTooLarge",
            ErrorKind::OracleUnavailable => "OracleUnavailable",
            ErrorKind::ExecutionTimeout => "ExecutionTimeout",
            ErrorKind::CandidateProgramFailure => "CandidateProgramFailure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure that replaces the whole verdict list of a submission.
///
/// For `CandidateProgramFailure` the message is the oracle's raw output,
/// passed through untouched so the user can debug their own program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TopLevelError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TopLevelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Stand-in for the contents of hidden test cases in client-facing views
pub const HIDDEN_PLACEHOLDER: &str = "<hidden>";

impl TestCase {
    /// Client-facing copy: hidden cases keep only their visibility flag
    pub fn redacted(&self) -> TestCase {
        if !self.is_hidden {
            return self.clone();
        }
        TestCase {
            input: HIDDEN_PLACEHOLDER.to_string(),
            expected_output: HIDDEN_PLACEHOLDER.to_string(),
            is_hidden: true,
        }
    }
}

impl Verdict {
    /// Keep only the pass/fail bit, for cases the user must not see
    pub fn redacted(self) -> Verdict {
        let hidden = || HIDDEN_PLACEHOLDER.to_string();
        match self {
            Verdict::Errored { passed, .. } => Verdict::Errored {
                passed,
                error: hidden(),
                expected: hidden(),
                input: hidden(),
            },
            Verdict::Completed { passed, .. } => Verdict::Completed {
                passed,
                actual: hidden(),
                expected: hidden(),
                input: hidden(),
            },
        }
    }
}

/// Outcome of one submission as reported to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Verdicts {
        passed: usize,
        total: usize,
        verdicts: Vec<Verdict>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl From<Result<Vec<Verdict>, TopLevelError>> for Outcome {
    fn from(result: Result<Vec<Verdict>, TopLevelError>) -> Self {
        match result {
            Ok(verdicts) => Outcome::Verdicts {
                passed: verdicts.iter().filter(|v| v.passed()).count(),
                total: verdicts.len(),
                verdicts,
            },
            Err(e) => Outcome::Error {
                kind: e.kind,
                message: e.message,
            },
        }
    }
}

impl Outcome {
    /// Redact verdicts of hidden cases. `test_cases` is index-aligned with
    /// the verdict list.
    pub fn redact_hidden(self, test_cases: &[TestCase]) -> Self {
        match self {
            Outcome::Verdicts {
                passed,
                total,
                verdicts,
            } => Outcome::Verdicts {
                passed,
                total,
                verdicts: verdicts
                    .into_iter()
                    .enumerate()
                    .map(|(idx, v)| match test_cases.get(idx) {
                        Some(tc) if tc.is_hidden => v.redacted(),
                        _ => v,
                    })
                    .collect(),
            },
            error => error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub submission_id: Uuid,
    pub problem_id: String,
    pub evaluated_at: DateTime<Utc>,
    pub outcome: Outcome,
}
