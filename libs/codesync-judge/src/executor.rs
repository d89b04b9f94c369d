/// Submission Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Coordinate resolver, harness compiler, oracle and evaluator to produce
/// the verdicts for one submission.
///
/// **Architecture:**
/// 1. Reject languages without structured grading (no oracle call)
/// 2. Fetch the problem's test cases from the catalogue
/// 3. Resolve the entry point and compile the harness (harness.rs)
/// 4. Run it on the execution oracle (engine.rs)
/// 5. Interpret the raw output (evaluator.rs)
///
/// Every submission is request-scoped. The only suspension points are the
/// catalogue lookup and the oracle round trip, and nothing is shared
/// between concurrent submissions except read-only configuration.

use crate::catalogue::ProblemCatalogue;
use crate::config::{LanguageConfig, LanguageConfigManager};
use crate::engine::ExecutionOracle;
use crate::evaluator;
use crate::harness;
use crate::resolver::{EntryPoint, EntryPointRegistry};
use codesync_common::types::{ErrorKind, Problem, ProblemSummary, TestCase, TopLevelError, Verdict};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Safety limit to keep pathological submissions away from the oracle
pub const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB

#[derive(Clone)]
pub struct Judge {
    languages: LanguageConfigManager,
    entry_points: EntryPointRegistry,
    catalogue: Arc<dyn ProblemCatalogue>,
    oracle: Arc<dyn ExecutionOracle>,
}

impl Judge {
    pub fn new(
        languages: LanguageConfigManager,
        entry_points: EntryPointRegistry,
        catalogue: Arc<dyn ProblemCatalogue>,
        oracle: Arc<dyn ExecutionOracle>,
    ) -> Self {
        Self {
            languages,
            entry_points,
            catalogue,
            oracle,
        }
    }

    pub fn languages(&self) -> &LanguageConfigManager {
        &self.languages
    }

    /// Look up a problem, mapping catalogue failures onto the error taxonomy
    pub async fn problem(&self, problem_id: &str) -> Result<Problem, TopLevelError> {
        match self.catalogue.get_problem(problem_id).await {
            Ok(Some(problem)) => Ok(problem),
            Ok(None) => Err(TopLevelError::new(
                ErrorKind::ProblemNotFound,
                format!("No problem with id '{}'", problem_id),
            )),
            Err(e) => Err(TopLevelError::new(ErrorKind::CatalogueUnavailable, e.to_string())),
        }
    }

    pub async fn problems(&self) -> Result<Vec<ProblemSummary>, TopLevelError> {
        self.catalogue
            .list_problems()
            .await
            .map_err(|e| TopLevelError::new(ErrorKind::CatalogueUnavailable, e.to_string()))
    }

    /// Evaluate a submission against every test case of a catalogued problem.
    ///
    /// Hidden cases run like any other; hiding them is up to the caller.
    #[tracing::instrument(skip(self, source_code), fields(source_bytes = source_code.len()))]
    pub async fn evaluate(
        &self,
        problem_id: &str,
        language: &str,
        source_code: &str,
    ) -> Result<Vec<Verdict>, TopLevelError> {
        // Checked up front so unknown problems in unsupported languages
        // still report the language.
        self.harness_language(language)?;

        let problem = self.problem(problem_id).await?;
        self.evaluate_problem(&problem, language, source_code).await
    }

    /// Evaluate a submission against an already fetched problem
    pub async fn evaluate_problem(
        &self,
        problem: &Problem,
        language: &str,
        source_code: &str,
    ) -> Result<Vec<Verdict>, TopLevelError> {
        let entry_point = self.entry_points.resolve(&problem.id);
        if entry_point.is_none() {
            warn!(
                problem_id = %problem.id,
                "No entry point registered; every case will report a null result"
            );
        }

        self.evaluate_cases(language, entry_point, source_code, &problem.test_cases)
            .await
    }

    /// Evaluate a submission against an explicit, ordered list of test cases
    pub async fn evaluate_cases(
        &self,
        language: &str,
        entry_point: Option<&EntryPoint>,
        source_code: &str,
        test_cases: &[TestCase],
    ) -> Result<Vec<Verdict>, TopLevelError> {
        let config = self.harness_language(language)?;
        check_source_size(source_code)?;

        info!(
            language = %config.name,
            entry_point = entry_point.map(|e| e.as_str()).unwrap_or("<none>"),
            test_cases = test_cases.len(),
            "Starting evaluation"
        );

        let script = harness::compile(source_code, entry_point, test_cases);

        let start = Instant::now();
        let raw = self
            .oracle
            .execute(&script, &config.oracle_language, &config.version_index)
            .await;
        let oracle_ms = start.elapsed().as_millis() as u64;

        let result = evaluator::interpret(raw, test_cases.len());

        match &result {
            Ok(verdicts) => {
                let passed = verdicts.iter().filter(|v| v.passed()).count();
                info!(
                    passed,
                    total = verdicts.len(),
                    oracle_ms,
                    "Evaluation completed"
                );
                for (idx, verdict) in verdicts.iter().enumerate() {
                    debug!(
                        test_num = idx + 1,
                        passed = verdict.passed(),
                        error = verdict.error().unwrap_or(""),
                        "Test verdict"
                    );
                }
            }
            Err(e) if e.kind == ErrorKind::CandidateProgramFailure => {
                warn!(kind = %e.kind, oracle_ms, "Candidate program did not produce verdicts");
            }
            Err(e) => {
                warn!(kind = %e.kind, error = %e.message, oracle_ms, "Evaluation failed");
            }
        }

        result
    }

    /// Run source unmodified on the oracle and return whatever it printed.
    ///
    /// Any configured language is accepted, graded or not.
    #[tracing::instrument(skip(self, source_code), fields(source_bytes = source_code.len()))]
    pub async fn run_raw(&self, language: &str, source_code: &str) -> Result<String, TopLevelError> {
        let config = self.languages.get_config(language).ok_or_else(|| unsupported(language))?;
        check_source_size(source_code)?;

        self.oracle
            .execute(source_code, &config.oracle_language, &config.version_index)
            .await
            .map_err(|e| TopLevelError::new(e.kind(), e.diagnostic()))
    }

    /// Configuration of a gradable language, `UnsupportedLanguage` otherwise
    pub fn harness_language(&self, language: &str) -> Result<&LanguageConfig, TopLevelError> {
        self.languages
            .harness_config(language)
            .ok_or_else(|| unsupported(language))
    }
}

fn unsupported(language: &str) -> TopLevelError {
    TopLevelError::new(
        ErrorKind::UnsupportedLanguage,
        format!("Unsupported language: {}", language),
    )
}

fn check_source_size(source_code: &str) -> Result<(), TopLevelError> {
    if source_code.len() > MAX_SOURCE_CODE_BYTES {
        return Err(TopLevelError::new(
            ErrorKind::SourceTooLarge,
            format!(
                "Source code exceeds maximum size of {} bytes",
                MAX_SOURCE_CODE_BYTES
            ),
        ));
    }
    Ok(())
}
