// HTTP route handlers for the CodeSync API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use codesync_common::types::{ErrorKind, Outcome, Problem, SubmissionReport, TopLevelError};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::metrics;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub problem_id: String,
    pub language: String,
    pub source_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub language: String,
    pub source_code: String,
}

/// HTTP status for a top-level error. Failures of the candidate's own
/// program are results, not request faults.
fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnsupportedLanguage | ErrorKind::SourceTooLarge => StatusCode::BAD_REQUEST,
        ErrorKind::ProblemNotFound => StatusCode::NOT_FOUND,
        ErrorKind::OracleUnavailable | ErrorKind::CatalogueUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::ExecutionTimeout | ErrorKind::CandidateProgramFailure => StatusCode::OK,
    }
}

fn report(problem_id: String, outcome: Outcome) -> SubmissionReport {
    SubmissionReport {
        submission_id: Uuid::new_v4(),
        problem_id,
        evaluated_at: Utc::now(),
        outcome,
    }
}

/// POST /submit - Evaluate a submission against a problem's test cases
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubmitRequest>,
) -> Response {
    let start = Instant::now();

    let result = async {
        state.judge.harness_language(&payload.language)?;
        let problem = state.judge.problem(&payload.problem_id).await?;
        let verdicts = state
            .judge
            .evaluate_problem(&problem, &payload.language, &payload.source_code)
            .await?;
        Ok::<_, TopLevelError>((verdicts, problem))
    }
    .await;

    let elapsed = start.elapsed().as_secs_f64();

    let (status, outcome) = match result {
        Ok((verdicts, problem)) => {
            metrics::record_submission("verdicts", elapsed);
            let outcome = Outcome::from(Ok(verdicts)).redact_hidden(&problem.test_cases);
            (StatusCode::OK, outcome)
        }
        Err(e) => {
            metrics::record_submission(e.kind.as_str(), elapsed);
            log_failure(&payload.problem_id, &e);
            (status_for(e.kind), Outcome::from(Err(e)))
        }
    };

    let report = report(payload.problem_id, outcome);
    info!(
        submission_id = %report.submission_id,
        problem_id = %report.problem_id,
        language = %payload.language,
        elapsed_ms = (elapsed * 1000.0) as u64,
        "Submission evaluated"
    );

    (status, Json(report)).into_response()
}

fn log_failure(problem_id: &str, e: &TopLevelError) {
    match e.kind {
        ErrorKind::OracleUnavailable | ErrorKind::CatalogueUnavailable => {
            error!(problem_id = %problem_id, kind = %e.kind, error = %e.message, "Submission could not be evaluated");
        }
        _ => {
            warn!(problem_id = %problem_id, kind = %e.kind, "Submission produced no verdicts");
        }
    }
}

/// POST /execute - Run code unmodified and return its raw output
pub async fn execute(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExecuteRequest>,
) -> Response {
    match state.judge.run_raw(&payload.language, &payload.source_code).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!({ "output": output }))).into_response(),
        Err(e) if e.kind == ErrorKind::UnsupportedLanguage => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Unsupported language" })),
        )
            .into_response(),
        Err(e) => {
            error!(language = %payload.language, kind = %e.kind, error = %e.message, "Raw execution failed");
            (status_for(e.kind), Json(serde_json::json!({ "error": e.message }))).into_response()
        }
    }
}

/// GET /problems - Summaries of every catalogued problem
pub async fn list_problems(State(state): State<Arc<AppState>>) -> Response {
    match state.judge.problems().await {
        Ok(problems) => (StatusCode::OK, Json(problems)).into_response(),
        Err(e) => {
            error!(kind = %e.kind, error = %e.message, "Listing problems failed");
            (
                status_for(e.kind),
                Json(serde_json::json!({ "error": e.message, "kind": e.kind })),
            )
                .into_response()
        }
    }
}

/// GET /problems/{problem_id} - Problem statement with hidden cases redacted
pub async fn get_problem(
    State(state): State<Arc<AppState>>,
    Path(problem_id): Path<String>,
) -> Response {
    match state.judge.problem(&problem_id).await {
        Ok(problem) => {
            let problem = Problem {
                test_cases: problem.test_cases.iter().map(|tc| tc.redacted()).collect(),
                ..problem
            };
            (StatusCode::OK, Json(problem)).into_response()
        }
        Err(e) => (
            status_for(e.kind),
            Json(serde_json::json!({ "error": e.message, "kind": e.kind })),
        )
            .into_response(),
    }
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus exposition
pub async fn export_metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
