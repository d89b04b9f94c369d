/// Result Interpreter
///
/// **Core Responsibility:**
/// Turn the oracle's raw answer into per-case verdicts or one top-level
/// error.
///
/// **Critical Properties:**
/// - Knows nothing about HTTP or the oracle's wire format
/// - Knows nothing about how the harness is generated, only its trailer
/// - Pure function: (raw oracle result, case count) → verdicts | error
///
/// **Policy (in order):**
/// 1. Oracle error → `OracleUnavailable` (or `ExecutionTimeout`)
/// 2. Output parses as the harness trailer → verdicts, verbatim
/// 3. Anything else → `CandidateProgramFailure` carrying the raw output
///
/// Step 3 is not an internal failure. Output that is not a verdict list
/// means the candidate's program never reached the trailer (syntax error,
/// top-level throw), so the oracle's text is the user's diagnostic.
///
/// **Comparison Rules:**
/// Pass/fail is decided inside the harness by comparing the serialized
/// result with `expectedOutput` as strings. No normalization happens here.

use crate::engine::OracleError;
use codesync_common::types::{ErrorKind, TopLevelError, Verdict};

/// What the harness output turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessOutput {
    /// The trailer ran and printed one verdict per submitted case
    Parsed(Vec<Verdict>),
    /// Anything else the oracle captured
    RawDiagnostic(String),
}

/// Classify captured output.
///
/// A well-formed list with the wrong number of entries is treated as a raw
/// diagnostic so a partial list is never reported.
pub fn parse_harness_output(output: &str, expected_cases: usize) -> HarnessOutput {
    match serde_json::from_str::<Vec<Verdict>>(output.trim()) {
        Ok(verdicts) if verdicts.len() == expected_cases => HarnessOutput::Parsed(verdicts),
        _ => HarnessOutput::RawDiagnostic(output.to_string()),
    }
}

/// Interpret one oracle round trip for a submission of `expected_cases` cases
pub fn interpret(
    raw: Result<String, OracleError>,
    expected_cases: usize,
) -> Result<Vec<Verdict>, TopLevelError> {
    let output = raw.map_err(|e| TopLevelError::new(e.kind(), e.diagnostic()))?;

    match parse_harness_output(&output, expected_cases) {
        HarnessOutput::Parsed(verdicts) => Ok(verdicts),
        HarnessOutput::RawDiagnostic(text) => {
            let message = if text.trim().is_empty() {
                "program produced no output".to_string()
            } else {
                text
            };
            Err(TopLevelError::new(ErrorKind::CandidateProgramFailure, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SUM_OK: &str =
        r#"[{"passed":true,"actual":"[0,1]","expected":"[0,1]","input":"[[2,7,11,15],9]"}]"#;

    #[test]
    fn test_parse_trailer_with_surrounding_whitespace() {
        let output = format!("\n  {}\n", TWO_SUM_OK);
        match parse_harness_output(&output, 1) {
            HarnessOutput::Parsed(verdicts) => {
                assert_eq!(
                    verdicts[0],
                    Verdict::Completed {
                        passed: true,
                        actual: "[0,1]".to_string(),
                        expected: "[0,1]".to_string(),
                        input: "[[2,7,11,15],9]".to_string(),
                    }
                );
            }
            other => panic!("expected parsed verdicts, got {:?}", other),
        }
    }

    #[test]
    fn test_syntax_error_output_is_raw_diagnostic() {
        let output = "/home/script.js:3\n}\n^\n\nSyntaxError: Unexpected token '}'\n";
        assert_eq!(
            parse_harness_output(output, 1),
            HarnessOutput::RawDiagnostic(output.to_string())
        );
    }

    #[test]
    fn test_count_mismatch_is_raw_diagnostic() {
        assert!(matches!(
            parse_harness_output(TWO_SUM_OK, 2),
            HarnessOutput::RawDiagnostic(_)
        ));
    }

    #[test]
    fn test_candidate_prints_before_trailer() {
        let output = format!("debug: hello\n{}", TWO_SUM_OK);
        assert!(matches!(
            parse_harness_output(&output, 1),
            HarnessOutput::RawDiagnostic(_)
        ));
    }

    #[test]
    fn test_empty_case_list() {
        assert_eq!(parse_harness_output("[]\n", 0), HarnessOutput::Parsed(vec![]));
    }

    #[test]
    fn test_interpret_success_is_verbatim() {
        let verdicts = interpret(Ok(TWO_SUM_OK.to_string()), 1).unwrap();
        assert_eq!(verdicts.len(), 1);
        assert!(verdicts[0].passed());
        assert_eq!(verdicts[0].actual(), Some("[0,1]"));
    }

    #[test]
    fn test_interpret_per_case_errors_stay_inline() {
        let output = r#"[
            {"passed":false,"error":"SyntaxError: Unexpected token o in JSON","expected":"1","input":"oops"},
            {"passed":true,"actual":"2","expected":"2","input":"[2]"}
        ]"#;
        let verdicts = interpret(Ok(output.to_string()), 2).unwrap();
        assert_eq!(verdicts[0].error(), Some("SyntaxError: Unexpected token o in JSON"));
        assert!(verdicts[1].passed());
    }

    #[test]
    fn test_interpret_candidate_failure_keeps_raw_text() {
        let output = "ReferenceError: twoSum is not defined\n    at Object.<anonymous>";
        let err = interpret(Ok(output.to_string()), 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CandidateProgramFailure);
        assert_eq!(err.message, output);
    }

    #[test]
    fn test_interpret_empty_output() {
        let err = interpret(Ok("   \n".to_string()), 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CandidateProgramFailure);
        assert_eq!(err.message, "program produced no output");
    }

    #[test]
    fn test_interpret_transport_error() {
        let err = interpret(Err(OracleError::Transport("connection refused".to_string())), 3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OracleUnavailable);
        assert!(err.message.contains("connection refused"));
    }

    #[test]
    fn test_interpret_oracle_timeout() {
        let err = interpret(
            Err(OracleError::ExecutionTimeout {
                output: "JDoodle - Timeout".to_string(),
            }),
            1,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExecutionTimeout);
    }
}
