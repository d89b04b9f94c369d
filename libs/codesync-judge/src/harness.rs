/// Harness Compiler
///
/// **Core Responsibility:**
/// Wrap candidate source in a self-contained JavaScript program that runs
/// every test case and prints the verdict list as one JSON array.
///
/// **Harness layout:**
/// 1. Candidate source, verbatim
/// 2. Test case list as a JSON literal (no further I/O needed)
/// 3. Per-case loop, each case inside its own try/catch
/// 4. Trailer printing `JSON.stringify(results)` on a single line
///
/// The candidate is never parsed or sandboxed here. A top-level syntax
/// error in it breaks the whole harness before any case runs; the
/// evaluator reports that as a candidate failure.
///
/// All string templating for the oracle lives in this module.

use crate::resolver::EntryPoint;
use codesync_common::types::TestCase;
use serde_json::{json, Value};

const CASES_SLOT: &str = "/*@cases*/";
const INVOKE_SLOT: &str = "/*@invoke*/";

const TRAILER: &str = r#"
;(() => {
  const __codesyncCases = /*@cases*/;
  const __codesyncDescribe = (err) => {
    try {
      return err instanceof Error ? `${err.name}: ${err.message}` : String(err);
    } catch (_) {
      return "unprintable error";
    }
  };
  const __codesyncResults = [];
  for (const __tc of __codesyncCases) {
    try {
      const __args = JSON.parse(__tc.input);
      if (!Array.isArray(__args)) {
        throw new TypeError("test case input must be a JSON array");
      }
      const __value = /*@invoke*/;
      const __json = JSON.stringify(__value);
      const __actual = __json === undefined ? "null" : __json;
      __codesyncResults.push({
        passed: __actual === __tc.expectedOutput,
        actual: __actual,
        expected: __tc.expectedOutput,
        input: __tc.input,
      });
    } catch (__err) {
      __codesyncResults.push({
        passed: false,
        error: __codesyncDescribe(__err),
        expected: __tc.expectedOutput,
        input: __tc.input,
      });
    }
  }
  console.log(JSON.stringify(__codesyncResults));
})();
"#;

/// Language tag of the programs this module emits
pub const HARNESS_LANGUAGE: &str = "javascript";

/// Build the harness for one submission.
///
/// With no entry point every case yields the serialized `null` without
/// calling into the candidate.
pub fn compile(
    candidate_source: &str,
    entry_point: Option<&EntryPoint>,
    test_cases: &[TestCase],
) -> String {
    let cases = Value::Array(
        test_cases
            .iter()
            .map(|tc| json!({ "input": tc.input, "expectedOutput": tc.expected_output }))
            .collect(),
    )
    .to_string();

    let invoke = match entry_point {
        Some(ep) => format!("{}(...__args)", ep),
        None => "null".to_string(),
    };

    // Invoke first: the cases literal is user data and may contain either slot marker.
    let trailer = TRAILER.replace(INVOKE_SLOT, &invoke).replacen(CASES_SLOT, &cases, 1);

    let mut script = String::with_capacity(candidate_source.len() + trailer.len() + 1);
    script.push_str(candidate_source);
    // A trailing line comment in the candidate must not swallow the trailer.
    script.push('\n');
    script.push_str(&trailer);
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(input: &str, expected: &str) -> TestCase {
        TestCase {
            input: input.to_string(),
            expected_output: expected.to_string(),
            is_hidden: false,
        }
    }

    #[test]
    fn test_candidate_source_is_verbatim_prefix() {
        let source = "function twoSum(nums, target) { return [0, 1]; } // trailing";
        let ep = EntryPoint::new("twoSum").unwrap();
        let script = compile(source, Some(&ep), &[case("[[2,7,11,15],9]", "[0,1]")]);
        assert!(script.starts_with(source));
        assert_eq!(&script[source.len()..source.len() + 1], "\n");
    }

    #[test]
    fn test_entry_point_invoked_with_spread_args() {
        let ep = EntryPoint::new("twoSum").unwrap();
        let script = compile("", Some(&ep), &[case("[[2,7,11,15],9]", "[0,1]")]);
        assert!(script.contains("const __value = twoSum(...__args);"));
        assert!(!script.contains(INVOKE_SLOT));
        assert!(!script.contains(CASES_SLOT));
    }

    #[test]
    fn test_unknown_entry_point_yields_null() {
        let script = compile("function f() {}", None, &[case("[1]", "null")]);
        assert!(script.contains("const __value = null;"));
    }

    #[test]
    fn test_cases_embedded_as_json_literal() {
        let cases = vec![case("[[2,7,11,15],9]", "[0,1]"), case("[[3,3],6]", "[0,1]")];
        let script = compile("", None, &cases);
        let line = script
            .lines()
            .find(|l| l.trim_start().starts_with("const __codesyncCases = "))
            .unwrap();
        let literal = line
            .trim_start()
            .trim_start_matches("const __codesyncCases = ")
            .trim_end_matches(';');
        let parsed: serde_json::Value = serde_json::from_str(literal).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["input"], "[[2,7,11,15],9]");
        assert_eq!(parsed[1]["expectedOutput"], "[0,1]");
    }

    #[test]
    fn test_slot_markers_in_test_data_are_not_expanded() {
        let ep = EntryPoint::new("solve").unwrap();
        let script = compile("", Some(&ep), &[case("[\"/*@invoke*/\"]", "\"/*@cases*/\"")]);
        assert_eq!(script.matches("solve(...__args)").count(), 1);
        assert!(script.contains(r#"\"/*@invoke*/\""#));
    }

    #[test]
    fn test_single_trailer_line_prints_results() {
        let script = compile("", None, &[]);
        assert_eq!(script.matches("console.log(").count(), 1);
        assert!(script.contains("console.log(JSON.stringify(__codesyncResults));"));
    }
}
