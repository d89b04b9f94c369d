use crate::types::Problem;
use redis::{AsyncCommands, RedisResult};

/// Redis key semantics for the problem catalogue.
/// The seeding CLI and the API must agree on these, so they live here.

pub const PROBLEM_PREFIX: &str = "codesync:problem";
pub const PROBLEM_INDEX: &str = "codesync:problems";

/// Generate the key holding one problem document
pub fn problem_key(problem_id: &str) -> String {
    format!("{}:{}", PROBLEM_PREFIX, problem_id)
}

/// Store a problem document and register its id in the index set
pub async fn store_problem(
    conn: &mut redis::aio::ConnectionManager,
    problem: &Problem,
) -> RedisResult<()> {
    let payload = serde_json::to_string(problem)
        .map_err(|e| redis::RedisError::from((redis::ErrorKind::TypeError, "serialization error", e.to_string())))?;

    let _: () = conn.set(problem_key(&problem.id), payload).await?;
    let _: () = conn.sadd(PROBLEM_INDEX, &problem.id).await?;

    Ok(())
}

/// Fetch a problem document, `None` if the id is unknown
pub async fn get_problem(
    conn: &mut redis::aio::ConnectionManager,
    problem_id: &str,
) -> RedisResult<Option<Problem>> {
    let payload: Option<String> = conn.get(problem_key(problem_id)).await?;

    match payload {
        Some(data) => {
            let problem: Problem = serde_json::from_str(&data)
                .map_err(|e| redis::RedisError::from((redis::ErrorKind::TypeError, "deserialization error", e.to_string())))?;
            Ok(Some(problem))
        }
        None => Ok(None),
    }
}

/// List every registered problem id
pub async fn list_problem_ids(
    conn: &mut redis::aio::ConnectionManager,
) -> RedisResult<Vec<String>> {
    let mut ids: Vec<String> = conn.smembers(PROBLEM_INDEX).await?;
    ids.sort();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_key_format() {
        assert_eq!(problem_key("two-sum"), "codesync:problem:two-sum");
    }

    #[test]
    fn test_problem_key_deterministic() {
        assert_eq!(problem_key("valid-parentheses"), problem_key("valid-parentheses"));
        assert!(problem_key("x").starts_with(PROBLEM_PREFIX));
    }
}
