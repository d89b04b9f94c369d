// Problem catalogue consumed by the pipeline.
// Read-only from the judge's point of view; seeding happens through the CLI.

use anyhow::{Context, Result};
use async_trait::async_trait;
use codesync_common::redis as keys;
use codesync_common::types::{Problem, ProblemSummary};
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
#[error("problem catalogue unavailable: {0}")]
pub struct CatalogueError(pub String);

#[async_trait]
pub trait ProblemCatalogue: Send + Sync {
    /// `Ok(None)` when the id is unknown
    async fn get_problem(&self, problem_id: &str) -> Result<Option<Problem>, CatalogueError>;

    /// Every catalogued problem, sorted by id
    async fn list_problems(&self) -> Result<Vec<ProblemSummary>, CatalogueError>;
}

/// Catalogue backed by the Redis keys in `codesync_common::redis`
#[derive(Clone)]
pub struct RedisCatalogue {
    conn: ConnectionManager,
}

impl RedisCatalogue {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .with_context(|| format!("Invalid Redis URL: {}", redis_url))?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self::new(conn))
    }
}

#[async_trait]
impl ProblemCatalogue for RedisCatalogue {
    async fn get_problem(&self, problem_id: &str) -> Result<Option<Problem>, CatalogueError> {
        // ConnectionManager is a cheap handle onto a shared multiplexed connection
        let mut conn = self.conn.clone();
        keys::get_problem(&mut conn, problem_id)
            .await
            .map_err(|e| CatalogueError(e.to_string()))
    }

    async fn list_problems(&self) -> Result<Vec<ProblemSummary>, CatalogueError> {
        let mut conn = self.conn.clone();
        let ids = keys::list_problem_ids(&mut conn)
            .await
            .map_err(|e| CatalogueError(e.to_string()))?;

        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            match keys::get_problem(&mut conn, &id).await {
                Ok(Some(problem)) => summaries.push(ProblemSummary::from(&problem)),
                Ok(None) => warn!(problem_id = %id, "Indexed problem has no document"),
                Err(e) => return Err(CatalogueError(e.to_string())),
            }
        }
        Ok(summaries)
    }
}

/// Catalogue held in memory, loaded from a JSON array of problems
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogue {
    problems: HashMap<String, Problem>,
}

impl InMemoryCatalogue {
    pub fn new(problems: Vec<Problem>) -> Self {
        for problem in &problems {
            for (idx, tc) in problem.test_cases.iter().enumerate() {
                if !tc.has_array_input() {
                    warn!(
                        problem_id = %problem.id,
                        test_case = idx,
                        "Test case input is not a JSON array; it will fail at evaluation"
                    );
                }
            }
        }

        Self {
            problems: problems.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let problems: Vec<Problem> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Self::new(problems))
    }

    pub fn problems(&self) -> impl Iterator<Item = &Problem> {
        self.problems.values()
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

#[async_trait]
impl ProblemCatalogue for InMemoryCatalogue {
    async fn get_problem(&self, problem_id: &str) -> Result<Option<Problem>, CatalogueError> {
        Ok(self.problems.get(problem_id).cloned())
    }

    async fn list_problems(&self) -> Result<Vec<ProblemSummary>, CatalogueError> {
        let mut summaries: Vec<ProblemSummary> = self.problems().map(ProblemSummary::from).collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::EntryPointRegistry;

    fn shipped() -> InMemoryCatalogue {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/problems.json");
        InMemoryCatalogue::load(&path).unwrap()
    }

    #[tokio::test]
    async fn test_shipped_problems_load() {
        let catalogue = shipped();
        let two_sum = catalogue.get_problem("two-sum").await.unwrap().unwrap();
        assert_eq!(two_sum.test_cases[0].input, "[[2,7,11,15],9]");
        assert_eq!(two_sum.test_cases[0].expected_output, "[0,1]");
        assert!(catalogue.get_problem("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_problems_sorted() {
        let summaries = shipped().list_problems().await.unwrap();
        assert_eq!(summaries.len(), 6);
        assert_eq!(summaries[0].id, "climbing-stairs");
        assert!(summaries.windows(2).all(|w| w[0].id < w[1].id));
        let two_sum = summaries.iter().find(|s| s.id == "two-sum").unwrap();
        assert_eq!(two_sum.title, "Two Sum");
    }

    #[test]
    fn test_shipped_problems_are_well_formed() {
        let registry = EntryPointRegistry::builtin();
        for problem in shipped().problems() {
            assert!(!problem.test_cases.is_empty(), "{} has no test cases", problem.id);
            assert!(problem.test_cases.iter().all(|tc| tc.has_array_input()), "{}", problem.id);
            assert!(registry.resolve(&problem.id).is_some(), "{} has no entry point", problem.id);
            assert!(problem.starter_code.contains_key("javascript"), "{}", problem.id);
        }
    }
}
