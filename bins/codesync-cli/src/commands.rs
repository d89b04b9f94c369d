// CLI commands for CodeSync
use anyhow::{Context, Result, bail};
use chrono::Utc;
use codesync_common::config::Config;
use codesync_common::types::{Outcome, SubmissionReport, Verdict};
use codesync_judge::catalogue::InMemoryCatalogue;
use codesync_judge::config::LanguageConfigManager;
use codesync_judge::engine::JDoodleOracle;
use codesync_judge::harness;
use codesync_judge::resolver::EntryPointRegistry;
use codesync_judge::Judge;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

fn read_source(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

/// Judge wired to the file catalogue and the oracle from the environment
fn build_judge(config: &Config) -> Result<Judge> {
    let languages = LanguageConfigManager::load(&config.languages_path)?;
    let entry_points = EntryPointRegistry::load(&config.entry_points_path)?;
    let catalogue = InMemoryCatalogue::load(&config.problems_path)?;
    let oracle = JDoodleOracle::new(&config.oracle)?;

    Ok(Judge::new(
        languages,
        entry_points,
        Arc::new(catalogue),
        Arc::new(oracle),
    ))
}

/// Print the harness for a problem and source file
pub fn print_harness(
    problem_id: &str,
    file: &Path,
    problems: &Path,
    entry_points: &Path,
) -> Result<()> {
    let catalogue = InMemoryCatalogue::load(problems)?;
    let registry = EntryPointRegistry::load(entry_points)?;

    let Some(problem) = catalogue.problems().find(|p| p.id == problem_id) else {
        bail!("Problem '{}' not found in {}", problem_id, problems.display());
    };

    let entry_point = registry.resolve(problem_id);
    if entry_point.is_none() {
        eprintln!("⚠ No entry point registered for '{}'; every case will report null", problem_id);
    }

    let source = read_source(file)?;
    print!("{}", harness::compile(&source, entry_point, &problem.test_cases));
    Ok(())
}

/// Grade a source file and print the verdicts
pub async fn submit(problem_id: &str, file: &Path, language: &str, json: bool) -> Result<()> {
    let config = Config::from_env();
    let judge = build_judge(&config)?;
    let source = read_source(file)?;

    if !json {
        println!("→ Submitting {} ({}) for problem {}", file.display(), language, problem_id);
        println!();
    }

    let outcome = Outcome::from(judge.evaluate(problem_id, language, &source).await);

    if json {
        let report = SubmissionReport {
            submission_id: Uuid::new_v4(),
            problem_id: problem_id.to_string(),
            evaluated_at: Utc::now(),
            outcome: outcome.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_outcome(&outcome));
    }

    match outcome {
        Outcome::Verdicts { passed, total, .. } if passed == total => Ok(()),
        Outcome::Verdicts { passed, total, .. } => bail!("{} of {} test cases failed", total - passed, total),
        Outcome::Error { kind, .. } => bail!("Submission was not graded: {}", kind),
    }
}

/// Run a file unmodified on the oracle
pub async fn run(language: &str, file: &Path) -> Result<()> {
    let config = Config::from_env();
    let judge = build_judge(&config)?;
    let source = read_source(file)?;

    match judge.run_raw(language, &source).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => bail!("{}", e),
    }
}

/// Push every problem in a JSON file into the Redis catalogue
pub async fn seed(problems: &Path, redis_url: &str) -> Result<()> {
    let catalogue = InMemoryCatalogue::load(problems)?;
    if catalogue.is_empty() {
        bail!("No problems found in {}", problems.display());
    }

    println!("🚀 Seeding {} problems into {}", catalogue.len(), redis_url);

    let client = redis::Client::open(redis_url)
        .with_context(|| format!("Invalid Redis URL: {}", redis_url))?;
    let mut conn = redis::aio::ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")?;

    let mut problems: Vec<_> = catalogue.problems().collect();
    problems.sort_by(|a, b| a.id.cmp(&b.id));

    for problem in problems {
        codesync_common::redis::store_problem(&mut conn, problem)
            .await
            .with_context(|| format!("Failed to store problem '{}'", problem.id))?;
        println!("  ✓ {} ({} test cases)", problem.id, problem.test_cases.len());
    }

    let ids = codesync_common::redis::list_problem_ids(&mut conn).await?;
    println!("✅ Catalogue now holds {} problems", ids.len());

    Ok(())
}

/// Human-readable report of one submission
pub fn render_outcome(outcome: &Outcome) -> String {
    OutcomeReport(outcome).to_string()
}

struct OutcomeReport<'a>(&'a Outcome);

impl fmt::Display for OutcomeReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Outcome::Verdicts { passed, total, verdicts } => {
                for (idx, verdict) in verdicts.iter().enumerate() {
                    writeln!(f, "  Test {} → {}", idx + 1, if verdict.passed() { "PASS" } else { "FAIL" })?;
                    if verdict.passed() {
                        continue;
                    }
                    writeln!(f, "    Input:    {}", verdict.input())?;
                    writeln!(f, "    Expected: {}", verdict.expected())?;
                    match verdict {
                        Verdict::Completed { actual, .. } => writeln!(f, "    Got:      {}", actual)?,
                        Verdict::Errored { error, .. } => writeln!(f, "    Error:    {}", error)?,
                    }
                }
                writeln!(f)?;
                writeln!(f, "  Passed: {} / {}", passed, total)
            }
            Outcome::Error { kind, message } => {
                writeln!(f, "✗ {}", kind)?;
                for line in message.lines() {
                    writeln!(f, "    {}", line)?;
                }
                Ok(())
            }
        }
    }
}
