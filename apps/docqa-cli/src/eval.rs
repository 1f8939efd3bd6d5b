//! Keyword-based evaluation of the question answering pipeline.
//!
//! A suite is a TOML file of `[[case]]` tables. Each case is asked once and
//! scored by case-insensitive substring matching against its expected
//! keywords, which is a rough proxy for factual accuracy.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// How many expected keywords an answer must contain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCase {
    /// Category label, e.g. "Simple Fact" or "Negative Test".
    pub kind: String,
    pub question: String,
    pub expected_keywords: Vec<String>,
    #[serde(default, rename = "match")]
    pub match_mode: MatchMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalSuite {
    #[serde(default, rename = "case")]
    pub cases: Vec<EvalCase>,
}

impl EvalSuite {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("evaluation suite {} not found", path.display());
        }
        let suite: Self = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .with_context(|| format!("failed to parse evaluation suite {}", path.display()))?;
        suite.validate()?;
        Ok(suite)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let suite: Self = Figment::new().merge(Toml::string(toml)).extract()?;
        suite.validate()?;
        Ok(suite)
    }

    fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            bail!("evaluation suite has no cases");
        }
        for (i, case) in self.cases.iter().enumerate() {
            if case.question.trim().is_empty() {
                bail!("case {} has an empty question", i + 1);
            }
            if case.expected_keywords.iter().all(|k| k.trim().is_empty()) {
                bail!("case {} ({:?}) has no expected keywords", i + 1, case.question);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize { self.cases.len() }

    pub fn is_empty(&self) -> bool { self.cases.is_empty() }
}

pub fn check_accuracy(response: &str, keywords: &[String], mode: MatchMode) -> bool {
    let response = response.to_lowercase();
    let mut keywords = keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty());
    let found = |k: &str| response.contains(&k.to_lowercase());
    match mode {
        MatchMode::All => keywords.all(found),
        MatchMode::Any => keywords.any(found),
    }
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    /// 1-based position in the suite.
    pub id: usize,
    pub kind: String,
    pub question: String,
    pub response: String,
    pub correct: bool,
    pub elapsed: Duration,
}

impl CaseResult {
    pub fn verdict(&self) -> &'static str { if self.correct { "Correct" } else { "Incorrect" } }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "ID")]
    id: usize,
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Question")]
    question: &'a str,
    #[serde(rename = "Bot Response")]
    response: &'a str,
    #[serde(rename = "Accuracy (Automated)")]
    accuracy: &'a str,
    #[serde(rename = "Response Time (s)")]
    seconds: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EvalReport {
    pub results: Vec<CaseResult>,
}

impl EvalReport {
    pub fn total(&self) -> usize { self.results.len() }

    pub fn correct(&self) -> usize { self.results.iter().filter(|r| r.correct).count() }

    pub fn accuracy_pct(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.correct() as f64 * 100.0 / self.total() as f64
    }

    pub fn average_latency(&self) -> Duration {
        match u32::try_from(self.results.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.results.iter().map(|r| r.elapsed).sum::<Duration>() / n,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Overall Accuracy: {:.2}% ({}/{})\nAverage Response Time: {:.2}s",
            self.accuracy_pct(),
            self.correct(),
            self.total(),
            self.average_latency().as_secs_f64()
        )
    }

    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for r in &self.results {
            csv.serialize(CsvRow {
                id: r.id,
                kind: &r.kind,
                question: &r.question,
                response: r.response.trim(),
                accuracy: r.verdict(),
                seconds: (r.elapsed.as_secs_f64() * 100.0).round() / 100.0,
            })?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        self.write_csv_to(file)
    }
}

/// Asks every case through `answer`, timing each call. `on_case` sees each
/// result as soon as it is scored.
pub fn run_suite<A, P>(suite: &EvalSuite, mut answer: A, mut on_case: P) -> EvalReport
where
    A: FnMut(&str) -> String,
    P: FnMut(&CaseResult),
{
    let mut results = Vec::with_capacity(suite.len());
    for (i, case) in suite.cases.iter().enumerate() {
        let started = Instant::now();
        let response = answer(&case.question);
        let elapsed = started.elapsed();

        let result = CaseResult {
            id: i + 1,
            kind: case.kind.clone(),
            question: case.question.clone(),
            correct: check_accuracy(&response, &case.expected_keywords, case.match_mode),
            response,
            elapsed,
        };
        tracing::debug!(id = result.id, correct = result.correct, elapsed_ms = elapsed.as_millis() as u64, "case scored");
        on_case(&result);
        results.push(result);
    }
    EvalReport { results }
}
