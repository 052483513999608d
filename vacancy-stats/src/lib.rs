pub mod config;
pub mod headhunter;
pub mod report;
pub mod salary;
pub mod superjob;

use async_trait::async_trait;
use thiserror::Error;

pub use config::SearchConfig;

#[derive(Debug, Error)]
pub enum Error {
    #[error("headhunter: {0}")]
    HeadHunter(#[from] headhunter::Error),
    #[error("superjob: {0}")]
    SuperJob(#[from] superjob::Error),
}

/// Aggregated salary statistics for one search language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStat {
    pub vacancies_found: u32,
    pub vacancies_processed: u32,
    pub average_salary: u32,
}

impl LanguageStat {
    /// Build a stat from the per-posting salary estimates of one language.
    ///
    /// The average is the truncated mean of the estimates, 0 when no posting
    /// qualified.
    pub fn from_estimates(vacancies_found: u32, estimates: &[f64]) -> Self {
        let average_salary = if estimates.is_empty() {
            0
        } else {
            (estimates.iter().sum::<f64>() / estimates.len() as f64) as u32
        };
        Self {
            vacancies_found,
            vacancies_processed: estimates.len() as u32,
            average_salary,
        }
    }
}

/// One job-site API that can turn a language query into salary statistics.
///
/// Each site keeps its own wire types and pagination rules; the trait only
/// unifies the composed fetch + reduce operation, so the orchestrator can
/// drive both sites through `Box<dyn JobBoard>`.
#[async_trait]
pub trait JobBoard: Send + Sync {
    fn name(&self) -> &'static str;

    /// Table title, e.g. "HeadHunter Moscow".
    fn title(&self) -> String;

    /// Fetch every result page for `language` and reduce them into one stat.
    async fn language_stat(&self, language: &str) -> Result<LanguageStat, Error>;
}

/// Collect stats for every language in order, one request series at a time.
///
/// A language whose fetch fails is logged and dropped from the rows; the
/// remaining languages still run.
pub async fn collect_stats(
    board: &dyn JobBoard,
    languages: &[String],
) -> Vec<(String, LanguageStat)> {
    let mut rows = Vec::with_capacity(languages.len());
    for language in languages {
        log::info!("collecting {} statistics for '{}'", board.name(), language);
        match board.language_stat(language).await {
            Ok(stat) => rows.push((language.clone(), stat)),
            Err(e) => log::error!("skipping '{}' on {}: {}", language, board.name(), e),
        }
    }
    rows
}
