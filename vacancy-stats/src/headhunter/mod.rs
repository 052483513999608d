use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::salary::estimate;
use crate::{JobBoard, LanguageStat, SearchConfig};

pub const BASE_URL: &str = "https://api.hh.ru";

/// The API rejects anonymous clients; any stable UA string works.
const USER_AGENT: &str = "vacancy-stats/0.1 (hh-user-agent)";

const LOCAL_CURRENCY: &str = "RUR";

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request error: '{0}'")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
pub struct VacanciesPage {
    pub items: Vec<Vacancy>,
    pub found: u32,
    pub pages: u32,
}

#[derive(Debug, Deserialize)]
pub struct Vacancy {
    pub salary: Option<Salary>,
}

#[derive(Debug, Deserialize)]
pub struct Salary {
    pub from: Option<u32>,
    pub to: Option<u32>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    text: String,
    area: u32,
    page: u32,
    per_page: u32,
    currency: &'a str,
    date_from: &'a str,
}

/// HeadHunter API client.
pub struct HeadHunter {
    client: Client,
    base_url: String,
    config: SearchConfig,
}

impl HeadHunter {
    pub fn new(config: SearchConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: BASE_URL.to_owned(),
            config,
        }
    }

    /// Point the client at a different host, used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query_page(
        &self,
        language: &str,
        date_from: &str,
        page: u32,
    ) -> Result<VacanciesPage> {
        let url = format!("{}/vacancies", self.base_url);
        let query = SearchQuery {
            text: format!("Программист {}", language),
            area: self.config.area,
            page,
            per_page: self.config.per_page,
            currency: LOCAL_CURRENCY,
            date_from,
        };
        log::debug!("requesting hh vacancies, page: {}, text: {}", page, query.text);
        let body = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .json::<VacanciesPage>()
            .await?;
        Ok(body)
    }

    /// Fetch every result page for one language query.
    ///
    /// Page 0 announces the page count. A later page that fails to decode is
    /// dropped while pagination goes on; transport failures propagate.
    pub async fn fetch(&self, language: &str) -> Result<Vec<VacanciesPage>> {
        let date_from = (Utc::now() - Duration::days(self.config.lookback_days))
            .to_rfc3339_opts(SecondsFormat::Secs, false);
        let first = self.query_page(language, &date_from, 0).await?;
        let page_count = first.pages;
        let mut pages = vec![first];
        for page in 1..page_count {
            match self.query_page(language, &date_from, page).await {
                Ok(body) => pages.push(body),
                Err(Error::Request(e)) if e.is_decode() => {
                    log::error!(
                        "dropping malformed hh page {} for '{}': {}",
                        page,
                        language,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
        log::info!(
            "retrieved {} hh pages for '{}'",
            pages.len(),
            language
        );
        Ok(pages)
    }
}

/// Reduce fetched pages to one language statistic.
///
/// Only ruble postings with at least one salary bound count as processed;
/// `vacancies_found` is the `found` total of the first page, independent of
/// any filtering.
pub fn reduce(pages: &[VacanciesPage]) -> LanguageStat {
    let found = pages.first().map(|page| page.found).unwrap_or(0);
    let estimates = pages
        .iter()
        .flat_map(|page| &page.items)
        .filter_map(|vacancy| vacancy.salary.as_ref())
        .filter(|salary| salary.currency.as_deref() == Some(LOCAL_CURRENCY))
        .filter_map(|salary| estimate(salary.from, salary.to))
        .collect::<Vec<_>>();
    LanguageStat::from_estimates(found, &estimates)
}

#[async_trait]
impl JobBoard for HeadHunter {
    fn name(&self) -> &'static str {
        "HeadHunter"
    }

    fn title(&self) -> String {
        format!("HeadHunter {}", self.config.city_label)
    }

    async fn language_stat(
        &self,
        language: &str,
    ) -> std::result::Result<LanguageStat, crate::Error> {
        let pages = self.fetch(language).await?;
        Ok(reduce(&pages))
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn page(value: serde_json::Value) -> VacanciesPage {
        serde_json::from_value(value).expect("page fixture should deserialize")
    }

    fn test_config() -> SearchConfig {
        SearchConfig {
            languages: vec!["Rust".to_owned()],
            per_page: 2,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn test_deserialize_page_ignores_unknown_fields() {
        let page = page(json!({
            "items": [
                {
                    "id": "93353083",
                    "name": "Программист Python",
                    "salary": {"from": 150000, "to": null, "currency": "RUR", "gross": false}
                },
                {"id": "93353084", "name": "Django developer", "salary": null, "premium": false}
            ],
            "found": 2412,
            "pages": 25,
            "per_page": 100,
            "page": 0
        }));
        assert_eq!(page.found, 2412);
        assert_eq!(page.pages, 25);
        assert_eq!(page.items.len(), 2);
        assert!(page.items[1].salary.is_none());
    }

    #[test]
    fn test_reduce_counts_only_postings_with_an_estimate() {
        let pages = vec![page(json!({
            "items": [
                {"salary": {"from": 40000, "to": 60000, "currency": "RUR"}},
                {"salary": null}
            ],
            "found": 12,
            "pages": 1
        }))];
        assert_eq!(
            reduce(&pages),
            LanguageStat {
                vacancies_found: 12,
                vacancies_processed: 1,
                average_salary: 50000,
            }
        );
    }

    #[test]
    fn test_reduce_excludes_foreign_currency() {
        let pages = vec![page(json!({
            "items": [
                {"salary": {"from": 4000, "to": 6000, "currency": "EUR"}},
                {"salary": {"from": 100000, "to": null, "currency": "RUR"}}
            ],
            "found": 2,
            "pages": 1
        }))];
        let stat = reduce(&pages);
        assert_eq!(stat.vacancies_processed, 1);
        assert_eq!(stat.average_salary, 120000);
    }

    #[test]
    fn test_reduce_excludes_empty_salary_fork() {
        let pages = vec![page(json!({
            "items": [{"salary": {"from": null, "to": null, "currency": "RUR"}}],
            "found": 1,
            "pages": 1
        }))];
        let stat = reduce(&pages);
        assert_eq!(stat.vacancies_processed, 0);
        assert_eq!(stat.average_salary, 0);
    }

    #[test]
    fn test_reduce_without_pages_is_all_zero() {
        assert_eq!(
            reduce(&[]),
            LanguageStat {
                vacancies_found: 0,
                vacancies_processed: 0,
                average_salary: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_follows_page_count_from_first_page() {
        let mut server = mockito::Server::new_async().await;
        let page0 = server
            .mock("GET", "/vacancies")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "0".into()))
            .with_status(200)
            .with_body(
                json!({
                    "items": [{"salary": null}, {"salary": null}],
                    "found": 3,
                    "pages": 2
                })
                .to_string(),
            )
            .create_async()
            .await;
        let page1 = server
            .mock("GET", "/vacancies")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(
                json!({
                    "items": [{"salary": {"from": 90000, "to": null, "currency": "RUR"}}],
                    "found": 3,
                    "pages": 2
                })
                .to_string(),
            )
            .create_async()
            .await;

        let board = HeadHunter::new(test_config()).with_base_url(server.url());
        let pages = board.fetch("Rust").await.expect("fetch should succeed");

        page0.assert_async().await;
        page1.assert_async().await;
        assert_eq!(pages.len(), 2);
        assert_eq!(reduce(&pages).vacancies_processed, 1);
    }

    #[tokio::test]
    async fn test_fetch_drops_malformed_later_page() {
        let mut server = mockito::Server::new_async().await;
        let _page0 = server
            .mock("GET", "/vacancies")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "0".into()))
            .with_status(200)
            .with_body(json!({"items": [{"salary": null}], "found": 5, "pages": 3}).to_string())
            .create_async()
            .await;
        let _page1 = server
            .mock("GET", "/vacancies")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body("surely not json")
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/vacancies")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(json!({"items": [{"salary": null}], "found": 5, "pages": 3}).to_string())
            .create_async()
            .await;

        let board = HeadHunter::new(test_config()).with_base_url(server.url());
        let pages = board.fetch("Rust").await.expect("fetch should succeed");

        page2.assert_async().await;
        assert_eq!(pages.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_fails_on_malformed_first_page() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/vacancies")
            .with_status(400)
            .with_body(json!({"errors": [{"type": "bad_argument"}]}).to_string())
            .create_async()
            .await;

        let board = HeadHunter::new(test_config()).with_base_url(server.url());
        let result = board.fetch("Rust").await;

        assert!(matches!(result, Err(Error::Request(e)) if e.is_decode()));
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent_and_search_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/vacancies")
            .match_header("user-agent", USER_AGENT)
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("text".into(), "Программист Rust".into()),
                mockito::Matcher::UrlEncoded("area".into(), "1".into()),
                mockito::Matcher::UrlEncoded("currency".into(), "RUR".into()),
                mockito::Matcher::UrlEncoded("per_page".into(), "2".into()),
            ]))
            .with_status(200)
            .with_body(json!({"items": [], "found": 0, "pages": 1}).to_string())
            .create_async()
            .await;

        let board = HeadHunter::new(test_config()).with_base_url(server.url());
        let pages = board.fetch("Rust").await.expect("fetch should succeed");

        mock.assert_async().await;
        assert_eq!(reduce(&pages).vacancies_found, 0);
    }
}
