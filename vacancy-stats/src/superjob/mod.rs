use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::salary::estimate;
use crate::{JobBoard, LanguageStat, SearchConfig};

pub const BASE_URL: &str = "https://api.superjob.ru";

/// Header carrying the application token.
const TOKEN_HEADER: &str = "X-Api-App-Id";

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request error: '{0}'")]
    Request(#[from] reqwest::Error),
    #[error("request not ok, status {status}: '{url}'")]
    RequestNotOk { status: StatusCode, url: String },
}

#[derive(Debug, Deserialize)]
pub struct VacanciesPage {
    pub objects: Vec<Vacancy>,
    pub total: u32,
}

/// A zero payment bound means the posting left it unspecified.
#[derive(Debug, Deserialize)]
pub struct Vacancy {
    pub payment_from: u32,
    pub payment_to: u32,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    keyword: String,
    town: &'a str,
    payment_from: u32,
    page: u32,
    count: u32,
}

/// Page count implied by a reported result total.
fn total_pages(total: u32, per_page: u32) -> u32 {
    total.div_ceil(per_page.max(1))
}

fn bound(value: u32) -> Option<u32> {
    (value != 0).then_some(value)
}

/// SuperJob API client.
pub struct SuperJob {
    client: Client,
    base_url: String,
    token: String,
    config: SearchConfig,
}

impl SuperJob {
    pub fn new(token: String, config: SearchConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: BASE_URL.to_owned(),
            token,
            config,
        }
    }

    /// Point the client at a different host, used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn query_page(&self, language: &str, page: u32) -> Result<reqwest::Response> {
        let url = format!("{}/2.0/vacancies/", self.base_url);
        let query = SearchQuery {
            keyword: format!("{} Программист", language),
            town: &self.config.town,
            payment_from: self.config.payment_floor,
            page,
            count: self.config.per_page,
        };
        log::debug!(
            "requesting sj vacancies, page: {}, keyword: {}",
            page,
            query.keyword
        );
        let resp = self
            .client
            .get(&url)
            .header(TOKEN_HEADER, self.token.as_str())
            .query(&query)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::RequestNotOk { status, url });
        }
        Ok(resp)
    }

    /// Fetch result pages for one language query.
    ///
    /// The `total` reported by page 0 bounds the page count, but the first
    /// empty page ends the loop regardless and is itself discarded. A later
    /// page that fails to decode is dropped while pagination goes on.
    pub async fn fetch(&self, language: &str) -> Result<Vec<VacanciesPage>> {
        let first = self
            .query_page(language, 0)
            .await?
            .json::<VacanciesPage>()
            .await?;
        if first.objects.is_empty() {
            log::info!("no sj vacancies for '{}'", language);
            return Ok(Vec::new());
        }
        let page_count = total_pages(first.total, self.config.per_page);
        let mut pages = vec![first];
        for page in 1..page_count {
            let resp = self.query_page(language, page).await?;
            match resp.json::<VacanciesPage>().await {
                Ok(body) => {
                    if body.objects.is_empty() {
                        break;
                    }
                    pages.push(body);
                }
                Err(e) if e.is_decode() => {
                    log::error!(
                        "dropping malformed sj page {} for '{}': {}",
                        page,
                        language,
                        e
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        log::info!("retrieved {} sj pages for '{}'", pages.len(), language);
        Ok(pages)
    }
}

/// Reduce fetched pages to one language statistic.
///
/// The API already filtered by town and salary floor, so every posting with
/// at least one payment bound counts; `vacancies_found` is the reported
/// `total` of the first page.
pub fn reduce(pages: &[VacanciesPage]) -> LanguageStat {
    let found = pages.first().map(|page| page.total).unwrap_or(0);
    let estimates = pages
        .iter()
        .flat_map(|page| &page.objects)
        .filter_map(|vacancy| estimate(bound(vacancy.payment_from), bound(vacancy.payment_to)))
        .collect::<Vec<_>>();
    LanguageStat::from_estimates(found, &estimates)
}

#[async_trait]
impl JobBoard for SuperJob {
    fn name(&self) -> &'static str {
        "SuperJob"
    }

    fn title(&self) -> String {
        format!("SuperJob {}", self.config.city_label)
    }

    async fn language_stat(
        &self,
        language: &str,
    ) -> std::result::Result<LanguageStat, crate::Error> {
        let pages = self.fetch(language).await?;
        Ok(reduce(&pages))
    }
}
