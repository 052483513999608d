/// Search parameters shared by both job boards.
///
/// The CLI and the tests inject their own values; defaults reproduce the
/// Moscow comparison run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Languages to compare; also the table row order.
    pub languages: Vec<String>,
    /// HeadHunter numeric area code (1 = Moscow).
    pub area: u32,
    /// SuperJob town name.
    pub town: String,
    /// City name used in table titles.
    pub city_label: String,
    /// Vacancies per API page.
    pub per_page: u32,
    /// SuperJob server-side minimum salary filter, in rubles.
    pub payment_floor: u32,
    /// HeadHunter date window: only postings newer than this many days.
    pub lookback_days: i64,
}

pub const DEFAULT_LANGUAGES: [&str; 6] = [
    "Python",
    "Java",
    "Javascript",
    "Typescript",
    "Go",
    "C++",
];

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES
                .into_iter()
                .map(String::from)
                .collect(),
            area: 1,
            town: "Москва".to_owned(),
            city_label: "Moscow".to_owned(),
            per_page: 100,
            payment_floor: 50_000,
            lookback_days: 31,
        }
    }
}
