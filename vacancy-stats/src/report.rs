use comfy_table::presets::ASCII_FULL;
use comfy_table::Table;

use crate::LanguageStat;

const HEADER: [&str; 4] = [
    "Язык программирования",
    "Вакансий найдено",
    "Вакансий обработано",
    "Средняя зарплата",
];

/// Render one source's statistics as a titled ASCII table.
///
/// Rows keep the order they were collected in.
pub fn render(title: &str, rows: &[(String, LanguageStat)]) -> String {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(HEADER);
    for (language, stat) in rows {
        table.add_row(vec![
            language.clone(),
            stat.vacancies_found.to_string(),
            stat.vacancies_processed.to_string(),
            stat.average_salary.to_string(),
        ]);
    }
    format!("{}\n{}", title, table)
}
