use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use vacancy_stats::headhunter::HeadHunter;
use vacancy_stats::superjob::SuperJob;
use vacancy_stats::{collect_stats, report, JobBoard, SearchConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Job boards to query; defaults to both, HeadHunter first
    #[clap(long, value_enum)]
    site: Vec<Site>,

    /// Languages to compare, replacing the built-in list
    #[clap(long)]
    language: Vec<String>,

    /// Vacancies per API page
    #[clap(long)]
    per_page: Option<u32>,

    /// HeadHunter area code of the city
    #[clap(long)]
    area: Option<u32>,

    /// SuperJob town name
    #[clap(long)]
    town: Option<String>,

    /// City name shown in the table titles
    #[clap(long)]
    city_label: Option<String>,

    /// SuperJob server-side minimum salary, in rubles
    #[clap(long)]
    salary_floor: Option<u32>,

    /// Only count HeadHunter postings newer than this many days
    #[clap(long)]
    days: Option<i64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Site {
    Hh,
    Sj,
}

fn search_config(args: &Cli) -> SearchConfig {
    let mut config = SearchConfig::default();
    if !args.language.is_empty() {
        config.languages = args.language.clone();
    }
    if let Some(per_page) = args.per_page {
        config.per_page = per_page;
    }
    if let Some(area) = args.area {
        config.area = area;
    }
    if let Some(town) = &args.town {
        config.town = town.clone();
    }
    if let Some(city_label) = &args.city_label {
        config.city_label = city_label.clone();
    }
    if let Some(salary_floor) = args.salary_floor {
        config.payment_floor = salary_floor;
    }
    if let Some(days) = args.days {
        config.lookback_days = days;
    }
    config
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = Cli::parse();
    let config = search_config(&args);
    let sites = if args.site.is_empty() {
        vec![Site::Hh, Site::Sj]
    } else {
        args.site.clone()
    };

    let mut boards: Vec<Box<dyn JobBoard>> = Vec::new();
    for site in sites {
        match site {
            Site::Hh => boards.push(Box::new(HeadHunter::new(config.clone()))),
            Site::Sj => {
                let token = std::env::var("SJ_TOKEN").expect("SJ_TOKEN not set");
                boards.push(Box::new(SuperJob::new(token, config.clone())));
            }
        }
    }

    for board in &boards {
        let rows = collect_stats(board.as_ref(), &config.languages).await;
        log::info!("rendering {} table with {} rows", board.name(), rows.len());
        println!("{}", report::render(&board.title(), &rows));
    }
}
