use std::path::PathBuf;
use std::time::Duration;

pub const ARTICLE_URL_TEMPLATE: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC{}";

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:52.0) Gecko/20100101 Firefox/52.0";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Run settings: the two CLI positionals plus fixed defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub pmcids_file: PathBuf,
    pub output_dir: PathBuf,
    pub url_template: String,
    pub min_delay: Duration,
    pub mean_delay: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl Settings {
    pub fn new(pmcids_file: PathBuf, output_dir: PathBuf) -> Self {
        Settings {
            pmcids_file,
            output_dir,
            url_template: ARTICLE_URL_TEMPLATE.to_string(),
            min_delay: Duration::from_secs(2),
            mean_delay: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            user_agent: USER_AGENT.to_string(),
            accept: ACCEPT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
        }
    }
}
