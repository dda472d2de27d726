use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

use crate::config::Settings;
use crate::pmcids::Pmcid;

/// Something that can GET a page and hand back its raw body.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(&settings.accept)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&settings.accept_language)?,
        );

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(HttpFetcher { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?;
        let body = response
            .bytes()
            .with_context(|| format!("Failed to read body of {}", url))?;
        Ok(body.to_vec())
    }
}

/// Fill the `{}` placeholder of `template` with the bare PMCID.
pub fn article_url(template: &str, pmcid: &Pmcid) -> String {
    template.replacen("{}", pmcid.as_str(), 1)
}
