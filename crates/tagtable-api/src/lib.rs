// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tagtable_app::Tag;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.3";
pub const DEFAULT_SITE: &str = "stackoverflow";
pub const DEFAULT_SORT: &str = "popular";
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    pub site: String,
    pub sort: String,
    pub page_size: u32,
}

impl Default for TagQuery {
    fn default() -> Self {
        Self {
            site: DEFAULT_SITE.to_owned(),
            sort: DEFAULT_SORT.to_owned(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl TagQuery {
    pub fn validate(&self) -> Result<()> {
        if self.site.trim().is_empty() {
            bail!("api.site must not be empty");
        }
        if self.sort.trim().is_empty() {
            bail!("api.sort must not be empty");
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            bail!(
                "api.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TagPage {
    pub items: Vec<Tag>,
    #[serde(default)]
    pub has_more: bool,
    pub quota_max: Option<i64>,
    pub quota_remaining: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        Url::parse(&base_url).with_context(|| format!("parse api.base_url {base_url:?}"))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn tags_url(&self, query: &TagQuery) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/tags", self.base_url))
            .with_context(|| format!("build tags URL from {}", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("pagesize", &query.page_size.to_string())
            .append_pair("sort", &query.sort)
            .append_pair("site", &query.site);
        Ok(url)
    }

    pub fn fetch_page(&self, query: &TagQuery) -> Result<TagPage> {
        query.validate()?;
        let url = self.tags_url(query)?;
        tracing::info!(%url, "fetching tags");

        let response = self
            .http
            .get(url)
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let page: TagPage = response.json().context("decode tag list")?;
        tracing::info!(
            items = page.items.len(),
            quota_remaining = page.quota_remaining,
            "fetched tags"
        );
        Ok(page)
    }

    pub fn fetch_tags(&self, query: &TagQuery) -> Result<Vec<Tag>> {
        Ok(self.fetch_page(query)?.items)
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach {} -- check your network or set [api].base_url ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<StackExchangeError>(body)
        && let Some(message) = parsed.error_message
        && !message.is_empty()
    {
        let name = parsed.error_name.unwrap_or_else(|| "error".to_owned());
        return anyhow!("server error ({}): {}: {}", status.as_u16(), name, message);
    }

    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), body.trim());
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct StackExchangeError {
    error_name: Option<String>,
    error_message: Option<String>,
}
